use super::entity::Body;
use super::geometry::{Facing, Rect};
use super::World;

/// Which body is asking to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mover {
    Player,
    Hostile(usize),
}

/// Whether `mover` may advance one unit along its current facing.
///
/// Only the one-unit strip the body sweeps into is tested, so a body whose box
/// rotated into an obstacle when it turned can still back away from it. The
/// player may step past a level edge when a neighbouring level exists on that
/// side. Without an active level every move is blocked.
pub fn can_entity_move(world: &World, mover: Mover) -> bool {
    let Some(level) = world.current_level_map() else {
        return false;
    };
    let (next_box, facing) = match mover {
        Mover::Player => {
            let facing = world.player.facing();
            (world.player.hit_box_after_step(facing), facing)
        }
        Mover::Hostile(index) => {
            let Some(hostile) = world.hostiles.get(index) else {
                return false;
            };
            (hostile.hit_box_after_step(hostile.facing()), hostile.facing())
        }
    };
    let swept = leading_edge(&next_box, facing);

    if !level.tilemap().pixel_bounds().contains_rect(&swept) {
        let may_leave = mover == Mover::Player
            && level
                .coord()
                .neighbor(facing)
                .is_some_and(|coord| world.world_map.contains(coord));
        if !may_leave {
            return false;
        }
    }
    if level.tilemap().overlaps_solid(&swept) {
        return false;
    }

    let evading_player = mover == Mover::Player && world.player.is_evading();
    let hostile_blocks = world.hostiles.iter().enumerate().any(|(index, hostile)| {
        mover != Mover::Hostile(index)
            && hostile.base().is_alive()
            && hostile.hit_box().intersects(&swept)
    });
    if hostile_blocks && !evading_player {
        return false;
    }
    if world
        .peaceful
        .iter()
        .any(|entity| entity.hit_box().intersects(&swept))
    {
        return false;
    }
    if world
        .containers
        .iter()
        .any(|container| container.hit_box().intersects(&swept))
    {
        return false;
    }
    if matches!(mover, Mover::Hostile(_))
        && world.player.base().is_alive()
        && world.player.hit_box().intersects(&swept)
    {
        return false;
    }
    true
}

fn leading_edge(next_box: &Rect, facing: Facing) -> Rect {
    match facing {
        Facing::North => Rect::new(next_box.x, next_box.top(), next_box.width, 1),
        Facing::South => Rect::new(next_box.x, next_box.bottom() - 1, next_box.width, 1),
        Facing::West => Rect::new(next_box.left(), next_box.y, 1, next_box.height),
        Facing::East => Rect::new(next_box.right() - 1, next_box.y, 1, next_box.height),
    }
}
