use tracing::{debug, info};

use super::effects::{ScreenEffect, ScreenPrompt};
use super::entity::Body;
use super::geometry::distance;
use super::peaceful::PeacefulKind;
use super::{LevelTransition, World};

pub const INTERACTION_RADIUS: i32 = 50;
const CHEST_EFFECT_STEP_X: i32 = 10;
const CHEST_EFFECT_STEP_Y: i32 = 26;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionOutcome {
    pub chests_opened: usize,
    pub chest_items_awarded: usize,
    pub sword_granted: bool,
    pub items_picked_up: usize,
    pub prompts_shown: usize,
    pub transition: Option<LevelTransition>,
}

/// Offset of the effect spawned for the `index`-th item of an opened chest,
/// relative to the player.
pub fn chest_effect_offset(index: usize) -> (i32, i32) {
    let step = index as i32;
    (CHEST_EFFECT_STEP_X * step, -CHEST_EFFECT_STEP_Y * step)
}

/// Resolves one press of the interact key against everything in reach.
pub fn resolve_interaction(world: &mut World) -> InteractionOutcome {
    let (px, py) = world.player.position();
    let mut outcome = InteractionOutcome::default();

    for chest in &mut world.containers {
        if chest.is_opened() || distance(px, py, chest.x, chest.y) > INTERACTION_RADIUS {
            continue;
        }
        let kind = chest.kind();
        let (chest_x, chest_y) = (chest.x, chest.y);
        let Some(inventory) = chest.open() else {
            continue;
        };
        for (index, item) in inventory.iter().enumerate() {
            item.kind.award(&mut world.player);
            let (dx, dy) = chest_effect_offset(index);
            world
                .effects
                .push(ScreenEffect::chest_open(px + dx, py + dy, item.kind));
            outcome.chest_items_awarded += 1;
        }
        if kind.grants_sword() && !world.player.has_sword() {
            world.player.set_has_sword(true);
            outcome.sword_granted = true;
        }
        outcome.chests_opened += 1;
        info!(
            x = chest_x,
            y = chest_y,
            kind = kind.as_token(),
            items = inventory.len(),
            coins = world.player.coins(),
            "chest_opened"
        );
    }

    for entity in &world.peaceful {
        if distance(px, py, entity.x, entity.y) > INTERACTION_RADIUS {
            continue;
        }
        match entity.kind() {
            PeacefulKind::DungeonEntrance {
                target,
                spawn_x,
                spawn_y,
            } => {
                let transition = LevelTransition {
                    target: *target,
                    spawn: Some((*spawn_x, *spawn_y)),
                };
                world.pending_transition = Some(transition);
                outcome.transition = Some(transition);
                debug!(column = target.column, row = target.row, "dungeon_entrance_used");
            }
            PeacefulKind::Villager { message } => {
                let already_shown = world
                    .prompts
                    .iter()
                    .any(|prompt| prompt.x == entity.x && prompt.y == entity.y);
                if !already_shown {
                    world
                        .prompts
                        .push(ScreenPrompt::new(entity.x, entity.y, message.clone()));
                    outcome.prompts_shown += 1;
                }
            }
            PeacefulKind::TreeOfHealth => {}
        }
    }

    outcome.items_picked_up = pick_up_items(world);
    outcome
}

fn pick_up_items(world: &mut World) -> usize {
    let (px, py) = world.player.position();
    let to_remove = world
        .items
        .iter()
        .enumerate()
        .filter(|(_, item)| distance(px, py, item.x, item.y) <= INTERACTION_RADIUS)
        .map(|(index, _)| index)
        .collect::<Vec<_>>();

    for index in to_remove.iter().rev().copied() {
        let item = world.items.remove(index);
        item.kind.award(&mut world.player);
        debug!(kind = item.kind.as_token(), "item_picked_up");
    }
    to_remove.len()
}
