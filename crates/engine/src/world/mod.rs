mod collectible;
mod collision;
mod container;
mod effects;
mod entity;
mod geometry;
mod hostile;
mod interaction;
mod level;
mod missile;
mod peaceful;
mod player;
mod visual;

use std::collections::HashMap;
use std::mem;

use tracing::{info, warn};

pub use collectible::{Collectible, ItemKind, COLLECTIBLE_SIZE};
pub use collision::{can_entity_move, Mover};
pub use container::{Container, ContainerKind, CONTAINER_SIZE};
pub use effects::{EffectKind, ScreenEffect, ScreenPrompt};
pub use entity::{Body, EntityBase, ANIMATION_FRAME_COUNT, INVINCIBLE_FRAMES};
pub use geometry::{body_boxes, distance, BodyBoxes, BodyShape, Facing, Rect};
pub use hostile::{
    AttackContext, AttackOutcome, GhostBehavior, HostileBehavior, HostileBehaviorTable,
    HostileEntity, HostileKind, SkeletonBehavior,
};
pub use interaction::{
    chest_effect_offset, resolve_interaction, InteractionOutcome, INTERACTION_RADIUS,
};
pub use level::{
    LevelCoord, LevelMap, LevelPopulation, Tile, Tilemap, TilemapError, WorldMap, TILE_SIZE,
};
pub use missile::{Missile, MISSILE_LIFETIME_FRAMES, MISSILE_SPEED};
pub use peaceful::{PeacefulEntity, PeacefulKind, PASSIVE_EFFECT_PERIOD, PEACEFUL_SIZE};
pub use player::{Player, PlayerError, ATTACK_FRAME_MAX, ATTACK_HIT_FRAME};
pub use visual::{
    container_sprite_key, creature_sprite_key, effect_sprite_key, item_sprite_key,
    peaceful_sprite_key, select_player_visual, PlayerVisual, Tint,
};

/// A queued move of the player into another level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelTransition {
    pub target: LevelCoord,
    pub spawn: Option<(i32, i32)>,
}

/// Owns the player and every entity collection for the active level.
///
/// Populations of levels the player has left are stashed and restored on
/// return, so opened chests stay open and defeated enemies stay defeated.
#[derive(Debug)]
pub struct World {
    pub(crate) player: Player,
    pub(crate) hostiles: Vec<HostileEntity>,
    pub(crate) peaceful: Vec<PeacefulEntity>,
    pub(crate) containers: Vec<Container>,
    pub(crate) items: Vec<Collectible>,
    pub(crate) missiles: Vec<Missile>,
    pub(crate) effects: Vec<ScreenEffect>,
    pub(crate) prompts: Vec<ScreenPrompt>,
    pub(crate) world_map: WorldMap,
    pub(crate) current_level: Option<LevelCoord>,
    pub(crate) pending_transition: Option<LevelTransition>,
    stashed_populations: HashMap<LevelCoord, LevelPopulation>,
}

impl World {
    pub fn new(player: Player, world_map: WorldMap) -> Self {
        Self {
            player,
            hostiles: Vec::new(),
            peaceful: Vec::new(),
            containers: Vec::new(),
            items: Vec::new(),
            missiles: Vec::new(),
            effects: Vec::new(),
            prompts: Vec::new(),
            world_map,
            current_level: None,
            pending_transition: None,
            stashed_populations: HashMap::new(),
        }
    }

    /// Switches the active level. The player is moved to `spawn` when given.
    /// Returns false, leaving the world unchanged, when no such level exists.
    pub fn enter_level(&mut self, coord: LevelCoord, spawn: Option<(i32, i32)>) -> bool {
        let Some(level) = self.world_map.level(coord) else {
            warn!(column = coord.column, row = coord.row, "level_missing");
            return false;
        };
        let incoming = self
            .stashed_populations
            .remove(&coord)
            .unwrap_or_else(|| level.population().clone());

        let outgoing = LevelPopulation {
            hostiles: mem::replace(&mut self.hostiles, incoming.hostiles),
            peaceful: mem::replace(&mut self.peaceful, incoming.peaceful),
            containers: mem::replace(&mut self.containers, incoming.containers),
            items: mem::replace(&mut self.items, incoming.items),
        };
        if let Some(previous) = self.current_level.replace(coord) {
            self.stashed_populations.insert(previous, outgoing);
        }
        self.missiles.clear();
        self.effects.clear();
        self.prompts.clear();
        self.pending_transition = None;

        if let Some((x, y)) = spawn {
            self.player.teleport(x, y);
        }
        info!(
            column = coord.column,
            row = coord.row,
            hostiles = self.hostiles.len(),
            containers = self.containers.len(),
            "level_entered"
        );
        true
    }

    pub fn queue_transition(&mut self, transition: LevelTransition) {
        self.pending_transition = Some(transition);
    }

    pub fn pending_transition(&self) -> Option<LevelTransition> {
        self.pending_transition
    }

    pub fn current_level(&self) -> Option<LevelCoord> {
        self.current_level
    }

    pub fn current_level_map(&self) -> Option<&LevelMap> {
        self.current_level
            .and_then(|coord| self.world_map.level(coord))
    }

    pub fn world_map(&self) -> &WorldMap {
        &self.world_map
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn hostiles(&self) -> &[HostileEntity] {
        &self.hostiles
    }

    pub fn peaceful(&self) -> &[PeacefulEntity] {
        &self.peaceful
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn items(&self) -> &[Collectible] {
        &self.items
    }

    pub fn missiles(&self) -> &[Missile] {
        &self.missiles
    }

    pub fn effects(&self) -> &[ScreenEffect] {
        &self.effects
    }

    pub fn prompts(&self) -> &[ScreenPrompt] {
        &self.prompts
    }

    pub fn add_hostile(&mut self, hostile: HostileEntity) {
        self.hostiles.push(hostile);
    }

    pub fn add_peaceful(&mut self, entity: PeacefulEntity) {
        self.peaceful.push(entity);
    }

    pub fn add_container(&mut self, container: Container) {
        self.containers.push(container);
    }

    pub fn add_item(&mut self, item: Collectible) {
        self.items.push(item);
    }

    pub fn add_missile(&mut self, missile: Missile) {
        self.missiles.push(missile);
    }

    pub fn add_effect(&mut self, effect: ScreenEffect) {
        self.effects.push(effect);
    }

    /// Live entity count across all collections, the player included.
    pub fn entity_count(&self) -> usize {
        1 + self.hostiles.len()
            + self.peaceful.len()
            + self.containers.len()
            + self.items.len()
            + self.missiles.len()
            + self.effects.len()
            + self.prompts.len()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn entering_unknown_level_is_rejected() {
        let mut world = room_world(200, 200);
        assert!(!world.enter_level(LevelCoord::new(9, 9), Some((0, 0))));
        assert_eq!(world.current_level(), Some(ROOM_COORD));
        assert_eq!(world.player().position(), (200, 200));
    }

    #[test]
    fn population_is_stashed_and_restored_across_levels() {
        let mut world_map = WorldMap::new();
        let home = LevelCoord::new(2, 4);
        let away = LevelCoord::new(3, 4);
        let home_population = LevelPopulation {
            containers: vec![Container::new(100, 100, ContainerKind::Wooden, Vec::new())],
            ..LevelPopulation::default()
        };
        world_map.add_level(LevelMap::new(
            home,
            Tilemap::walled_room(8, 8).expect("room"),
            home_population,
        ));
        world_map.add_level(LevelMap::new(
            away,
            Tilemap::walled_room(8, 8).expect("room"),
            LevelPopulation::default(),
        ));
        let mut world = World::new(Player::new(120, 120, 10, 2, 1), world_map);
        assert!(world.enter_level(home, None));
        assert!(world.containers[0].open().is_some());
        world.add_missile(Missile::new(0, 0, Facing::East, 1));

        assert!(world.enter_level(away, Some((70, 70))));
        assert!(world.containers().is_empty());
        assert!(world.missiles().is_empty());
        assert_eq!(world.player().position(), (70, 70));

        assert!(world.enter_level(home, None));
        assert_eq!(world.containers().len(), 1);
        assert!(world.containers()[0].is_opened());
    }
}
