use thiserror::Error;
use tracing::{debug, info, warn};

use crate::app::InputAction;
use crate::world::{
    can_entity_move, distance, resolve_interaction, AttackContext, AttackOutcome, Body,
    Collectible, Facing, HostileBehaviorTable, InteractionOutcome, ItemKind, LevelCoord, LevelMap,
    Missile, Mover, PeacefulKind, Player, ScreenEffect, World, WorldMap,
};

use super::config::SessionConfig;

pub const PASSIVE_HEAL_RADIUS: i32 = 128;
pub const PASSIVE_HEAL_AMOUNT: u32 = 2;
/// Upper bound on single-pixel steps a player takes per move action.
pub const MAX_STEPS_PER_MOVE: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    Input,
    PlayerTimers,
    Hostiles,
    Peaceful,
    Missiles,
    Effects,
    EnemyDrops,
    LevelChange,
}

impl TickPhase {
    pub fn name(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::PlayerTimers => "player_timers",
            Self::Hostiles => "hostiles",
            Self::Peaceful => "peaceful",
            Self::Missiles => "missiles",
            Self::Effects => "effects",
            Self::EnemyDrops => "enemy_drops",
            Self::LevelChange => "level_change",
        }
    }
}

pub const TICK_PHASE_ORDER: [TickPhase; 8] = [
    TickPhase::Input,
    TickPhase::PlayerTimers,
    TickPhase::Hostiles,
    TickPhase::Peaceful,
    TickPhase::Missiles,
    TickPhase::Effects,
    TickPhase::EnemyDrops,
    TickPhase::LevelChange,
];

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("start level {coord} is not part of the world map")]
    StartLevelMissing { coord: LevelCoord },
}

/// What happened during one tick, for logging and for the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub interaction: Option<InteractionOutcome>,
    pub hostiles_hit: usize,
    pub player_hits_taken: usize,
    pub missiles_fired: usize,
    pub missiles_culled: usize,
    /// Missiles whose lifetime ran out this tick, after their final step.
    pub expired_missiles: Vec<Missile>,
    pub passive_heals: usize,
    pub enemies_defeated: usize,
    pub level_entered: Option<LevelCoord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub quit_requested: bool,
    pub report: TickReport,
}

/// Owns the world and advances it one fixed tick at a time.
#[derive(Debug)]
pub struct GameSession {
    world: World,
    behaviors: HostileBehaviorTable,
    tick: u64,
    last_tick_order: Vec<TickPhase>,
}

impl GameSession {
    pub fn new(config: &SessionConfig, world_map: WorldMap) -> Result<Self, SessionError> {
        let start = config.start_level();
        let player = Player::new(
            config.spawn_x,
            config.spawn_y,
            config.player_health,
            config.player_damage,
            config.base_move_speed,
        );
        let mut world = World::new(player, world_map);
        if !world.enter_level(start, None) {
            return Err(SessionError::StartLevelMissing { coord: start });
        }
        info!(
            column = start.column,
            row = start.row,
            levels = world.world_map().len(),
            "session_started"
        );
        Ok(Self::from_world(world))
    }

    pub fn from_world(world: World) -> Self {
        Self {
            world,
            behaviors: HostileBehaviorTable::default(),
            tick: 0,
            last_tick_order: Vec::with_capacity(TICK_PHASE_ORDER.len()),
        }
    }

    pub fn with_behaviors(mut self, behaviors: HostileBehaviorTable) -> Self {
        self.behaviors = behaviors;
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn last_tick_order(&self) -> &[TickPhase] {
        &self.last_tick_order
    }

    /// Runs every phase once, in `TICK_PHASE_ORDER`, against this tick's
    /// key-down events.
    pub fn tick(&mut self, events: &[InputAction]) -> TickOutcome {
        self.tick += 1;
        let mut outcome = TickOutcome {
            quit_requested: false,
            report: TickReport {
                tick: self.tick,
                ..TickReport::default()
            },
        };
        let player_was_alive = self.world.player.base().is_alive();

        self.last_tick_order.clear();
        for phase in TICK_PHASE_ORDER {
            self.last_tick_order.push(phase);
            self.run_phase(phase, events, &mut outcome);
        }

        if player_was_alive && !self.world.player.base().is_alive() {
            warn!(tick = self.tick, "player_defeated");
        }
        outcome
    }

    fn run_phase(&mut self, phase: TickPhase, events: &[InputAction], outcome: &mut TickOutcome) {
        match phase {
            TickPhase::Input => self.run_input_phase(events, outcome),
            TickPhase::PlayerTimers => self.run_player_timers_phase(&mut outcome.report),
            TickPhase::Hostiles => self.run_hostiles_phase(&mut outcome.report),
            TickPhase::Peaceful => self.run_peaceful_phase(&mut outcome.report),
            TickPhase::Missiles => self.run_missiles_phase(&mut outcome.report),
            TickPhase::Effects => self.run_effects_phase(),
            TickPhase::EnemyDrops => self.run_enemy_drops_phase(&mut outcome.report),
            TickPhase::LevelChange => self.run_level_change_phase(&mut outcome.report),
        }
    }

    fn run_input_phase(&mut self, events: &[InputAction], outcome: &mut TickOutcome) {
        let world = &mut self.world;
        world.player.set_walking(false);

        for action in events.iter().copied() {
            if action == InputAction::Quit {
                outcome.quit_requested = true;
                continue;
            }
            if !world.player.base().is_alive() {
                continue;
            }
            if let Some(facing) = action.move_facing() {
                move_player(world, facing);
                continue;
            }
            match action {
                InputAction::Interact => {
                    outcome.report.interaction = Some(resolve_interaction(world));
                }
                InputAction::Attack => {
                    if world.player.start_attack() {
                        debug!(facing = world.player.facing().as_token(), "player_attack_started");
                    }
                }
                InputAction::Evade => {
                    if world.player.can_evade() {
                        world.player.start_evasion();
                        debug!(speed = world.player.move_speed(), "player_evasion_started");
                    }
                }
                _ => {}
            }
        }
    }

    fn run_player_timers_phase(&mut self, report: &mut TickReport) {
        let world = &mut self.world;
        if world.player.advance_attack() {
            let reach = world.player.bounding_box();
            let damage = world.player.base().damage();
            for hostile in world
                .hostiles
                .iter_mut()
                .filter(|hostile| hostile.base().is_alive() && hostile.hit_box().intersects(&reach))
            {
                if hostile.base_mut().take_damage(damage) {
                    report.hostiles_hit += 1;
                    info!(
                        kind = hostile.kind().as_token(),
                        health = hostile.base().health(),
                        "hostile_hit"
                    );
                }
            }
        }

        if world.player.is_evading() {
            world.player.decrease_evasion_frame();
        } else if world.player.is_evading_on_cooldown() {
            world.player.decrease_evasion_cooldown();
        }
    }

    fn run_hostiles_phase(&mut self, report: &mut TickReport) {
        let (px, py) = self.world.player.position();
        for index in 0..self.world.hostiles.len() {
            let hostile = &mut self.world.hostiles[index];
            if !hostile.base().is_alive() {
                continue;
            }
            hostile.base_mut().decrease_invincible_frame();
            hostile.follow_player(px, py);

            let can_move = !self.world.hostiles[index].is_attacking()
                && can_entity_move(&self.world, Mover::Hostile(index));
            let hostile = &mut self.world.hostiles[index];
            if can_move {
                hostile.move_forward();
            } else {
                let turned = hostile.facing().opposite();
                hostile.set_facing(turned);
            }

            let world = &mut self.world;
            let hostile = &mut world.hostiles[index];
            hostile.decrease_attack_frame();
            let mut context = AttackContext {
                player: &mut world.player,
                missiles: &mut world.missiles,
            };
            match self.behaviors.attack(hostile, &mut context) {
                AttackOutcome::MissileFired => report.missiles_fired += 1,
                AttackOutcome::HitLanded => {
                    report.player_hits_taken += 1;
                    info!(
                        kind = hostile.kind().as_token(),
                        health = world.player.base().health(),
                        "player_hit"
                    );
                }
                AttackOutcome::Started | AttackOutcome::Idle => {}
            }
        }
    }

    fn run_peaceful_phase(&mut self, report: &mut TickReport) {
        let world = &mut self.world;
        let (px, py) = world.player.position();
        for entity in world.peaceful.iter_mut() {
            entity.increase_passive_effect_frame();
            if !matches!(entity.kind(), PeacefulKind::TreeOfHealth) || !entity.passive_effect_ready() {
                continue;
            }
            if !world.player.base().is_alive()
                || distance(px, py, entity.x, entity.y) > PASSIVE_HEAL_RADIUS
            {
                continue;
            }
            world.player.base_mut().heal(PASSIVE_HEAL_AMOUNT);
            world.effects.push(ScreenEffect::heal(px, py));
            report.passive_heals += 1;
            debug!(health = world.player.base().health(), "passive_heal");
        }
    }

    /// A missile whose lifetime ends this tick is marked for removal but still
    /// takes its step before the removal list is applied.
    fn run_missiles_phase(&mut self, report: &mut TickReport) {
        let world = &mut self.world;
        let tilemap = match world.current_level {
            Some(coord) => world.world_map.level(coord).map(LevelMap::tilemap),
            None => None,
        };
        let player = &mut world.player;

        let mut culled = Vec::new();
        for (index, missile) in world.missiles.iter_mut().enumerate() {
            missile.increase_animation_frame();
            let expired = missile.should_animation_end();
            if expired {
                culled.push(index);
            }
            missile.move_forward();
            if expired {
                report.expired_missiles.push(missile.clone());
                continue;
            }

            let hit_box = missile.hit_box();
            if player.base().is_alive() && hit_box.intersects(&player.flickered_hit_box()) {
                if player.base_mut().take_damage(missile.damage()) {
                    report.player_hits_taken += 1;
                    info!(health = player.base().health(), "player_hit_by_missile");
                }
                culled.push(index);
                continue;
            }
            let blocked = tilemap.map_or(true, |tiles| {
                tiles.overlaps_solid(&hit_box) || !tiles.pixel_bounds().intersects(&hit_box)
            });
            if blocked {
                culled.push(index);
            }
        }

        report.missiles_culled = culled.len();
        remove_marked(&mut world.missiles, &culled);
    }

    fn run_effects_phase(&mut self) {
        let world = &mut self.world;

        let mut finished = Vec::new();
        for (index, effect) in world.effects.iter_mut().enumerate() {
            effect.advance();
            if effect.is_finished() {
                finished.push(index);
            }
        }
        remove_marked(&mut world.effects, &finished);

        finished.clear();
        for (index, prompt) in world.prompts.iter_mut().enumerate() {
            prompt.advance();
            if prompt.is_finished() {
                finished.push(index);
            }
        }
        remove_marked(&mut world.prompts, &finished);
    }

    fn run_enemy_drops_phase(&mut self, report: &mut TickReport) {
        let world = &mut self.world;
        let defeated = world
            .hostiles
            .iter()
            .enumerate()
            .filter(|(_, hostile)| !hostile.base().is_alive())
            .map(|(index, _)| index)
            .collect::<Vec<_>>();

        for index in defeated.iter().copied() {
            let hostile = &world.hostiles[index];
            let (x, y) = hostile.position();
            world.items.push(Collectible::new(x, y, ItemKind::Coin));
            info!(kind = hostile.kind().as_token(), x, y, "enemy_defeated");
        }
        report.enemies_defeated = defeated.len();
        remove_marked(&mut world.hostiles, &defeated);
    }

    fn run_level_change_phase(&mut self, report: &mut TickReport) {
        let world = &mut self.world;
        if let Some(transition) = world.pending_transition.take() {
            if world.enter_level(transition.target, transition.spawn) {
                report.level_entered = Some(transition.target);
            }
            return;
        }
        let Some((target, spawn)) = edge_exit(world) else {
            return;
        };
        if world.enter_level(target, Some(spawn)) {
            report.level_entered = Some(target);
        }
    }
}

fn move_player(world: &mut World, facing: Facing) {
    world.player.base_mut().decrease_invincible_frame();
    world.player.set_facing(facing);
    for _ in 0..world.player.move_speed().min(MAX_STEPS_PER_MOVE) {
        if !world.player.base().is_alive() || !can_entity_move(world, Mover::Player) {
            break;
        }
        world.player.move_forward();
    }
}

/// The neighbouring level and entry point when the player's hit box has
/// crossed an edge of the current level.
fn edge_exit(world: &World) -> Option<(LevelCoord, (i32, i32))> {
    let level = world.current_level_map()?;
    let bounds = level.tilemap().pixel_bounds();
    let hit = world.player.hit_box();
    let exit = if hit.left() < bounds.left() {
        Facing::West
    } else if hit.right() > bounds.right() {
        Facing::East
    } else if hit.top() < bounds.top() {
        Facing::North
    } else if hit.bottom() > bounds.bottom() {
        Facing::South
    } else {
        return None;
    };

    let target = level.coord().neighbor(exit)?;
    let target_bounds = world.world_map.level(target)?.tilemap().pixel_bounds();
    let (x, y) = world.player.position();
    let max_x = (target_bounds.right() - hit.width).max(0);
    let max_y = (target_bounds.bottom() - hit.height).max(0);
    let spawn = match exit {
        Facing::West => (max_x, y.clamp(0, max_y)),
        Facing::East => (0, y.clamp(0, max_y)),
        Facing::North => (x.clamp(0, max_x), max_y),
        Facing::South => (x.clamp(0, max_x), 0),
    };
    Some((target, spawn))
}

/// Applies a removal list built during iteration. `marked` must be ascending.
fn remove_marked<T>(items: &mut Vec<T>, marked: &[usize]) {
    for index in marked.iter().rev().copied() {
        if index < items.len() {
            items.remove(index);
        }
    }
}
