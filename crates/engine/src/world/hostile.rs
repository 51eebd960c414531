use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use super::entity::{Body, EntityBase};
use super::geometry::{body_boxes, distance, BodyShape, Facing, Rect, CREATURE_BOX_SIZE};
use super::missile::{Missile, MISSILE_SIZE};
use super::player::Player;

pub const GHOST_ATTACK_FRAMES: u8 = 45;
pub const GHOST_ATTACK_RANGE: i32 = 256;
const GHOST_ALIGNMENT_TOLERANCE: i32 = 24;
pub const SKELETON_ATTACK_FRAMES: u8 = 30;
pub const SKELETON_HIT_FRAME: u8 = 15;
pub const SKELETON_REACH: i32 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostileKind {
    Ghost,
    Skeleton,
}

impl HostileKind {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Ghost => "ghost",
            Self::Skeleton => "skeleton",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "ghost" => Some(Self::Ghost),
            "skeleton" => Some(Self::Skeleton),
            _ => None,
        }
    }

    /// Default (health, damage) when a level file does not override them.
    pub fn default_stats(self) -> (u32, u32) {
        match self {
            Self::Ghost => (4, 1),
            Self::Skeleton => (6, 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostileEntity {
    base: EntityBase,
    kind: HostileKind,
    attack_frame: u8,
    is_attacking: bool,
}

impl HostileEntity {
    pub fn new(kind: HostileKind, x: i32, y: i32, health: u32, damage: u32) -> Self {
        Self {
            base: EntityBase::new(x, y, health, damage),
            kind,
            attack_frame: 0,
            is_attacking: false,
        }
    }

    pub fn with_default_stats(kind: HostileKind, x: i32, y: i32) -> Self {
        let (health, damage) = kind.default_stats();
        Self::new(kind, x, y, health, damage)
    }

    pub fn kind(&self) -> HostileKind {
        self.kind
    }

    pub fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    pub fn facing(&self) -> Facing {
        self.base.facing
    }

    pub fn set_facing(&mut self, facing: Facing) {
        self.base.facing = facing;
    }

    /// Turns toward the target along the axis with the larger delta.
    pub fn follow_player(&mut self, player_x: i32, player_y: i32) {
        let dx = player_x - self.base.x;
        let dy = player_y - self.base.y;
        if dx == 0 && dy == 0 {
            return;
        }
        self.base.facing = if dx.abs() >= dy.abs() {
            if dx > 0 {
                Facing::East
            } else {
                Facing::West
            }
        } else if dy > 0 {
            Facing::South
        } else {
            Facing::North
        };
    }

    pub fn move_forward(&mut self) {
        self.base.step_forward();
        self.base.increase_animation_frame();
    }

    pub fn start_attack(&mut self, frames: u8) {
        self.is_attacking = true;
        self.attack_frame = frames;
    }

    pub fn decrease_attack_frame(&mut self) {
        self.attack_frame = self.attack_frame.saturating_sub(1);
        if self.attack_frame == 0 {
            self.is_attacking = false;
        }
    }

    pub fn attack_frame(&self) -> u8 {
        self.attack_frame
    }

    pub fn is_attacking(&self) -> bool {
        self.is_attacking
    }
}

impl Body for HostileEntity {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn hit_box(&self) -> Rect {
        body_boxes(self.base.x, self.base.y, self.base.facing, BodyShape::Creature).hit
    }

    fn hit_box_after_step(&self, facing: Facing) -> Rect {
        let (dx, dy) = facing.step();
        body_boxes(self.base.x + dx, self.base.y + dy, facing, BodyShape::Creature).hit
    }
}

pub struct AttackContext<'a> {
    pub player: &'a mut Player,
    pub missiles: &'a mut Vec<Missile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    Idle,
    Started,
    MissileFired,
    HitLanded,
}

pub trait HostileBehavior: fmt::Debug {
    fn attack(&self, enemy: &mut HostileEntity, context: &mut AttackContext<'_>) -> AttackOutcome;
}

/// Ranged attacker: fires a missile along its facing once lined up with the player.
#[derive(Debug, Default)]
pub struct GhostBehavior;

impl HostileBehavior for GhostBehavior {
    fn attack(&self, enemy: &mut HostileEntity, context: &mut AttackContext<'_>) -> AttackOutcome {
        if enemy.is_attacking() || !context.player.base().is_alive() {
            return AttackOutcome::Idle;
        }
        let (ex, ey) = enemy.hit_box().center();
        let (px, py) = context.player.hit_box().center();
        let aligned = match enemy.facing() {
            Facing::North | Facing::South => (px - ex).abs() <= GHOST_ALIGNMENT_TOLERANCE,
            Facing::East | Facing::West => (py - ey).abs() <= GHOST_ALIGNMENT_TOLERANCE,
        };
        if !aligned || distance(ex, ey, px, py) > GHOST_ATTACK_RANGE {
            return AttackOutcome::Idle;
        }

        enemy.start_attack(GHOST_ATTACK_FRAMES);
        let half = MISSILE_SIZE / 2;
        let (dx, dy) = enemy.facing().step();
        let lead = CREATURE_BOX_SIZE / 2 + half;
        context.missiles.push(Missile::new(
            ex - half + dx * lead,
            ey - half + dy * lead,
            enemy.facing(),
            enemy.base().damage(),
        ));
        AttackOutcome::MissileFired
    }
}

/// Melee attacker: winds up within reach, the blow lands halfway through.
#[derive(Debug, Default)]
pub struct SkeletonBehavior;

impl HostileBehavior for SkeletonBehavior {
    fn attack(&self, enemy: &mut HostileEntity, context: &mut AttackContext<'_>) -> AttackOutcome {
        let (ex, ey) = enemy.position();
        let (px, py) = context.player.position();
        let in_reach = distance(ex, ey, px, py) <= SKELETON_REACH;

        if enemy.is_attacking() {
            if enemy.attack_frame() == SKELETON_HIT_FRAME
                && in_reach
                && context.player.base_mut().take_damage(enemy.base().damage())
            {
                return AttackOutcome::HitLanded;
            }
            return AttackOutcome::Idle;
        }
        if in_reach && context.player.base().is_alive() {
            enemy.start_attack(SKELETON_ATTACK_FRAMES);
            return AttackOutcome::Started;
        }
        AttackOutcome::Idle
    }
}

/// Attack behaviors keyed by hostile kind. Kinds without an entry never attack.
#[derive(Debug)]
pub struct HostileBehaviorTable {
    behaviors: HashMap<HostileKind, Box<dyn HostileBehavior>>,
}

impl Default for HostileBehaviorTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.register(HostileKind::Ghost, Box::new(GhostBehavior));
        table.register(HostileKind::Skeleton, Box::new(SkeletonBehavior));
        table
    }
}

impl HostileBehaviorTable {
    pub fn empty() -> Self {
        Self {
            behaviors: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        kind: HostileKind,
        behavior: Box<dyn HostileBehavior>,
    ) -> Option<Box<dyn HostileBehavior>> {
        self.behaviors.insert(kind, behavior)
    }

    pub fn attack(&self, enemy: &mut HostileEntity, context: &mut AttackContext<'_>) -> AttackOutcome {
        match self.behaviors.get(&enemy.kind()) {
            Some(behavior) => behavior.attack(enemy, context),
            None => {
                debug!(kind = enemy.kind().as_token(), "hostile_behavior_missing");
                AttackOutcome::Idle
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_faces_along_dominant_axis() {
        let mut enemy = HostileEntity::with_default_stats(HostileKind::Ghost, 100, 100);
        enemy.follow_player(300, 150);
        assert_eq!(enemy.facing(), Facing::East);
        enemy.follow_player(90, 300);
        assert_eq!(enemy.facing(), Facing::South);
        enemy.follow_player(100, 20);
        assert_eq!(enemy.facing(), Facing::North);
        enemy.follow_player(40, 60);
        assert_eq!(enemy.facing(), Facing::West);
    }

    #[test]
    fn follow_tie_prefers_horizontal_and_zero_delta_keeps_facing() {
        let mut enemy = HostileEntity::with_default_stats(HostileKind::Ghost, 0, 0);
        enemy.follow_player(-5, 5);
        assert_eq!(enemy.facing(), Facing::West);
        enemy.follow_player(0, 0);
        assert_eq!(enemy.facing(), Facing::West);
    }

    #[test]
    fn attack_frame_counts_down_and_clears_flag() {
        let mut enemy = HostileEntity::with_default_stats(HostileKind::Skeleton, 0, 0);
        enemy.start_attack(2);
        enemy.decrease_attack_frame();
        assert!(enemy.is_attacking());
        enemy.decrease_attack_frame();
        assert!(!enemy.is_attacking());
        enemy.decrease_attack_frame();
        assert_eq!(enemy.attack_frame(), 0);
    }

    #[test]
    fn ghost_fires_missile_when_aligned() {
        let table = HostileBehaviorTable::default();
        let mut player = Player::new(300, 100, 10, 2, 1);
        let mut missiles = Vec::new();
        let mut ghost = HostileEntity::with_default_stats(HostileKind::Ghost, 100, 100);
        ghost.follow_player(300, 100);

        let outcome = table.attack(
            &mut ghost,
            &mut AttackContext {
                player: &mut player,
                missiles: &mut missiles,
            },
        );

        assert_eq!(outcome, AttackOutcome::MissileFired);
        assert_eq!(missiles.len(), 1);
        assert_eq!(missiles[0].facing(), Facing::East);
        assert_eq!(ghost.attack_frame(), GHOST_ATTACK_FRAMES);
    }

    #[test]
    fn ghost_holds_fire_when_out_of_line() {
        let table = HostileBehaviorTable::default();
        let mut player = Player::new(300, 260, 10, 2, 1);
        let mut missiles = Vec::new();
        let mut ghost = HostileEntity::with_default_stats(HostileKind::Ghost, 100, 100);
        ghost.set_facing(Facing::East);

        let outcome = table.attack(
            &mut ghost,
            &mut AttackContext {
                player: &mut player,
                missiles: &mut missiles,
            },
        );

        assert_eq!(outcome, AttackOutcome::Idle);
        assert!(missiles.is_empty());
    }

    #[test]
    fn skeleton_blow_lands_at_hit_frame() {
        let table = HostileBehaviorTable::default();
        let mut player = Player::new(130, 100, 10, 2, 1);
        let mut missiles = Vec::new();
        let mut skeleton = HostileEntity::with_default_stats(HostileKind::Skeleton, 100, 100);

        let mut outcomes = Vec::new();
        for _ in 0..SKELETON_ATTACK_FRAMES {
            skeleton.decrease_attack_frame();
            outcomes.push(table.attack(
                &mut skeleton,
                &mut AttackContext {
                    player: &mut player,
                    missiles: &mut missiles,
                },
            ));
        }

        assert_eq!(outcomes[0], AttackOutcome::Started);
        assert_eq!(
            outcomes
                .iter()
                .filter(|outcome| **outcome == AttackOutcome::HitLanded)
                .count(),
            1
        );
        assert_eq!(player.base().health(), 8);
    }

    #[test]
    fn unregistered_kind_never_attacks() {
        let table = HostileBehaviorTable::empty();
        let mut player = Player::new(110, 100, 10, 2, 1);
        let mut missiles = Vec::new();
        let mut skeleton = HostileEntity::with_default_stats(HostileKind::Skeleton, 100, 100);
        let outcome = table.attack(
            &mut skeleton,
            &mut AttackContext {
                player: &mut player,
                missiles: &mut missiles,
            },
        );
        assert_eq!(outcome, AttackOutcome::Idle);
        assert!(!skeleton.is_attacking());
    }
}
