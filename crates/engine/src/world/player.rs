use std::f64::consts::PI;

use thiserror::Error;

use super::entity::{Body, EntityBase};
use super::geometry::{body_boxes, BodyBoxes, BodyShape, Facing, Rect};

pub const ATTACK_FRAME_MAX: u8 = 30;
pub const ATTACK_HIT_FRAME: u8 = 15;
pub const EVASION_FRAMES: u8 = 50;
pub const EVASION_COOLDOWN_FRAMES: u8 = 100;
pub const HEALTH_PICKUP_AMOUNT: u32 = 2;
const FLICKER_AMPLITUDE: f64 = 16.0;
const FLICKER_PERIOD_FRAMES: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("attack frame {value} is outside 0..={max}")]
    AttackFrameOutOfRange { value: u32, max: u8 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    base: EntityBase,
    boxes: BodyBoxes,
    coins: u32,
    has_sword: bool,
    attack_frame: u8,
    is_attacking: bool,
    is_walking: bool,
    is_evading: bool,
    is_evading_on_cooldown: bool,
    evasion_frame: u8,
    evasion_cooldown: u8,
    base_move_speed: u32,
    move_speed: u32,
}

impl Player {
    pub fn new(x: i32, y: i32, health: u32, damage: u32, base_move_speed: u32) -> Self {
        let base = EntityBase::new(x, y, health, damage);
        let boxes = body_boxes(x, y, base.facing, BodyShape::Player);
        Self {
            base,
            boxes,
            coins: 0,
            has_sword: false,
            attack_frame: 0,
            is_attacking: false,
            is_walking: false,
            is_evading: false,
            is_evading_on_cooldown: false,
            evasion_frame: 0,
            evasion_cooldown: 0,
            base_move_speed,
            move_speed: base_move_speed,
        }
    }

    pub fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    pub fn facing(&self) -> Facing {
        self.base.facing
    }

    /// Turns in place. Both boxes rotate with the new facing.
    pub fn set_facing(&mut self, facing: Facing) {
        self.base.facing = facing;
        self.boxes = body_boxes(self.base.x, self.base.y, facing, BodyShape::Player);
    }

    /// Advances one unit along the current facing. Callers check movement
    /// legality and liveness first.
    pub fn move_forward(&mut self) {
        self.is_walking = true;
        self.base.step_forward();
        self.boxes = body_boxes(self.base.x, self.base.y, self.base.facing, BodyShape::Player);
        self.base.increase_animation_frame();
    }

    /// Places the player without animating, e.g. when entering a level.
    pub fn teleport(&mut self, x: i32, y: i32) {
        self.base.x = x;
        self.base.y = y;
        self.boxes = body_boxes(x, y, self.base.facing, BodyShape::Player);
    }

    pub fn bounding_box(&self) -> Rect {
        self.boxes.bounding
    }

    /// Returns true exactly once per attack cycle, on the frame the hit lands.
    pub fn increase_attack_frame(&mut self) -> bool {
        self.attack_frame += 1;
        if self.attack_frame == ATTACK_HIT_FRAME {
            return true;
        }
        if self.attack_frame > ATTACK_FRAME_MAX {
            self.attack_frame = 0;
        }
        false
    }

    pub fn start_attack(&mut self) -> bool {
        if self.is_attacking || !self.has_sword || !self.base.is_alive() {
            return false;
        }
        self.is_attacking = true;
        self.attack_frame = 0;
        true
    }

    /// Drives an active attack by one tick. Returns true when the hit lands.
    pub(crate) fn advance_attack(&mut self) -> bool {
        if !self.is_attacking {
            return false;
        }
        let landed = self.increase_attack_frame();
        if self.attack_frame == 0 {
            self.is_attacking = false;
        }
        landed
    }

    pub fn attack_frame(&self) -> u8 {
        self.attack_frame
    }

    pub fn set_attack_frame(&mut self, value: u32) -> Result<(), PlayerError> {
        let frame = u8::try_from(value)
            .ok()
            .filter(|frame| *frame <= ATTACK_FRAME_MAX)
            .ok_or(PlayerError::AttackFrameOutOfRange {
                value,
                max: ATTACK_FRAME_MAX,
            })?;
        self.attack_frame = frame;
        Ok(())
    }

    pub fn is_attacking(&self) -> bool {
        self.is_attacking
    }

    pub fn start_evasion(&mut self) {
        self.evasion_frame = EVASION_FRAMES;
        self.is_evading = true;
        self.move_speed = self.base_move_speed.saturating_add(1);
    }

    pub fn can_evade(&self) -> bool {
        !self.is_evading && !self.is_evading_on_cooldown && self.base.is_alive()
    }

    pub fn decrease_evasion_frame(&mut self) {
        if self.evasion_frame == 0 {
            return;
        }
        self.evasion_frame -= 1;
        if self.evasion_frame == 0 {
            self.is_evading = false;
            self.move_speed = self.base_move_speed;
            self.is_evading_on_cooldown = true;
            self.evasion_cooldown = EVASION_COOLDOWN_FRAMES;
        }
    }

    pub fn decrease_evasion_cooldown(&mut self) {
        self.evasion_cooldown = self.evasion_cooldown.saturating_sub(1);
        if self.evasion_cooldown == 0 {
            self.is_evading_on_cooldown = false;
        }
    }

    pub fn evasion_frame(&self) -> u8 {
        self.evasion_frame
    }

    pub fn evasion_cooldown(&self) -> u8 {
        self.evasion_cooldown
    }

    pub fn is_evading(&self) -> bool {
        self.is_evading
    }

    pub fn is_evading_on_cooldown(&self) -> bool {
        self.is_evading_on_cooldown
    }

    pub fn move_speed(&self) -> u32 {
        self.move_speed
    }

    pub fn base_move_speed(&self) -> u32 {
        self.base_move_speed
    }

    pub fn add_coin(&mut self) {
        self.coins = self.coins.saturating_add(1);
    }

    pub fn add_health(&mut self) {
        self.base.heal(HEALTH_PICKUP_AMOUNT);
    }

    pub fn add_max_health(&mut self) {
        self.base.increase_max_health(HEALTH_PICKUP_AMOUNT);
        self.add_health();
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn has_sword(&self) -> bool {
        self.has_sword
    }

    pub fn set_has_sword(&mut self, has_sword: bool) {
        self.has_sword = has_sword;
    }

    pub fn is_walking(&self) -> bool {
        self.is_walking
    }

    pub fn set_walking(&mut self, is_walking: bool) {
        self.is_walking = is_walking;
    }

    /// Vertical displacement of the damage flicker, zero while undamaged.
    pub fn y_offset_damaged(&self) -> i32 {
        if !self.base.is_damaged() {
            return 0;
        }
        let phase = f64::from(self.base.invincible_frame()) / FLICKER_PERIOD_FRAMES * PI;
        (FLICKER_AMPLITUDE * phase.sin()).round() as i32
    }

    /// Hit box lifted by the damage flicker. The stored box never moves, so the
    /// displacement cannot drift across frames.
    pub fn flickered_hit_box(&self) -> Rect {
        self.boxes.hit.translated(0, -self.y_offset_damaged())
    }
}

impl Body for Player {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn hit_box(&self) -> Rect {
        self.boxes.hit
    }

    fn hit_box_after_step(&self, facing: Facing) -> Rect {
        let (dx, dy) = facing.step();
        body_boxes(self.base.x + dx, self.base.y + dy, facing, BodyShape::Player).hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(100, 100, 10, 2, 1)
    }

    #[test]
    fn move_changes_exactly_one_axis_for_every_facing() {
        for facing in Facing::ALL {
            let mut player = player();
            player.set_facing(facing);
            player.move_forward();

            let (dx, dy) = (player.base().x - 100, player.base().y - 100);
            assert_eq!(dx.abs() + dy.abs(), 1, "facing={facing:?}");
            assert_eq!((dx, dy), facing.step());
            assert!(player.is_walking());
            assert_eq!(player.base().animation_frame(), 1);

            let hit = player.hit_box();
            if facing.is_vertical() {
                assert!(hit.height > hit.width, "facing={facing:?}");
            } else {
                assert!(hit.width > hit.height, "facing={facing:?}");
            }
            assert_eq!((hit.x, hit.y), (player.base().x, player.base().y));
        }
    }

    #[test]
    fn attack_signal_fires_once_at_fifteenth_call() {
        let mut player = player();
        let signals = (1..=31)
            .map(|call| (call, player.increase_attack_frame()))
            .filter(|(_, landed)| *landed)
            .map(|(call, _)| call)
            .collect::<Vec<_>>();
        assert_eq!(signals, vec![15]);
        assert_eq!(player.attack_frame(), 0);
    }

    #[test]
    fn attack_frame_resets_only_after_exceeding_thirty() {
        let mut player = player();
        for _ in 0..30 {
            player.increase_attack_frame();
        }
        assert_eq!(player.attack_frame(), 30);
        player.increase_attack_frame();
        assert_eq!(player.attack_frame(), 0);
    }

    #[test]
    fn attack_requires_sword_and_ends_when_counter_wraps() {
        let mut player = player();
        assert!(!player.start_attack());
        player.set_has_sword(true);
        assert!(player.start_attack());
        assert!(!player.start_attack());

        let landed_ticks = (1..=31)
            .filter(|_| player.advance_attack())
            .count();
        assert_eq!(landed_ticks, 1);
        assert!(!player.is_attacking());
    }

    #[test]
    fn attack_frame_setter_rejects_out_of_range_values() {
        let mut player = player();
        assert!(player.set_attack_frame(30).is_ok());
        assert_eq!(player.attack_frame(), 30);
        assert_eq!(
            player.set_attack_frame(31),
            Err(PlayerError::AttackFrameOutOfRange { value: 31, max: 30 })
        );
        assert!(player.set_attack_frame(1_000).is_err());
        assert_eq!(player.attack_frame(), 30);
    }

    #[test]
    fn evasion_speed_boost_saturates() {
        let mut player = Player::new(100, 100, 10, 2, u32::MAX);
        player.start_evasion();
        assert_eq!(player.move_speed(), u32::MAX);
        for _ in 0..50 {
            player.decrease_evasion_frame();
        }
        assert_eq!(player.move_speed(), player.base_move_speed());
    }

    #[test]
    fn evasion_runs_fifty_frames_then_hundred_frame_cooldown() {
        let mut player = player();
        player.start_evasion();
        assert_eq!(player.evasion_frame(), 50);
        assert_eq!(player.move_speed(), 2);

        for _ in 0..49 {
            player.decrease_evasion_frame();
        }
        assert!(player.is_evading());
        assert!(!player.is_evading_on_cooldown());

        player.decrease_evasion_frame();
        assert!(!player.is_evading());
        assert_eq!(player.move_speed(), 1);
        assert!(player.is_evading_on_cooldown());
        assert_eq!(player.evasion_cooldown(), 100);

        for _ in 0..99 {
            player.decrease_evasion_cooldown();
        }
        assert!(player.is_evading_on_cooldown());
        player.decrease_evasion_cooldown();
        assert!(!player.is_evading_on_cooldown());
        assert!(player.can_evade());
    }

    #[test]
    fn add_max_health_raises_ceiling_and_health_by_two() {
        let mut player = player();
        player.add_max_health();
        assert_eq!(player.base().max_health(), 12);
        assert_eq!(player.base().health(), 12);
    }

    #[test]
    fn add_health_is_clamped_to_max() {
        let mut player = player();
        player.add_health();
        assert_eq!(player.base().health(), 10);
        player.base_mut().take_damage(5);
        player.add_health();
        assert_eq!(player.base().health(), 7);
    }

    #[test]
    fn flicker_offset_is_scoped_and_leaves_hit_box_untouched() {
        let mut player = player();
        assert_eq!(player.y_offset_damaged(), 0);

        player.base_mut().take_damage(1);
        for _ in 0..25 {
            player.base_mut().decrease_invincible_frame();
        }
        assert_eq!(player.y_offset_damaged(), 16);
        let stored = player.hit_box();
        let displaced = player.flickered_hit_box();
        assert_eq!(displaced.y, stored.y - 16);
        assert_eq!(player.hit_box(), stored);
    }
}
