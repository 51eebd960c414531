use super::geometry::{Facing, Rect};

pub const ANIMATION_FRAME_COUNT: u8 = 40;
pub const INVINCIBLE_FRAMES: u8 = 50;

/// State shared by every living body: position, health pool, facing and the
/// timed-frame counters.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityBase {
    pub x: i32,
    pub y: i32,
    pub facing: Facing,
    health: u32,
    max_health: u32,
    damage: u32,
    animation_frame: u8,
    invincible_frame: u8,
    is_damaged: bool,
}

impl EntityBase {
    pub fn new(x: i32, y: i32, health: u32, damage: u32) -> Self {
        Self {
            x,
            y,
            facing: Facing::default(),
            health,
            max_health: health,
            damage,
            animation_frame: 0,
            invincible_frame: 0,
            is_damaged: false,
        }
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn damage(&self) -> u32 {
        self.damage
    }

    pub fn animation_frame(&self) -> u8 {
        self.animation_frame
    }

    pub fn invincible_frame(&self) -> u8 {
        self.invincible_frame
    }

    pub fn is_damaged(&self) -> bool {
        self.is_damaged
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn heal(&mut self, amount: u32) {
        self.health = self.health.saturating_add(amount).min(self.max_health);
    }

    pub fn increase_max_health(&mut self, amount: u32) {
        self.max_health = self.max_health.saturating_add(amount);
    }

    pub fn decrease_invincible_frame(&mut self) {
        self.invincible_frame = self.invincible_frame.saturating_sub(1);
        if self.invincible_frame == 0 {
            self.is_damaged = false;
        }
    }

    pub fn increase_animation_frame(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % ANIMATION_FRAME_COUNT;
    }

    /// Applies `amount` unless the invincibility window is still open. Returns
    /// whether the hit was taken.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if self.invincible_frame > 0 || !self.is_alive() {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        self.invincible_frame = INVINCIBLE_FRAMES;
        self.is_damaged = true;
        true
    }

    pub(crate) fn step_forward(&mut self) {
        let (dx, dy) = self.facing.step();
        self.x += dx;
        self.y += dy;
    }
}

/// Anything that occupies space in a level.
pub trait Body {
    fn base(&self) -> &EntityBase;

    fn hit_box(&self) -> Rect;

    /// The hit box this body would occupy one unit further along `facing`.
    fn hit_box_after_step(&self, facing: Facing) -> Rect;

    fn position(&self) -> (i32, i32) {
        (self.base().x, self.base().y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heal_never_exceeds_max_health() {
        let mut base = EntityBase::new(0, 0, 10, 1);
        base.take_damage(3);
        base.heal(100);
        assert_eq!(base.health(), 10);
    }

    #[test]
    fn increase_max_health_only_raises_ceiling() {
        let mut base = EntityBase::new(0, 0, 10, 1);
        base.increase_max_health(4);
        assert_eq!(base.max_health(), 14);
        assert_eq!(base.health(), 10);
    }

    #[test]
    fn animation_frame_cycles_without_emitting_forty() {
        let mut base = EntityBase::new(0, 0, 1, 1);
        let mut seen = Vec::new();
        for _ in 0..120 {
            base.increase_animation_frame();
            seen.push(base.animation_frame());
        }
        assert!(seen.iter().all(|frame| *frame < 40));
        assert_eq!(seen[38], 39);
        assert_eq!(seen[39], 0);
    }

    #[test]
    fn damage_opens_invincibility_window() {
        let mut base = EntityBase::new(0, 0, 10, 1);
        assert!(base.take_damage(4));
        assert!(!base.take_damage(4));
        assert_eq!(base.health(), 6);
        assert!(base.is_damaged());

        for _ in 0..INVINCIBLE_FRAMES {
            base.decrease_invincible_frame();
        }
        assert!(!base.is_damaged());
        assert!(base.take_damage(4));
        assert_eq!(base.health(), 2);
    }

    #[test]
    fn health_and_invincibility_saturate_at_zero() {
        let mut base = EntityBase::new(0, 0, 3, 1);
        base.take_damage(10);
        assert_eq!(base.health(), 0);
        assert!(!base.is_alive());
        for _ in 0..(INVINCIBLE_FRAMES as usize + 5) {
            base.decrease_invincible_frame();
        }
        assert_eq!(base.invincible_frame(), 0);
    }
}
