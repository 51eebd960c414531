use super::geometry::{Facing, Rect};

pub const MISSILE_LIFETIME_FRAMES: u16 = 60;
pub const MISSILE_SPEED: i32 = 4;
pub const MISSILE_SIZE: i32 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Missile {
    pub x: i32,
    pub y: i32,
    facing: Facing,
    damage: u32,
    animation_frame: u16,
    lifetime: u16,
}

impl Missile {
    pub fn new(x: i32, y: i32, facing: Facing, damage: u32) -> Self {
        Self {
            x,
            y,
            facing,
            damage,
            animation_frame: 0,
            lifetime: MISSILE_LIFETIME_FRAMES,
        }
    }

    pub fn with_lifetime(mut self, lifetime: u16) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn damage(&self) -> u32 {
        self.damage
    }

    pub fn animation_frame(&self) -> u16 {
        self.animation_frame
    }

    pub fn increase_animation_frame(&mut self) {
        self.animation_frame = self.animation_frame.saturating_add(1);
    }

    pub fn should_animation_end(&self) -> bool {
        self.animation_frame >= self.lifetime
    }

    pub fn move_forward(&mut self) {
        let (dx, dy) = self.facing.step();
        self.x += dx * MISSILE_SPEED;
        self.y += dy * MISSILE_SPEED;
    }

    pub fn hit_box(&self) -> Rect {
        Rect::new(self.x, self.y, MISSILE_SIZE, MISSILE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifetime_predicate_fires_at_threshold() {
        let mut missile = Missile::new(0, 0, Facing::East, 1).with_lifetime(3);
        missile.increase_animation_frame();
        missile.increase_animation_frame();
        assert!(!missile.should_animation_end());
        missile.increase_animation_frame();
        assert!(missile.should_animation_end());
    }

    #[test]
    fn moves_along_facing_at_missile_speed() {
        let mut missile = Missile::new(10, 10, Facing::North, 1);
        missile.move_forward();
        assert_eq!((missile.x, missile.y), (10, 10 - MISSILE_SPEED));
    }
}
