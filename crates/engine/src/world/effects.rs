use super::collectible::ItemKind;

pub const CHEST_OPEN_EFFECT_FRAMES: u16 = 30;
pub const HEAL_EFFECT_FRAMES: u16 = 20;
pub const PROMPT_FRAMES: u16 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    ChestOpen(ItemKind),
    Heal,
}

/// Transient marker drawn over the world until its own animation completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenEffect {
    pub x: i32,
    pub y: i32,
    kind: EffectKind,
    frame: u16,
    duration: u16,
}

impl ScreenEffect {
    pub fn chest_open(x: i32, y: i32, item: ItemKind) -> Self {
        Self::new(x, y, EffectKind::ChestOpen(item), CHEST_OPEN_EFFECT_FRAMES)
    }

    pub fn heal(x: i32, y: i32) -> Self {
        Self::new(x, y, EffectKind::Heal, HEAL_EFFECT_FRAMES)
    }

    fn new(x: i32, y: i32, kind: EffectKind, duration: u16) -> Self {
        Self {
            x,
            y,
            kind,
            frame: 0,
            duration,
        }
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn advance(&mut self) {
        self.frame = self.frame.saturating_add(1).min(self.duration);
    }

    pub fn is_finished(&self) -> bool {
        self.frame >= self.duration
    }

    /// Animation progress in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        if self.duration == 0 {
            return 1.0;
        }
        f32::from(self.frame) / f32::from(self.duration)
    }
}

/// On-screen message anchored to the entity that raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenPrompt {
    pub x: i32,
    pub y: i32,
    message: String,
    frame: u16,
}

impl ScreenPrompt {
    pub fn new(x: i32, y: i32, message: impl Into<String>) -> Self {
        Self {
            x,
            y,
            message: message.into(),
            frame: 0,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn advance(&mut self) {
        self.frame = self.frame.saturating_add(1).min(PROMPT_FRAMES);
    }

    pub fn is_finished(&self) -> bool {
        self.frame >= PROMPT_FRAMES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_finishes_after_its_duration() {
        let mut effect = ScreenEffect::heal(0, 0);
        for _ in 0..HEAL_EFFECT_FRAMES - 1 {
            effect.advance();
        }
        assert!(!effect.is_finished());
        effect.advance();
        assert!(effect.is_finished());
        assert!((effect.progress() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn prompt_finishes_after_prompt_frames() {
        let mut prompt = ScreenPrompt::new(0, 0, "hello");
        for _ in 0..PROMPT_FRAMES {
            prompt.advance();
        }
        assert!(prompt.is_finished());
        assert_eq!(prompt.message(), "hello");
    }
}
