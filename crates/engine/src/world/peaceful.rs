use super::geometry::Rect;
use super::level::LevelCoord;

pub const PEACEFUL_SIZE: i32 = 64;
pub const PASSIVE_EFFECT_PERIOD: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeacefulKind {
    DungeonEntrance {
        target: LevelCoord,
        spawn_x: i32,
        spawn_y: i32,
    },
    TreeOfHealth,
    Villager {
        message: String,
    },
}

impl PeacefulKind {
    pub fn as_token(&self) -> &'static str {
        match self {
            Self::DungeonEntrance { .. } => "dungeon_entrance",
            Self::TreeOfHealth => "tree_of_health",
            Self::Villager { .. } => "villager",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeacefulEntity {
    pub x: i32,
    pub y: i32,
    kind: PeacefulKind,
    passive_effect_frame: u8,
}

impl PeacefulEntity {
    pub fn new(x: i32, y: i32, kind: PeacefulKind) -> Self {
        Self {
            x,
            y,
            kind,
            passive_effect_frame: 0,
        }
    }

    pub fn kind(&self) -> &PeacefulKind {
        &self.kind
    }

    pub fn passive_effect_frame(&self) -> u8 {
        self.passive_effect_frame
    }

    /// Cycles through 1..=PASSIVE_EFFECT_PERIOD; the pulse fires on the last value.
    pub fn increase_passive_effect_frame(&mut self) {
        self.passive_effect_frame = self.passive_effect_frame % PASSIVE_EFFECT_PERIOD + 1;
    }

    pub fn passive_effect_ready(&self) -> bool {
        self.passive_effect_frame == PASSIVE_EFFECT_PERIOD
    }

    pub fn hit_box(&self) -> Rect {
        Rect::new(self.x, self.y, PEACEFUL_SIZE, PEACEFUL_SIZE)
    }
}
