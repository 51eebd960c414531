use super::geometry::Rect;
use super::player::Player;

pub const COLLECTIBLE_SIZE: i32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Coin,
    Health,
    MaxHealth,
}

impl ItemKind {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Coin => "coin",
            Self::Health => "health",
            Self::MaxHealth => "max_health",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "coin" => Some(Self::Coin),
            "health" => Some(Self::Health),
            "max_health" => Some(Self::MaxHealth),
            _ => None,
        }
    }

    /// Credits this item to the player.
    pub fn award(self, player: &mut Player) {
        match self {
            Self::Coin => player.add_coin(),
            Self::Health => player.add_health(),
            Self::MaxHealth => player.add_max_health(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collectible {
    pub x: i32,
    pub y: i32,
    pub kind: ItemKind,
}

impl Collectible {
    pub fn new(x: i32, y: i32, kind: ItemKind) -> Self {
        Self { x, y, kind }
    }

    pub fn hit_box(&self) -> Rect {
        Rect::new(self.x, self.y, COLLECTIBLE_SIZE, COLLECTIBLE_SIZE)
    }
}
