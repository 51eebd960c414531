use super::collectible::Collectible;
use super::geometry::Rect;

pub const CONTAINER_SIZE: i32 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Wooden,
    StoneSword,
}

impl ContainerKind {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Wooden => "wooden",
            Self::StoneSword => "stone_sword",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "wooden" => Some(Self::Wooden),
            "stone_sword" => Some(Self::StoneSword),
            _ => None,
        }
    }

    pub fn grants_sword(self) -> bool {
        matches!(self, Self::StoneSword)
    }
}

/// A chest. Its inventory is handed out once; later opens see nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub x: i32,
    pub y: i32,
    kind: ContainerKind,
    is_opened: bool,
    inventory: Vec<Collectible>,
}

impl Container {
    pub fn new(x: i32, y: i32, kind: ContainerKind, inventory: Vec<Collectible>) -> Self {
        Self {
            x,
            y,
            kind,
            is_opened: false,
            inventory,
        }
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn is_opened(&self) -> bool {
        self.is_opened
    }

    /// Marks the chest opened. Returns its inventory on the first call only.
    pub fn open(&mut self) -> Option<&[Collectible]> {
        if self.is_opened {
            return None;
        }
        self.is_opened = true;
        Some(&self.inventory)
    }

    pub fn hit_box(&self) -> Rect {
        Rect::new(self.x, self.y, CONTAINER_SIZE, CONTAINER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::collectible::ItemKind;

    #[test]
    fn open_is_idempotent() {
        let mut chest = Container::new(
            0,
            0,
            ContainerKind::Wooden,
            vec![Collectible::new(0, 0, ItemKind::Coin)],
        );
        assert_eq!(chest.open().map(<[Collectible]>::len), Some(1));
        assert!(chest.open().is_none());
        assert!(chest.is_opened());
    }
}
