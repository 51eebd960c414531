use serde::Deserialize;

use crate::world::LevelCoord;

/// Initial player state and starting level for a new session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub spawn_x: i32,
    pub spawn_y: i32,
    pub player_health: u32,
    pub player_damage: u32,
    pub base_move_speed: u32,
    pub start_column: u32,
    pub start_row: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            spawn_x: 480,
            spawn_y: 900,
            player_health: 10,
            player_damage: 2,
            base_move_speed: 1,
            start_column: 2,
            start_row: 4,
        }
    }
}

impl SessionConfig {
    pub fn start_level(&self) -> LevelCoord {
        LevelCoord::new(self.start_column, self.start_row)
    }
}
