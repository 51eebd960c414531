use std::path::{Path, PathBuf};

use tracing::info;

use crate::world::{LevelCoord, WorldMap};

use super::level_loader::{load_level_file, ContentError, ContentErrorCode};

pub const DUNGEON_LEVEL: LevelCoord = LevelCoord::new(0, 0);

/// Overworld grid cells that carry a level.
pub const OVERWORLD_LEVELS: [LevelCoord; 18] = [
    LevelCoord::new(2, 0),
    LevelCoord::new(3, 0),
    LevelCoord::new(2, 1),
    LevelCoord::new(3, 1),
    LevelCoord::new(4, 1),
    LevelCoord::new(0, 2),
    LevelCoord::new(1, 2),
    LevelCoord::new(4, 2),
    LevelCoord::new(0, 3),
    LevelCoord::new(1, 3),
    LevelCoord::new(2, 3),
    LevelCoord::new(3, 3),
    LevelCoord::new(4, 3),
    LevelCoord::new(0, 4),
    LevelCoord::new(1, 4),
    LevelCoord::new(2, 4),
    LevelCoord::new(3, 4),
    LevelCoord::new(4, 4),
];

pub fn manifest_coords() -> impl Iterator<Item = LevelCoord> {
    OVERWORLD_LEVELS
        .into_iter()
        .chain(std::iter::once(DUNGEON_LEVEL))
}

pub fn level_file_path(levels_dir: &Path, coord: LevelCoord) -> PathBuf {
    levels_dir.join(format!("level_{}_{}.xml", coord.column, coord.row))
}

/// Loads every manifest level from `levels_dir` and registers it with a new
/// world map. A file whose `<Level>` coordinate disagrees with its manifest
/// slot is rejected.
pub fn load_world_map(levels_dir: &Path) -> Result<WorldMap, ContentError> {
    let mut world_map = WorldMap::new();
    for coord in manifest_coords() {
        let path = level_file_path(levels_dir, coord);
        let level = load_level_file(&path)?;
        if level.coord() != coord {
            return Err(ContentError {
                code: ContentErrorCode::CoordMismatch,
                message: format!(
                    "level file declares {} but the manifest binds it to {coord}",
                    level.coord()
                ),
                file_path: path,
                location: None,
            });
        }
        world_map.add_level(level);
    }
    info!(
        levels = world_map.len(),
        levels_dir = %levels_dir.display(),
        "world_map_loaded"
    );
    Ok(world_map)
}
