mod level_loader;
mod manifest;

pub use level_loader::{
    load_level_file, parse_level, ContentError, ContentErrorCode, SourceLocation,
};
pub use manifest::{
    level_file_path, load_world_map, manifest_coords, DUNGEON_LEVEL, OVERWORLD_LEVELS,
};
