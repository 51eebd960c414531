use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;
pub mod sim;
mod sprite_keys;
pub mod world;

pub use app::{
    level_origin_px, load_session, run_app, run_headless, world_to_screen_px, AppError,
    HeadlessSummary, InputAction, LoopConfig, LoopMetricsSnapshot, Renderer, TickLimiter,
    Viewport,
};
pub use content::{
    level_file_path, load_level_file, load_world_map, manifest_coords, parse_level,
    ContentError, ContentErrorCode, SourceLocation, DUNGEON_LEVEL, OVERWORLD_LEVELS,
};
pub use sim::{GameSession, SessionConfig, SessionError, TickOutcome, TickPhase, TickReport};
pub use sprite_keys::{SpriteKey, SpriteKeyError};

pub const ROOT_ENV_VAR: &str = "DUNGEON_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    pub levels_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("level directory is missing: {0}")]
    MissingLevelsDir(PathBuf),
    #[error(
        "DUNGEON_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain an assets/ directory."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing an assets/ directory.\n\
Set {env_var} explicitly, for example:\n\
export {env_var}=\"/path/to/dungeon\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    paths_under_root(resolve_root()?)
}

fn paths_under_root(root: PathBuf) -> Result<AppPaths, StartupError> {
    let assets_dir = root.join("assets");
    let levels_dir = assets_dir.join("levels");
    if !levels_dir.is_dir() {
        return Err(StartupError::MissingLevelsDir(levels_dir));
    }

    Ok(AppPaths {
        root,
        assets_dir,
        levels_dir,
    })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let raw = PathBuf::from(value);
            let normalized = normalize_path(&raw);
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            for candidate in exe_dir.ancestors() {
                if is_repo_marker(candidate) {
                    return Ok(normalize_path(candidate));
                }
            }

            Err(StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    path.join("assets").is_dir()
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
