use std::env;

use engine::{load_session, resolve_app_paths, AppPaths, GameSession, LoopConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{config_path, load_config, CONFIG_ENV_VAR};

const HEADLESS_TICKS_ENV_VAR: &str = "DUNGEON_HEADLESS_TICKS";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) session: GameSession,
    pub(crate) paths: AppPaths,
    pub(crate) headless_ticks: Option<u64>,
}

pub(crate) fn build_app() -> Result<AppWiring, String> {
    init_tracing();
    info!("=== Dungeon Startup ===");

    let paths = resolve_app_paths().map_err(|error| error.to_string())?;
    let (path, required) = config_path(&paths.root, env::var(CONFIG_ENV_VAR).ok());
    let file_config = load_config(&path, required)?;
    let config = file_config.loop_overrides.apply(LoopConfig::default());
    let session =
        load_session(&paths.levels_dir, &file_config.session).map_err(|error| error.to_string())?;
    let headless_ticks = parse_headless_ticks(env::var(HEADLESS_TICKS_ENV_VAR).ok())?;

    info!(
        root = %paths.root.display(),
        config = %path.display(),
        headless = headless_ticks.is_some(),
        "startup_complete"
    );
    Ok(AppWiring {
        config,
        session,
        paths,
        headless_ticks,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_headless_ticks(raw: Option<String>) -> Result<Option<u64>, String> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| format!("{HEADLESS_TICKS_ENV_VAR} must be a tick count, got '{trimmed}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_ticks_parse_from_env_value() {
        assert_eq!(parse_headless_ticks(None), Ok(None));
        assert_eq!(parse_headless_ticks(Some("  ".to_string())), Ok(None));
        assert_eq!(parse_headless_ticks(Some("90".to_string())), Ok(Some(90)));
        assert!(parse_headless_ticks(Some("-3".to_string())).is_err());
    }
}
