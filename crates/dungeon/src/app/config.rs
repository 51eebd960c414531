use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine::{LoopConfig, SessionConfig};
use serde::Deserialize;

pub(crate) const CONFIG_ENV_VAR: &str = "DUNGEON_CONFIG";
pub(crate) const DEFAULT_CONFIG_FILE: &str = "dungeon.config.json";

/// Optional `dungeon.config.json`. Every field may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) session: SessionConfig,
    #[serde(rename = "loop")]
    pub(crate) loop_overrides: LoopOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LoopOverrides {
    window_title: Option<String>,
    window_width: Option<u32>,
    window_height: Option<u32>,
    target_tps: Option<u32>,
    max_ticks_per_frame: Option<u32>,
    max_frame_delta_ms: Option<u64>,
    metrics_log_interval_ms: Option<u64>,
    max_render_fps: Option<u32>,
}

impl LoopOverrides {
    pub(crate) fn apply(&self, mut config: LoopConfig) -> LoopConfig {
        if let Some(title) = &self.window_title {
            config.window_title = title.clone();
        }
        if let Some(width) = self.window_width {
            config.window_width = width;
        }
        if let Some(height) = self.window_height {
            config.window_height = height;
        }
        if let Some(tps) = self.target_tps {
            config.target_tps = tps;
        }
        if let Some(ticks) = self.max_ticks_per_frame {
            config.max_ticks_per_frame = ticks;
        }
        if let Some(ms) = self.max_frame_delta_ms {
            config.max_frame_delta = Duration::from_millis(ms);
        }
        if let Some(ms) = self.metrics_log_interval_ms {
            config.metrics_log_interval = Duration::from_millis(ms);
        }
        if self.max_render_fps.is_some() {
            config.max_render_fps = self.max_render_fps;
        }
        config
    }
}

/// Where the config file lives and whether it must exist. An explicit
/// `DUNGEON_CONFIG` path is required to exist; the default path is optional.
pub(crate) fn config_path(root: &Path, env_value: Option<String>) -> (PathBuf, bool) {
    match env_value {
        Some(value) if !value.trim().is_empty() => (PathBuf::from(value.trim()), true),
        _ => (root.join(DEFAULT_CONFIG_FILE), false),
    }
}

pub(crate) fn load_config(path: &Path, required: bool) -> Result<FileConfig, String> {
    if !required && !path.exists() {
        return Ok(FileConfig::default());
    }
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("read config {}: {error}", path.display()))?;
    parse_config_json(&raw).map_err(|message| format!("{} ({})", message, path.display()))
}

pub(crate) fn parse_config_json(raw: &str) -> Result<FileConfig, String> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, FileConfig>(&mut deserializer) {
        Ok(config) => Ok(config),
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            if path.is_empty() || path == "." {
                Err(format!("parse config json: {source}"))
            } else {
                Err(format!("parse config json at {path}: {source}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn empty_object_keeps_defaults() {
        let config = parse_config_json("{}").expect("parse");
        assert_eq!(config.session, SessionConfig::default());
        let loop_config = config.loop_overrides.apply(LoopConfig::default());
        assert_eq!(loop_config.target_tps, 30);
    }

    #[test]
    fn overrides_are_applied() {
        let config = parse_config_json(
            r#"{
                "session": { "player_health": 12, "start_column": 0, "start_row": 0 },
                "loop": { "target_tps": 60, "max_render_fps": 120, "window_title": "Test" }
            }"#,
        )
        .expect("parse");
        assert_eq!(config.session.player_health, 12);
        assert_eq!(config.session.spawn_x, 480);
        assert_eq!(config.session.start_level(), engine::DUNGEON_LEVEL);

        let loop_config = config.loop_overrides.apply(LoopConfig::default());
        assert_eq!(loop_config.target_tps, 60);
        assert_eq!(loop_config.max_render_fps, Some(120));
        assert_eq!(loop_config.window_title, "Test");
        assert_eq!(loop_config.window_width, 1024);
    }

    #[test]
    fn unknown_field_reports_its_path() {
        let err = parse_config_json(r#"{ "session": { "player_hp": 3 } }"#).expect_err("err");
        assert!(err.contains("at session"), "{err}");
        assert!(err.contains("player_hp"), "{err}");
    }

    #[test]
    fn wrong_type_reports_its_path() {
        let err = parse_config_json(r#"{ "loop": { "target_tps": "fast" } }"#).expect_err("err");
        assert!(err.contains("loop.target_tps"), "{err}");
    }

    #[test]
    fn default_config_file_is_optional() {
        let temp = TempDir::new().expect("temp");
        let (path, required) = config_path(temp.path(), None);
        assert!(!required);
        assert_eq!(path, temp.path().join(DEFAULT_CONFIG_FILE));
        let config = load_config(&path, required).expect("defaults");
        assert_eq!(config.session, SessionConfig::default());
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let temp = TempDir::new().expect("temp");
        let missing = temp.path().join("custom.json");
        let (path, required) =
            config_path(temp.path(), Some(missing.to_string_lossy().into_owned()));
        assert!(required);
        assert!(load_config(&path, required).is_err());

        fs::write(&missing, r#"{ "session": { "base_move_speed": 2 } }"#).expect("write");
        let config = load_config(&path, required).expect("load");
        assert_eq!(config.session.base_move_speed, 2);
    }
}
