use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::data::loader::clip_path;

/// File looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "dashboard.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Where the data lives and how the window behaves.
/// Every field is optional in `dashboard.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub audio_dir: PathBuf,
    /// Clip played whenever a click does not resolve to a row.
    pub default_audio_id: String,
    /// How far from a point (in pixels) a click still selects it.
    pub click_radius_px: f32,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("disgust_all.csv"),
            audio_dir: PathBuf::from("disgust-audios"),
            default_audio_id: "a_ca_001_01".to_string(),
            click_radius_px: 8.0,
            window_width: 1400.0,
            window_height: 850.0,
        }
    }
}

impl DashboardConfig {
    /// Read `dashboard.toml` from `dir`, falling back to defaults when absent.
    /// Relative paths in the result are resolved against `dir`.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        let mut config = if path.is_file() {
            let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            let parsed: DashboardConfig =
                toml::from_str(&text).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?;
            log::info!("Loaded configuration from {}", path.display());
            parsed
        } else {
            log::debug!("No {CONFIG_FILE} in {}, using defaults", dir.display());
            DashboardConfig::default()
        };

        config.data_path = dir.join(&config.data_path);
        config.audio_dir = dir.join(&config.audio_dir);
        Ok(config)
    }

    pub fn default_clip(&self) -> PathBuf {
        clip_path(&self.audio_dir, &self.default_audio_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults_under_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::load(dir.path()).unwrap();

        assert_eq!(config.data_path, dir.path().join("disgust_all.csv"));
        assert_eq!(
            config.default_clip(),
            dir.path().join("disgust-audios").join("a_ca_001_01.wav")
        );
        assert_eq!(config.click_radius_px, 8.0);
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "audio_dir = \"clips\"\nclick_radius_px = 12.5\n",
        )
        .unwrap();

        let config = DashboardConfig::load(dir.path()).unwrap();
        assert_eq!(config.audio_dir, dir.path().join("clips"));
        assert_eq!(config.click_radius_px, 12.5);
        assert_eq!(config.default_audio_id, "a_ca_001_01");
    }

    #[test]
    fn absolute_paths_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("elsewhere.csv");
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            format!("data_path = {:?}\n", data.to_string_lossy()),
        )
        .unwrap();

        let config = DashboardConfig::load(dir.path()).unwrap();
        assert_eq!(config.data_path, data);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "click_radius_px = \"wide\"\n").unwrap();
        assert!(matches!(
            DashboardConfig::load(dir.path()),
            Err(ConfigError::Parse { .. })
        ));

        std::fs::write(dir.path().join(CONFIG_FILE), "colour = \"red\"\n").unwrap();
        assert!(DashboardConfig::load(dir.path()).is_err());
    }
}
