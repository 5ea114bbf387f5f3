//! Bot configuration: `~/.odds/config.toml` plus CLI overrides.
//!
//! Every key is optional. CLI flags always override config file values.

use anyhow::{bail, Context, Result};
use odds_core::ChallengeLimits;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Top-level config file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub game: GameSection,
}

/// `[game]` section of the config TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GameSection {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_min_max")]
    pub min_max: u32,
    #[serde(default = "default_max_max")]
    pub max_max: u32,
    #[serde(default = "default_prompt_max_len")]
    pub prompt_max_len: usize,
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            min_max: default_min_max(),
            max_max: default_max_max(),
            prompt_max_len: default_prompt_max_len(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    120_000
}
fn default_min_max() -> u32 {
    2
}
fn default_max_max() -> u32 {
    10_000
}
fn default_prompt_max_len() -> usize {
    200
}

/// Values given on the command line; `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub timeout_ms: Option<u64>,
    pub min_max: Option<u32>,
    pub max_max: Option<u32>,
}

/// Resolved configuration (CLI overrides applied, values validated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OddsConfig {
    pub timeout: Duration,
    pub limits: ChallengeLimits,
}

impl OddsConfig {
    /// Load config from a TOML file, then apply CLI overrides.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(config_path: &Path, overrides: &Overrides) -> Result<Self> {
        let expanded = expand_tilde(config_path);
        let file_config = if expanded.exists() {
            info!(path = %expanded.display(), "loading config file");
            let content = std::fs::read_to_string(&expanded)
                .with_context(|| format!("failed to read config at {}", expanded.display()))?;
            toml::from_str::<ConfigFile>(&content)
                .with_context(|| format!("failed to parse config at {}", expanded.display()))?
        } else {
            debug!(path = %expanded.display(), "config file not found, using defaults");
            ConfigFile::default()
        };

        Self::resolve(file_config, overrides)
    }

    fn resolve(file_config: ConfigFile, overrides: &Overrides) -> Result<Self> {
        let game = file_config.game;
        let timeout_ms = overrides.timeout_ms.unwrap_or(game.timeout_ms);
        let min_max = overrides.min_max.unwrap_or(game.min_max);
        let max_max = overrides.max_max.unwrap_or(game.max_max);

        if timeout_ms == 0 {
            bail!("timeout_ms must be positive");
        }
        if min_max < 2 {
            bail!("min_max must be at least 2 (got {min_max})");
        }
        if max_max < min_max {
            bail!("max_max ({max_max}) must not be below min_max ({min_max})");
        }
        if game.prompt_max_len == 0 {
            bail!("prompt_max_len must be positive");
        }

        Ok(Self {
            timeout: Duration::from_millis(timeout_ms),
            limits: ChallengeLimits {
                min_max,
                max_max,
                prompt_max_len: game.prompt_max_len,
            },
        })
    }
}

/// Expand `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = OddsConfig::resolve(ConfigFile::default(), &Overrides::default()).unwrap();
        assert_eq!(cfg.timeout, Duration::from_millis(120_000));
        assert_eq!(cfg.limits, ChallengeLimits::default());
    }

    #[test]
    fn parse_partial_toml_config() {
        let toml_str = r#"
[game]
timeout_ms = 5000
"#;
        let file: ConfigFile = toml::from_str(toml_str).unwrap();
        let cfg = OddsConfig::resolve(file, &Overrides::default()).unwrap();
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.limits.max_max, 10_000); // default
    }

    #[test]
    fn cli_overrides_win() {
        let toml_str = r#"
[game]
timeout_ms = 5000
min_max = 3
max_max = 50
"#;
        let file: ConfigFile = toml::from_str(toml_str).unwrap();
        let overrides = Overrides {
            timeout_ms: Some(1000),
            min_max: None,
            max_max: Some(99),
        };
        let cfg = OddsConfig::resolve(file, &overrides).unwrap();
        assert_eq!(cfg.timeout, Duration::from_secs(1));
        assert_eq!(cfg.limits.min_max, 3);
        assert_eq!(cfg.limits.max_max, 99);
    }

    #[test]
    fn rejects_invalid_values() {
        let zero_timeout = Overrides {
            timeout_ms: Some(0),
            ..Overrides::default()
        };
        assert!(OddsConfig::resolve(ConfigFile::default(), &zero_timeout).is_err());

        let min_too_small = Overrides {
            min_max: Some(1),
            ..Overrides::default()
        };
        assert!(OddsConfig::resolve(ConfigFile::default(), &min_too_small).is_err());

        let inverted = Overrides {
            min_max: Some(10),
            max_max: Some(5),
            ..Overrides::default()
        };
        assert!(OddsConfig::resolve(ConfigFile::default(), &inverted).is_err());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = OddsConfig::load(&dir.path().join("nope.toml"), &Overrides::default()).unwrap();
        assert_eq!(cfg.timeout, Duration::from_millis(120_000));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[game]\ntimeout_ms = \"soon\"\n").unwrap();
        let err = OddsConfig::load(&path, &Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }
}
