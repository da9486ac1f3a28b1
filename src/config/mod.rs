//! Configuration management
//!
//! TOML file under `~/.ctipop/`, loaded at startup with defaults for
//! anything missing. Saving writes the whole file back, mirroring the
//! remember-me behavior of the desktop client.

use crate::domain::call::classifier::PopTrigger;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub pbx: PbxConfig,
    #[serde(default)]
    pub screen_pop: ScreenPopConfig,
    #[serde(default)]
    pub call_control: CallControlConfig,
}

/// Connection settings for the PBX provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PbxConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    /// Monitored extension; also the anchor of the direction heuristic
    pub extension: String,
}

impl Default for PbxConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            username: String::new(),
            password: String::new(),
            extension: String::new(),
        }
    }
}

/// Screen-pop behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenPopConfig {
    /// URL with a `{number}` or `%s` placeholder for the caller number
    pub url_template: String,
    pub trigger: PopTrigger,
    pub enabled: bool,
}

impl Default for ScreenPopConfig {
    fn default() -> Self {
        Self {
            url_template: "http://localhost/crm?number={number}".to_string(),
            trigger: PopTrigger::Ringing,
            enabled: true,
        }
    }
}

/// Call-control tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallControlConfig {
    /// Allow the park probe in the hold sequence. Off by default: park can
    /// move the call to a slot the agent cannot see.
    pub allow_park: bool,
    /// How long an outbound call must stay active before it is shown as
    /// connected, filtering the provider's optimistic early events.
    pub outbound_connect_delay_ms: u64,
}

impl Default for CallControlConfig {
    fn default() -> Self {
        Self {
            allow_park: false,
            outbound_connect_delay_ms: 2000,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults when the
    /// file is missing or malformed.
    pub fn load() -> Self {
        Self::load_from(Self::config_file())
    }

    pub fn load_from(path: PathBuf) -> Self {
        match std::fs::read_to_string(&path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(config) => {
                    debug!(path = %path.display(), "config: loaded");
                    config
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "config: parse failed, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "config: no file, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(Self::config_file())
    }

    pub fn save_to(&self, path: PathBuf) -> anyhow::Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&path, toml)?;
        debug!(path = %path.display(), "config: saved");
        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ctipop")
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn history_file() -> PathBuf {
        Self::config_dir().join("history.json")
    }
}
