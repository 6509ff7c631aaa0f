//! Configuration for the gutendex command-line tool.
//!
//! Sources are merged in increasing order of precedence:
//!
//! 1. Built-in defaults.
//! 2. `config.toml` in the platform config directory
//!    (`$XDG_CONFIG_HOME/gutendex/config.toml` on Linux).
//! 3. An explicitly named file, parsed as TOML, YAML or JSON depending on its
//!    extension.
//! 4. Environment variables prefixed with `GUTENDEX_`, such as
//!    `GUTENDEX_DATABASE` or `GUTENDEX_TOPIC_MODE`.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml, Yaml};
use gutendex_search::TopicMode;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

const APPLICATION: &str = "gutendex";
const ENV_PREFIX: &str = "GUTENDEX_";
const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "catalog.db";
const DEFAULT_LOG_LEVEL: &str = "warn";
const DEFAULT_MAX_CONNECTIONS: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite catalog.
    pub database: PathBuf,
    pub topic_mode: TopicMode,
    /// Default `tracing` filter directive; `RUST_LOG` takes precedence.
    pub log_level: String,
    /// Upper bound on pooled catalog connections.
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            topic_mode: TopicMode::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APPLICATION)
}

fn default_database() -> PathBuf {
    match project_dirs() {
        Some(dirs) => dirs.data_dir().join(DATABASE_FILE),
        // No home directory to speak of; fall back to the working directory.
        None => PathBuf::from(DATABASE_FILE),
    }
}

/// Location of the per-user configuration file, if the platform has one.
pub fn user_config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

impl Config {
    /// Load and validate the configuration, optionally layering `explicit`
    /// on top of the per-user file.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(explicit)?.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()
    }

    /// Every source merged in order, without extracting anything yet.
    pub fn figment(explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new();
        if let Some(path) = user_config_file() {
            debug!(path = %path.display(), "user config file");
            // Silently skipped when missing.
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::Load);
            }
            debug!(path = %path.display(), "explicit config file");
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::Invalid("config file must be .toml, .yaml or .json")),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    pub fn validate(self) -> Result<Self> {
        if self.max_connections == 0 {
            exn::bail!(ErrorKind::Invalid("max_connections must be positive"));
        }
        if self.database.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("database path is empty"));
        }
        Ok(self)
    }
}
