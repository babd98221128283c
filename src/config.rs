//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/hirepass/hirepass.toml`
//! 3. Environment variables: `HIREPASS_*` prefix (`__` separates nested keys)
//! 4. Command line (`--data-dir`), applied by the caller

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{Recurrence, ServiceDefaults};

/// Parameters for the seed service and for new services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DefaultServiceConfig {
    pub name: String,
    pub seed: i64,
    pub multiplier: i64,
    pub addend: i64,
    pub modulus: i64,
}

impl Default for DefaultServiceConfig {
    fn default() -> Self {
        let defaults = ServiceDefaults::default();
        Self {
            name: defaults.name,
            seed: defaults.seed,
            multiplier: defaults.recurrence.multiplier,
            addend: defaults.recurrence.addend,
            modulus: defaults.recurrence.modulus,
        }
    }
}

/// Raw default-service config for intermediate parsing (`None` = not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDefaultServiceConfig {
    pub name: Option<String>,
    pub seed: Option<i64>,
    pub multiplier: Option<i64>,
    pub addend: Option<i64>,
    pub modulus: Option<i64>,
}

impl DefaultServiceConfig {
    fn merge(&self, overlay: &RawDefaultServiceConfig) -> Self {
        Self {
            name: overlay.name.clone().unwrap_or_else(|| self.name.clone()),
            seed: overlay.seed.unwrap_or(self.seed),
            multiplier: overlay.multiplier.unwrap_or(self.multiplier),
            addend: overlay.addend.unwrap_or(self.addend),
            modulus: overlay.modulus.unwrap_or(self.modulus),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_dir: Option<PathBuf>,
    pub submit_timeout_ms: Option<u64>,
    pub default_service: RawDefaultServiceConfig,
}

/// Unified configuration for hirepass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the state files (default: ~/.hirepass)
    pub data_dir: PathBuf,
    /// Timeout for form submissions in milliseconds
    pub submit_timeout_ms: u64,
    /// Seed service and defaults for new services
    pub default_service: DefaultServiceConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: dirs_default_data_dir(),
            submit_timeout_ms: 10_000,
            default_service: DefaultServiceConfig::default(),
        }
    }
}

/// Get the default data directory (~/.hirepass).
fn dirs_default_data_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".hirepass"))
        .unwrap_or_else(|| PathBuf::from("~/.hirepass"))
}

/// Get the XDG config directory for hirepass.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "hirepass").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("hirepass.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a path-like string.
pub fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Defaults handed to the service registry.
    pub fn service_defaults(&self) -> ServiceDefaults {
        let d = &self.default_service;
        ServiceDefaults {
            name: d.name.clone(),
            seed: d.seed,
            recurrence: Recurrence {
                multiplier: d.multiplier,
                addend: d.addend,
                modulus: d.modulus,
            },
        }
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_path(self.data_dir.to_string_lossy().as_ref());
        self.data_dir = PathBuf::from(expanded);
    }

    /// Merge overlay config onto self: overlay wins where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_dir: overlay
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            submit_timeout_ms: overlay.submit_timeout_ms.unwrap_or(self.submit_timeout_ms),
            default_service: self.default_service.merge(&overlay.default_service),
        }
    }

    /// Load settings with layered precedence from the global config file.
    pub fn load() -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref())
    }

    /// Load settings using `config_file` in place of the global config.
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. `config_file`, if it exists
    /// 3. Environment variables: `HIREPASS_*` prefix
    pub fn load_from(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = config_file {
            if path.exists() {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply HIREPASS_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("HIREPASS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("data_dir") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get::<u64>("submit_timeout_ms") {
            settings.submit_timeout_ms = val;
        }
        if let Ok(val) = config.get_string("default_service.name") {
            settings.default_service.name = val;
        }
        if let Ok(val) = config.get::<i64>("default_service.seed") {
            settings.default_service.seed = val;
        }
        if let Ok(val) = config.get::<i64>("default_service.multiplier") {
            settings.default_service.multiplier = val;
        }
        if let Ok(val) = config.get::<i64>("default_service.addend") {
            settings.default_service.addend = val;
        }
        if let Ok(val) = config.get::<i64>("default_service.modulus") {
            settings.default_service.modulus = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# hirepass configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/hirepass/hirepass.toml
#   Env:    HIREPASS_* environment variables (e.g. HIREPASS_DEFAULT_SERVICE__SEED)
#   CLI:    --data-dir

# Directory holding hirepass-data-v1.json and hirepass-integrations-v1.json
# data_dir = "~/.hirepass"

# Timeout for Google Form submissions (milliseconds)
# submit_timeout_ms = 10000

[default_service]
# Service created on first run, and defaults for `service add`
# name = "(G) Trailer"
# seed = 41378

# Recurrence: next = (current * multiplier + addend) mod modulus
# multiplier = 7
# addend = 386
# modulus = 100000
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
