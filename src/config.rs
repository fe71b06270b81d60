//! Configuration management for the job registry
//!
//! Layered loading, highest priority last:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables
//!
//! Environment overrides use the pattern `CRONREG__<section>__<key>`, e.g.
//! `CRONREG__STORE__DATA_PATH=/var/lib/cronreg`. The configuration file
//! defaults to `config/cronreg.toml` and can be pointed elsewhere with the
//! `CRONREG_CONFIG` environment variable. A `.env` file is honored when
//! present.

use std::env;
use std::path::PathBuf;

use config::{ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

const CONFIG_ENV_VAR: &str = "CRONREG_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/cronreg.toml";
const ENV_PREFIX: &str = "CRONREG";
const ENV_SEPARATOR: &str = "__";

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub store: StoreConfig,
    /// Conventional actor value for callers that have no real identity of
    /// their own (startup tasks, the scheduler runtime). The registry never
    /// reads this itself; every mutating call takes the actor explicitly.
    #[serde(default = "default_system_actor")]
    pub system_actor: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            system_actor: default_system_actor(),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/registry")
}

fn default_system_actor() -> String {
    "system".to_string()
}

impl RegistryConfig {
    /// Load configuration from all sources (file + environment)
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file doesn't exist)
        let _ = dotenvy::dotenv();

        let config_path = env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        Self::load_from_path(config_path)
    }

    /// Load configuration from a specific path and the environment
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(config_path: PathBuf) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if config_path.exists() {
            tracing::info!("Loading configuration from: {}", config_path.display());
            builder = builder.add_source(File::from(config_path).required(false));
        } else {
            tracing::warn!(
                "Configuration file not found at {}, using defaults and environment overrides",
                config_path.display()
            );
        }

        // CRONREG__STORE__DATA_PATH -> store.data_path
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
