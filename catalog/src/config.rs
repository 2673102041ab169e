//! Configuration management using Figment.
//!
//! Values are layered, lowest precedence first:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file: `catalog.toml` in the working directory, or the file named by
//!    `CATALOG_CONFIG`
//! 3. Environment variables prefixed `CATALOG_`, with nested keys separated by `__`
//!    (for example `CATALOG_STORE__URL` or `CATALOG_SERVICE__PORT`)

use std::{ffi::OsString, path::PathBuf, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "catalog.toml";
/// Environment variable naming an alternative configuration file.
pub const CONFIG_FILE_ENV: &str = "CATALOG_CONFIG";
/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "CATALOG_";

/// Complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub store: StoreConfig,
}

/// HTTP service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service name, reported by the health endpoints and in logs.
    pub name: String,
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Tracing filter directive, e.g. `info` or `catalog=debug,tower_http=info`.
    pub log_level: String,
    pub log_format: LogFormat,
    /// Upper bound on the handling of a single request.
    pub request_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "catalog".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            request_timeout_secs: 30,
        }
    }
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Which storage backend serves the resource collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Mongodb,
    Memory,
}

/// Document store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: BackendKind,
    /// MongoDB connection string. Ignored by the memory backend.
    pub url: String,
    pub database: String,
    /// Collection holding the resources.
    pub collection: String,
    /// Bound on each store call.
    pub operation_timeout_ms: u64,
    /// Pause between connection attempts at startup.
    pub connect_retry_delay_secs: u64,
    /// Connection attempts after the first one; `0` retries forever.
    pub connect_max_retries: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Mongodb,
            url: "mongodb://127.0.0.1:27017".to_string(),
            database: "shop".to_string(),
            collection: "products".to_string(),
            operation_timeout_ms: 5000,
            connect_retry_delay_secs: 2,
            connect_max_retries: 0,
        }
    }
}

impl StoreConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn connect_retry_delay(&self) -> Duration {
        Duration::from_secs(self.connect_retry_delay_secs)
    }
}

impl Config {
    /// Loads configuration from the default file location and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::path())
    }

    /// The configuration file: `$CATALOG_CONFIG` when set, else `catalog.toml`.
    pub fn path() -> PathBuf {
        path_from(std::env::var_os(CONFIG_FILE_ENV))
    }

    /// Loads configuration from a specific file and the environment.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::figment(Toml::file(path.into())).extract()?)
    }

    fn figment(file: impl figment::Provider) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Config::default()))
            .merge(file)
            // Environment variables have highest priority
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

fn path_from(configured: Option<OsString>) -> PathBuf {
    configured
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}
