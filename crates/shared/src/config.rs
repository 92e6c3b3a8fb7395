//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upload storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// How uploaded files are named inside the storage root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    /// Store under the client-supplied name (after validation).
    #[default]
    Declared,
    /// Store under `{uuid}_{declared name}`.
    Generated,
}

/// Upload storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Directory that receives uploaded files.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Naming strategy for stored files.
    #[serde(default)]
    pub naming: NamingStrategy,
    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            root: default_root(),
            naming: NamingStrategy::default(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("uploaded-files")
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024 // 10 MiB
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging configuration. Filtering is controlled by `RUST_LOG`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `INTAKE__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("INTAKE").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Address the HTTP listener binds to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
