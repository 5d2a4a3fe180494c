//! Bootstrap configuration loading
//!
//! Every key has a built-in default, so a missing or empty TOML file is a
//! valid configuration. Resolution priority for the file location:
//! 1. Command-line argument (highest priority)
//! 2. `TJA_CONFIG` environment variable
//! 3. `<config_dir>/trafficjam/<module>.toml`
//! 4. Built-in defaults (no file)
//!
//! A handful of environment variables override individual keys after the
//! file has been read (see [`TomlConfig::apply_env_overrides`]).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "TJA_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub ollama: OllamaConfig,
    pub images: ImagesConfig,
    pub vector_store: VectorStoreConfig,
    pub scheduler: SchedulerConfig,
    pub logging: LoggingConfig,
}

/// HTTP control surface
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5780,
        }
    }
}

/// SQLite source repository
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_data_dir().join("trafficjam.db"),
        }
    }
}

/// Vision model backend
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2-vision".to_string(),
            timeout_secs: 300,
        }
    }
}

/// Camera snapshot source
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            base_url: "http://cic.tenerife.es/e-Traffic3/data".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Similarity index service; disabled when no URL is configured
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
        }
    }
}

/// Polling loop timings and policies
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Start the polling loop together with the service
    pub autostart: bool,
    /// Delay before the bootstrap pass (dependent services coming up)
    pub warmup_secs: u64,
    /// Delay after each camera during bootstrap
    pub bootstrap_pacing_secs: u64,
    /// Delay after each camera during steady state
    pub cycle_pacing_secs: u64,
    /// Delay between steady-state cycles
    pub cycle_interval_secs: u64,
    /// Title marking cameras that still need a name
    pub placeholder_title: String,
    /// Re-query the model field by field when parsing fails
    pub field_recovery: bool,
    /// Health reports degraded when the last cycle is older than this
    pub stale_after_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            autostart: true,
            warmup_secs: 30,
            bootstrap_pacing_secs: 35,
            cycle_pacing_secs: 5,
            cycle_interval_secs: 60,
            placeholder_title: crate::models::PLACEHOLDER_TITLE.to_string(),
            field_recovery: true,
            stale_after_secs: 600,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins when set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Read and parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Resolve, load and override configuration for a module
    ///
    /// An explicitly named file (CLI or `TJA_CONFIG`) must exist; the
    /// per-user default location is optional.
    pub fn load(cli_path: Option<&Path>, module_name: &str) -> Result<Self> {
        let mut config = match resolve_config_path(cli_path, module_name) {
            ConfigLocation::Explicit(path) => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            ConfigLocation::Default(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            ConfigLocation::Default(path) => {
                warn!(
                    "No configuration file at {}, using built-in defaults",
                    path.display()
                );
                Self::default()
            }
            ConfigLocation::None => {
                warn!("Could not determine config directory, using built-in defaults");
                Self::default()
            }
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `TJA_*` environment overrides on top of file values
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(path) = env_value("TJA_DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(url) = env_value("TJA_OLLAMA_URL") {
            self.ollama.base_url = url;
        }
        if let Some(model) = env_value("TJA_OLLAMA_MODEL") {
            self.ollama.model = model;
        }
        if let Some(url) = env_value("TJA_VECTOR_STORE_URL") {
            self.vector_store.base_url = Some(url);
        }
        if let Some(port) = env_value("TJA_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("TJA_PORT is not a valid port: {}", port)))?;
        }
        Ok(())
    }
}

/// Where the configuration file was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// Named on the command line or via `TJA_CONFIG`
    Explicit(PathBuf),
    /// Per-user default location (may not exist)
    Default(PathBuf),
    /// No location could be determined
    None,
}

/// Resolve the configuration file location following the priority order
pub fn resolve_config_path(cli_path: Option<&Path>, module_name: &str) -> ConfigLocation {
    if let Some(path) = cli_path {
        return ConfigLocation::Explicit(path.to_path_buf());
    }

    if let Some(path) = env_value(CONFIG_ENV_VAR) {
        return ConfigLocation::Explicit(PathBuf::from(path));
    }

    match dirs::config_dir() {
        Some(dir) => {
            ConfigLocation::Default(dir.join("trafficjam").join(format!("{}.toml", module_name)))
        }
        None => ConfigLocation::None,
    }
}

/// OS-dependent default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("trafficjam"))
        .unwrap_or_else(|| PathBuf::from("./trafficjam_data"))
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 5780);
        assert_eq!(config.ollama.model, "llama3.2-vision");
        assert_eq!(config.scheduler.warmup_secs, 30);
        assert_eq!(config.scheduler.bootstrap_pacing_secs, 35);
        assert_eq!(config.scheduler.cycle_pacing_secs, 5);
        assert_eq!(config.scheduler.cycle_interval_secs, 60);
        assert_eq!(config.scheduler.placeholder_title, "entry");
        assert!(config.scheduler.field_recovery);
        assert!(config.vector_store.base_url.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            [ollama]
            model = "llava"

            [scheduler]
            cycle_interval_secs = 120
            "#,
        )
        .unwrap();
        assert_eq!(config.ollama.model, "llava");
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
        assert_eq!(config.scheduler.cycle_interval_secs, 120);
        assert_eq!(config.scheduler.cycle_pacing_secs, 5);
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let result = TomlConfig::from_toml_str("[server\nport = ");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn wrong_type_is_config_error() {
        let result = TomlConfig::from_toml_str("[server]\nport = \"high\"");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn cli_path_takes_priority() {
        let location = resolve_config_path(Some(Path::new("/tmp/custom.toml")), "tja-analyzer");
        assert_eq!(
            location,
            ConfigLocation::Explicit(PathBuf::from("/tmp/custom.toml"))
        );
    }
}
