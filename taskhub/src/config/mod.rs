//! Client configuration.
//!
//! Layered resolution with the following priority (highest first):
//! 1. TOML config file (`~/.config/taskhub/config.toml`)
//! 2. Compiled defaults
//!
//! A missing default config file is not an error (defaults are used). An
//! explicit path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use taskhub_api::query::DEFAULT_PAGE_LIMIT;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    server: ServerFileConfig,
    client: ClientFileConfig,
}

/// `[server]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerFileConfig {
    base_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// `[client]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ClientFileConfig {
    page_size: Option<u32>,
    credentials_path: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, including the path prefix.
    pub base_url: String,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
    /// Page size for task list fetches.
    pub page_size: u32,
    /// Explicit credential file location; `None` means the platform
    /// default (`<config_dir>/taskhub/session.toml`).
    pub credentials_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            request_timeout: Duration::from_secs(10),
            page_size: DEFAULT_PAGE_LIMIT,
            credentials_path: None,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from a TOML file merged over defaults.
    ///
    /// With `explicit_path` the file must exist; without it the default
    /// path is tried and silently skipped when missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let file = load_config_file(explicit_path)?;
        Ok(Self::resolve(&file))
    }

    /// Resolves a `ClientConfig` from a parsed config file.
    /// Priority: file > default. Separated from `load()` to enable unit
    /// testing without touching the filesystem.
    #[must_use]
    fn resolve(file: &ConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            base_url: file
                .server
                .base_url
                .clone()
                .unwrap_or(defaults.base_url),
            request_timeout: file
                .server
                .request_timeout_secs
                .map_or(defaults.request_timeout, Duration::from_secs),
            page_size: file
                .client
                .page_size
                .unwrap_or(defaults.page_size)
                .max(1),
            credentials_path: file.client.credentials_path.clone().map(PathBuf::from),
        }
    }
}

/// Loads and parses a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and a missing
/// file is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            // No config dir available — use defaults.
            return Ok(ConfigFile::default());
        };
        config_dir.join("taskhub").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
