//! Configuration for prism-web
//!
//! Every setting has a compiled default, so the server starts with no
//! flags, no environment and no config file.
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (`--model-path`, `--bind`, `--config`)
//! 2. Environment variables (`PRISM_MODEL_PATH`, `PRISM_BIND`, `PRISM_CONFIG`)
//! 3. TOML configuration file
//! 4. Built-in defaults
//!
//! `RUST_LOG` overrides `[logging] level` when set.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

/// Model artifact path used when nothing else is configured
pub const DEFAULT_MODEL_PATH: &str = "./lgbm.txt";

/// Listen address used when nothing else is configured
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid bind address '{0}'")]
    InvalidBind(String),
}

/// Command-line arguments for prism-web
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "prism-web")]
#[command(about = "Web calculator for the prevalence of preserved ratio impaired spirometry")]
#[command(version)]
pub struct Cli {
    /// LightGBM text model to serve
    #[arg(long, env = "PRISM_MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8501
    #[arg(long, env = "PRISM_BIND")]
    pub bind: Option<String>,

    /// TOML configuration file
    #[arg(long, env = "PRISM_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Optional TOML configuration file
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    /// Path to the model artifact (relative or absolute)
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// HTTP listen address
    #[serde(default)]
    pub bind_addr: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Read `path` if it exists.
    ///
    /// `Ok(None)` means there is no file; a file that exists but cannot be
    /// read or parsed is an error.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Where a config file is looked for when none is named:
/// `<config dir>/prism/config.toml` (e.g. `~/.config/prism/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("prism").join("config.toml"))
}

/// Resolved settings
#[derive(Debug, Clone)]
pub struct Config {
    pub model_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Config file searched for, and whether it was found
    pub config_file: Option<(PathBuf, bool)>,
}

impl Config {
    /// Resolve settings from the command line (with its environment
    /// fallbacks), the config file and defaults.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        Self::resolve_from(cli, default_config_path())
    }

    /// Same as [`Config::resolve`] with an explicit default file location.
    pub fn resolve_from(cli: &Cli, default_file: Option<PathBuf>) -> Result<Self, ConfigError> {
        let file_path = cli.config.clone().or(default_file);
        let (toml, config_file) = match file_path {
            Some(path) => {
                let loaded = TomlConfig::load(&path)?;
                let found = loaded.is_some();
                (loaded.unwrap_or_default(), Some((path, found)))
            }
            None => (TomlConfig::default(), None),
        };

        let model_path = cli
            .model_path
            .clone()
            .or(toml.model_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));

        let bind = cli
            .bind
            .clone()
            .or(toml.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBind(bind.clone()))?;

        Ok(Self {
            model_path,
            bind_addr,
            log_level: toml.logging.level,
            config_file,
        })
    }
}
