use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// JSON-RPC over stdin/stdout.
    #[default]
    Stdio,
    /// Streamable HTTP at `/mcp`, plus `/healthz`.
    Http,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Stdio => f.write_str("stdio"),
            Mode::Http => f.write_str("http"),
        }
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Mode::Stdio),
            "http" => Ok(Mode::Http),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid MODE: {0}. Must be 'stdio' or 'http'")]
    InvalidMode(String),
    #[error("PORT cannot be 0")]
    InvalidPort,
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Stdio,
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Defaults, then the TOML file named by `CONFIG_PATH` (if any), then `MODE`/`PORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var("CONFIG_PATH") {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path)?,
            _ => Self::default(),
        };
        base.with_env_overrides()
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(mode) = std::env::var("MODE") {
            self.mode = mode.parse()?;
        }
        // Non-numeric PORT is ignored rather than fatal.
        if let Some(port) = std::env::var("PORT").ok().and_then(|s| s.parse::<u16>().ok()) {
            self.port = port;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mode == Mode::Http && self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        Ok(())
    }
}
