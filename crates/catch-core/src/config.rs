//! Configuration system for catch.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $CATCH_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/catch/config.toml
//!   3. ~/.config/catch/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default HTTP listen port.
pub const DEFAULT_PORT: u16 = 5000;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchConfig {
    pub server: ServerConfig,
    pub output: OutputConfig,
    pub accumulator: AccumulatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the upload endpoint binds to.
    pub bind: String,
    pub port: u16,
    /// Largest accepted request body for a single chunk.
    pub max_chunk_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory holding the output file. Created at startup if absent.
    pub dir: PathBuf,
    /// Output file name inside `dir`. Overwritten on every flush.
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccumulatorConfig {
    /// Seconds without a new chunk before buffered chunks are flushed.
    pub inactivity_timeout_secs: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            max_chunk_bytes: 64 * 1024 * 1024, // 64 MB
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output_dir"),
            file_name: "output_file.bin".to_string(),
        }
    }
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout_secs: 10,
        }
    }
}

impl OutputConfig {
    /// Full path of the output file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

impl AccumulatorConfig {
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_secs)
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("catch")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl CatchConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_file(&Self::file_path())?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a config file, falling back to defaults when it does not exist.
    pub fn load_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(CatchConfig::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("CATCH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&CatchConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply CATCH_* overrides. `lookup` resolves a variable name to its value.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("CATCH_SERVER__BIND") {
            self.server.bind = v;
        }
        if let Some(v) = lookup("CATCH_SERVER__PORT") {
            match v.parse() {
                Ok(p) => self.server.port = p,
                Err(_) => tracing::warn!(value = %v, "ignoring invalid CATCH_SERVER__PORT"),
            }
        }
        if let Some(v) = lookup("CATCH_SERVER__MAX_CHUNK_BYTES") {
            match v.parse() {
                Ok(n) => self.server.max_chunk_bytes = n,
                Err(_) => {
                    tracing::warn!(value = %v, "ignoring invalid CATCH_SERVER__MAX_CHUNK_BYTES")
                }
            }
        }
        if let Some(v) = lookup("CATCH_OUTPUT__DIR") {
            self.output.dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("CATCH_OUTPUT__FILE_NAME") {
            self.output.file_name = v;
        }
        if let Some(v) = lookup("CATCH_ACCUMULATOR__INACTIVITY_TIMEOUT_SECS") {
            match v.parse() {
                Ok(secs) => self.accumulator.inactivity_timeout_secs = secs,
                Err(_) => tracing::warn!(
                    value = %v,
                    "ignoring invalid CATCH_ACCUMULATOR__INACTIVITY_TIMEOUT_SECS"
                ),
            }
        }
    }
}
