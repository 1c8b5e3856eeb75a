//! Configuration for the data-access layer
//!
//! Handles loading `bindery.toml`. Every section is optional and falls back to the
//! defaults below.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dialect::Dialect;
use crate::pagination::PaginationSettings;

pub const CONFIG_FILE: &str = "bindery.toml";

// ============================================================================
// Sections
// ============================================================================

/// Result cache for batched relation reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_seconds: u64,
    pub max_entries: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 300,
            max_entries: 10_000,
        }
    }
}

impl CacheSettings {
    #[inline]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// When a batch loader flushes its pending keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// The first awaited load yields once to the scheduler, then flushes.
    #[default]
    Auto,
    /// Nothing runs until the orchestrating layer calls `flush()`.
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    pub dispatch: DispatchMode,
}

/// Connection details, consumed by whatever bootstraps the executor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub dialect: Dialect,
    pub url: Option<String>,
}

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pagination: PaginationSettings,
    pub cache: CacheSettings,
    pub loader: LoaderSettings,
    pub database: DatabaseSettings,
}

impl Config {
    /// Load from default config file
    pub fn load() -> Result<Self, Error> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load from specific path
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(path.into())
            } else {
                Error::Io(path.into(), e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| Error::Parse(path.into(), e))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let pagination = &self.pagination;
        if pagination.default_items_per_request > pagination.max_items_per_request {
            return Err(Error::Invalid(format!(
                "pagination.default_items_per_request ({}) exceeds max_items_per_request ({})",
                pagination.default_items_per_request, pagination.max_items_per_request
            )));
        }
        if self.cache.enabled && self.cache.ttl_seconds == 0 {
            return Err(Error::Invalid("cache.ttl_seconds must be positive".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse {}: {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigError = Error;

// ============================================================================
// Tests
// ============================================================================
