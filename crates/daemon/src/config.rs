// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Daemon configuration, loaded from `gaffer.toml`.

use gf_core::{default_queues, paths, QueueConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Daemon settings. Every field has a default so an absent config file
/// yields a working single-host setup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Tag grouping jobs by deployment environment.
    pub env_name: String,
    /// Root of all durable state (databases, logs, pid files, socket).
    pub data_dir: PathBuf,
    /// Start any not-running consumers at daemon boot.
    pub start_consumers_on_start: bool,
    /// The named queues; one consumer process per entry.
    pub queues: Vec<QueueConfig>,
    /// Consumer binary override; defaults to `gf-consumer` next to `gfd`.
    pub consumer_binary: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env_name: "dev".to_string(),
            data_dir: PathBuf::from("data"),
            start_consumers_on_start: false,
            queues: default_queues(),
            consumer_binary: None,
        }
    }
}

impl Config {
    /// Load from a toml file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read { path: path.to_path_buf(), source: e })?;
        toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse { path: path.to_path_buf(), source: e })
    }

    pub fn queue(&self, name: &str) -> Option<&QueueConfig> {
        self.queues.iter().find(|q| q.name == name)
    }

    pub fn store_db_path(&self) -> PathBuf {
        paths::store_db_path(&self.data_dir)
    }

    pub fn socket_path(&self) -> PathBuf {
        paths::socket_path(&self.data_dir)
    }

    pub fn lock_path(&self) -> PathBuf {
        paths::daemon_lock_path(&self.data_dir)
    }

    pub fn log_dir(&self) -> PathBuf {
        paths::log_dir(&self.data_dir)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
