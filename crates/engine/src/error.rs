// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Engine error types and failure classification.

use thiserror::Error;

/// Errors from job execution and engine maintenance.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] gf_storage::StorageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("command exited with code {code}")]
    CommandExit { code: i32 },

    #[error("command terminated by signal {signal}")]
    CommandSignal { signal: i32 },

    #[error("unknown script: {0}")]
    UnknownScript(String),

    #[error("script input validation failed: {0}")]
    ScriptValidation(String),

    #[error("script failed: {0}")]
    Script(String),

    #[error("invalid job template for scheduler {name}: {source}")]
    InvalidTemplate {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl EngineError {
    /// Transport-level failures (timeouts, unreachable hosts) classify the
    /// job as `error`; everything else is an execution failure (`failed`).
    pub fn is_transport(&self) -> bool {
        match self {
            EngineError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
