// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! In-process script registry for `script` jobs.
//!
//! The embedding application registers scripts at startup; the registry is
//! immutable once handed to a worker runtime.

use crate::job::Meta;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Structured result a script returns; appended to the job log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptOutput {
    pub success: bool,
    pub message: String,
    pub data: serde_json::Value,
}

/// Errors raised by script execution.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script input validation failed")]
    InvalidInput,
    #[error("{0}")]
    Failed(String),
}

/// An executable unit invokable by name from a `script` job.
///
/// The runtime calls `validate_input` with the job's `meta` (plus the
/// injected `job_id`) before `run`; returning false fails the job.
pub trait Script: Send + Sync {
    fn validate_input(&self, _meta: &Meta) -> bool {
        true
    }

    fn run(&self, meta: &Meta) -> Result<ScriptOutput, ScriptError>;
}

/// Process-wide mapping of script names to implementations.
#[derive(Default)]
pub struct ScriptRegistry {
    scripts: HashMap<String, Arc<dyn Script>>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chainable registration; later registrations of the same name win.
    pub fn register(mut self, name: impl Into<String>, script: impl Script + 'static) -> Self {
        self.scripts.insert(name.into(), Arc::new(script));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Script>> {
        self.scripts.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.scripts.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
