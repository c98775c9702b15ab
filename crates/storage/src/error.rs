// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Storage error types.

use gf_core::{JobId, JobStatus};
use thiserror::Error;

/// Errors from the relational store and the durable task queues.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    /// A conditional claim found the job in a state other than `queued`.
    #[error("stale transition for job {id}: expected queued, found {actual}")]
    StaleTransition { id: JobId, actual: JobStatus },

    #[error("illegal status transition {from} -> {to}")]
    IllegalTransition { from: JobStatus, to: JobStatus },

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl StorageError {
    pub fn job_not_found(id: &JobId) -> Self {
        StorageError::NotFound { what: "job", id: id.to_string() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }

    pub fn is_stale_transition(&self) -> bool {
        matches!(self, StorageError::StaleTransition { .. })
    }
}
