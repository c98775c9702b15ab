// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Per-execution job log files.
//!
//! One file per execution, named `job_{id}_retry_{n}.txt`, owned by the
//! worker that claimed the job. Tailers open read-only. Writes are
//! line-buffered so log-tail subscribers see output as it happens.

use gf_core::{paths, JobId};
use parking_lot::Mutex;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Line-buffered writer for one job execution's log.
///
/// Cloneable so the stdout and stderr pumps can interleave lines into the
/// same file.
#[derive(Clone)]
pub struct JobLog {
    file: Arc<Mutex<File>>,
    path: PathBuf,
}

impl JobLog {
    /// Create (truncating) the log file for this execution.
    pub fn create(data_dir: &Path, id: &JobId, retry_count: u32) -> std::io::Result<Self> {
        let path = paths::job_log_path(data_dir, id, retry_count);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;
        Ok(Self { file: Arc::new(Mutex::new(file)), path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one line and flush. Write failures must not break the job, so
    /// they are logged and swallowed.
    pub fn line(&self, line: &str) {
        let mut file = self.file.lock();
        let result = writeln!(file, "{line}").and_then(|()| file.flush());
        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write job log");
        }
    }

    /// Write a multi-line block, flushing once at the end.
    pub fn block(&self, content: &str) {
        let mut file = self.file.lock();
        let result = (|| {
            for line in content.lines() {
                writeln!(file, "{line}")?;
            }
            file.flush()
        })();
        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write job log");
        }
    }
}

#[cfg(test)]
#[path = "job_log_tests.rs"]
mod tests;
