// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Daemon lifecycle: startup, shutdown.

use crate::config::Config;
use crate::hub::{Hub, HubSink};
use crate::listener;
use crate::supervisor::Supervisor;
use chrono::Utc;
use fs2::FileExt;
use gf_core::NullSink;
use gf_engine::run_on_start_schedulers;
use gf_storage::{Database, JobStore, SchedulerStore};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("failed to bind socket at {path}: {source}")]
    BindFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage error: {0}")]
    Storage(#[from] gf_storage::StorageError),

    #[error("engine error: {0}")]
    Engine(#[from] gf_engine::EngineError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The running daemon.
pub struct Daemon {
    pub config: Config,
    pub hub: Hub,
    pub supervisor: Arc<Supervisor>,
    /// Mutating store view; writes broadcast through the hub.
    pub jobs: JobStore,
    pub schedulers: SchedulerStore,
    // NOTE(lifetime): held to maintain the exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    listener_shutdown: CancellationToken,
}

/// Boot the daemon: lock, open stores, wire the hub and listener, fire
/// on-start schedulers, and honor `start_consumers_on_start`.
pub async fn startup(config: Config, config_path: Option<PathBuf>) -> Result<Daemon, LifecycleError> {
    std::fs::create_dir_all(&config.data_dir)?;
    std::fs::create_dir_all(config.log_dir())?;

    // Acquire the lock before touching any shared state. Open without
    // truncating so a failed acquisition leaves the running daemon's pid
    // intact.
    let mut lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(config.lock_path())?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    let db = Database::open(&config.store_db_path())?;
    let supervisor = Arc::new(Supervisor::new(config.clone(), config_path));

    // The hub reads with a plain store view; the mutating view broadcasts
    // back through the hub.
    let hub = Hub::new(
        db.jobs(Arc::new(NullSink)),
        Arc::clone(&supervisor),
        config.env_name.clone(),
        config.data_dir.clone(),
    );
    let jobs = db.jobs(Arc::new(HubSink::new(hub.clone())));
    let schedulers = db.schedulers();

    let socket_path = config.socket_path();
    let notice_listener = listener::bind(&socket_path)
        .map_err(|e| LifecycleError::BindFailed { path: socket_path, source: e })?;
    let listener_shutdown = CancellationToken::new();
    tokio::spawn(listener::run(notice_listener, hub.clone(), listener_shutdown.clone()));

    let fired = run_on_start_schedulers(&jobs, &schedulers, &config.env_name, Utc::now())?;
    if fired > 0 {
        info!(fired, "fired on_start schedulers");
    }

    let boot_results = supervisor.start_on_boot();
    for result in &boot_results {
        if result.success {
            info!(queue = %result.queue, "{}", result.message);
        } else {
            warn!(queue = %result.queue, "{}", result.message);
        }
    }
    if !boot_results.is_empty() {
        hub.broadcast_consumer_status().await;
    }

    info!(env = %config.env_name, data_dir = %config.data_dir.display(), "daemon ready");
    Ok(Daemon { config, hub, supervisor, jobs, schedulers, lock_file, listener_shutdown })
}

impl Daemon {
    /// Start one queue's consumer (or all), then push the new status map to
    /// subscribers.
    pub async fn start_consumers(
        &self,
        queue_name: Option<&str>,
    ) -> Result<Vec<crate::supervisor::QueueActionResult>, crate::supervisor::SupervisorError>
    {
        let results = self.supervisor.start(queue_name)?;
        self.hub.broadcast_consumer_status().await;
        Ok(results)
    }

    /// Stop one queue's consumer (or all), then push the new status map to
    /// subscribers.
    pub async fn stop_consumers(
        &self,
        queue_name: Option<&str>,
    ) -> Result<Vec<crate::supervisor::QueueActionResult>, crate::supervisor::SupervisorError>
    {
        let results = self.supervisor.stop(queue_name).await?;
        self.hub.broadcast_consumer_status().await;
        Ok(results)
    }

    /// Graceful shutdown. Consumers are deliberately left running; they
    /// reconnect their notices when the daemon comes back.
    pub fn shutdown(&mut self) {
        info!("shutting down daemon");
        self.listener_shutdown.cancel();

        let socket_path = self.config.socket_path();
        if socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&socket_path) {
                warn!(error = %e, "failed to remove socket file");
            }
        }
        let lock_path = self.config.lock_path();
        if lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&lock_path) {
                warn!(error = %e, "failed to remove pid file");
            }
        }
        info!("daemon shutdown complete");
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
