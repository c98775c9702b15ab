// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Consumer supervisor: one out-of-process worker per named queue.
//!
//! Liveness truth is the pid file plus a signal-0 probe. Consumers are
//! spawned into their own process group so stop can take down the whole
//! tree with one killpg instead of pattern-matching process names.

use crate::config::Config;
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use serde::Serialize;
use std::collections::BTreeMap;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use thiserror::Error;

/// How long stop waits for a consumer to honor SIGTERM before escalating.
const STOP_GRACE: Duration = Duration::from_secs(2);

/// Supervisor errors. Per-queue start/stop failures are reported in the
/// result objects, not raised; only addressing a queue that does not exist
/// is an error.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("unknown queue: {0}")]
    UnknownQueue(String),
}

/// Per-queue result of a start/stop request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueActionResult {
    pub queue: String,
    pub success: bool,
    pub message: String,
}

/// Starts, stops, and inspects the consumer processes.
pub struct Supervisor {
    config: Config,
    /// Config file to hand to spawned consumers, when one was loaded.
    config_path: Option<PathBuf>,
}

impl Supervisor {
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Self {
        Self { config, config_path }
    }

    /// A consumer is running iff its pid file exists and the pid answers
    /// signal 0. A pid file whose process is gone is stale and removed.
    pub fn is_running(&self, queue_name: &str) -> bool {
        let Some(queue) = self.config.queue(queue_name) else {
            return false;
        };
        let pid_path = queue.pid_path(&self.config.data_dir);
        match read_pid(&pid_path) {
            Some(pid) if process_alive(pid) => true,
            Some(pid) => {
                tracing::warn!(
                    queue = queue_name,
                    pid,
                    "pid file exists but process does not, removing"
                );
                let _ = std::fs::remove_file(&pid_path);
                false
            }
            None => false,
        }
    }

    /// Start one queue's consumer, or all of them.
    pub fn start(
        &self,
        queue_name: Option<&str>,
    ) -> Result<Vec<QueueActionResult>, SupervisorError> {
        Ok(self.select(queue_name)?.into_iter().map(|q| self.start_one(&q)).collect())
    }

    /// Stop one queue's consumer, or all of them.
    pub async fn stop(
        &self,
        queue_name: Option<&str>,
    ) -> Result<Vec<QueueActionResult>, SupervisorError> {
        let mut results = Vec::new();
        for queue in self.select(queue_name)? {
            results.push(self.stop_one(&queue.name).await);
        }
        Ok(results)
    }

    /// `"running"` or `"stopped"` for every configured queue.
    pub fn status_map(&self) -> BTreeMap<String, String> {
        self.config
            .queues
            .iter()
            .map(|q| {
                let status = if self.is_running(&q.name) { "running" } else { "stopped" };
                (q.name.clone(), status.to_string())
            })
            .collect()
    }

    /// Honor `start_consumers_on_start`: start anything not running.
    pub fn start_on_boot(&self) -> Vec<QueueActionResult> {
        if !self.config.start_consumers_on_start {
            return Vec::new();
        }
        self.config
            .queues
            .iter()
            .filter(|q| !self.is_running(&q.name))
            .map(|q| self.start_one(q))
            .collect()
    }

    fn select(
        &self,
        queue_name: Option<&str>,
    ) -> Result<Vec<gf_core::QueueConfig>, SupervisorError> {
        match queue_name {
            None => Ok(self.config.queues.clone()),
            Some(name) => match self.config.queue(name) {
                Some(q) => Ok(vec![q.clone()]),
                None => Err(SupervisorError::UnknownQueue(name.to_string())),
            },
        }
    }

    fn start_one(&self, queue: &gf_core::QueueConfig) -> QueueActionResult {
        let name = queue.name.clone();
        if self.is_running(&name) {
            return QueueActionResult {
                queue: name.clone(),
                success: false,
                message: format!("{name} consumer already running"),
            };
        }

        let log_path = queue.log_path(&self.config.data_dir);
        let pid_path = queue.pid_path(&self.config.data_dir);
        let spawned = (|| -> std::io::Result<u32> {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let log = std::fs::OpenOptions::new().create(true).append(true).open(&log_path)?;

            let mut cmd = Command::new(self.consumer_binary());
            cmd.arg("--queue")
                .arg(&name)
                .stdin(Stdio::null())
                .stdout(log.try_clone()?)
                .stderr(log)
                // Own process group so stop can killpg the whole tree
                .process_group(0);
            if let Some(config_path) = &self.config_path {
                cmd.arg("--config").arg(config_path);
            }

            let child = cmd.spawn()?;
            let pid = child.id();
            std::fs::write(&pid_path, format!("{pid}\n"))?;
            Ok(pid)
        })();

        match spawned {
            Ok(pid) => {
                tracing::info!(queue = %name, pid, "consumer started");
                QueueActionResult {
                    queue: name.clone(),
                    success: true,
                    message: format!("{name} consumer started with pid {pid}"),
                }
            }
            Err(e) => {
                tracing::error!(queue = %name, error = %e, "failed to start consumer");
                QueueActionResult {
                    queue: name.clone(),
                    success: false,
                    message: format!("failed to start {name} consumer: {e}"),
                }
            }
        }
    }

    async fn stop_one(&self, queue_name: &str) -> QueueActionResult {
        let Some(queue) = self.config.queue(queue_name) else {
            return QueueActionResult {
                queue: queue_name.to_string(),
                success: false,
                message: format!("unknown queue {queue_name}"),
            };
        };
        let pid_path = queue.pid_path(&self.config.data_dir);
        let Some(pid) = read_pid(&pid_path) else {
            return QueueActionResult {
                queue: queue_name.to_string(),
                success: false,
                message: format!("{queue_name} consumer is not running"),
            };
        };

        // pid == pgid: the consumer was spawned with process_group(0)
        let group = Pid::from_raw(pid);
        match signal::killpg(group, Signal::SIGTERM) {
            Ok(()) => {}
            Err(Errno::ESRCH) => {
                let _ = std::fs::remove_file(&pid_path);
                return QueueActionResult {
                    queue: queue_name.to_string(),
                    success: true,
                    message: format!("{queue_name} consumer with pid {pid} not found"),
                };
            }
            Err(e) => {
                return QueueActionResult {
                    queue: queue_name.to_string(),
                    success: false,
                    message: format!("failed to stop {queue_name} consumer: {e}"),
                };
            }
        }

        // Grace period, then SIGKILL any stragglers in the group
        let deadline = tokio::time::Instant::now() + STOP_GRACE;
        while process_alive(pid) && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        if process_alive(pid) {
            tracing::warn!(queue = queue_name, pid, "consumer ignored SIGTERM, sending SIGKILL");
            let _ = signal::killpg(group, Signal::SIGKILL);
        }

        let _ = std::fs::remove_file(&pid_path);
        tracing::info!(queue = queue_name, pid, "consumer stopped");
        QueueActionResult {
            queue: queue_name.to_string(),
            success: true,
            message: format!("{queue_name} consumer with pid {pid} stopped"),
        }
    }

    fn consumer_binary(&self) -> PathBuf {
        if let Some(binary) = &self.config.consumer_binary {
            return binary.clone();
        }
        // gf-consumer ships next to gfd
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("gf-consumer")))
            .unwrap_or_else(|| PathBuf::from("gf-consumer"))
    }
}

fn read_pid(path: &Path) -> Option<i32> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// Signal-0 probe; EPERM still means the process exists.
fn process_alive(pid: i32) -> bool {
    match signal::kill(Pid::from_raw(pid), None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
