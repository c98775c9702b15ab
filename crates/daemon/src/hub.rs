// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Broadcast hub: the set of live push subscribers and the fan-out of job
//! snapshots, consumer status, and log tails.
//!
//! Subscribers are bounded in-process frame channels; a WebSocket layer
//! attaches one per connection. Delivery is best-effort: a full or closed
//! channel detaches the subscriber, and no broadcast failure ever reaches
//! the mutation that triggered it.

use crate::supervisor::Supervisor;
use gf_core::{paths, JobId, Notice, NoticeSink, QueueConfig};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Frames are plain JSON values; the transport layer owns any envelope.
pub type Frame = serde_json::Value;

/// Per-subscriber buffer. A subscriber that falls this far behind is
/// dropped rather than buffered without bound.
const SUBSCRIBER_BUFFER: usize = 32;

/// Poll cadence for log tails.
const TAIL_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Handle identifying one attached subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// What a log-tail subscription follows: a job's execution log or a
/// consumer's process log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailTopic {
    Job(JobId),
    Consumer(String),
}

impl TailTopic {
    fn label(&self) -> String {
        match self {
            TailTopic::Job(id) => id.to_string(),
            TailTopic::Consumer(name) => name.clone(),
        }
    }

    fn path(&self, data_dir: &Path) -> PathBuf {
        match self {
            // Log tails always follow the first attempt
            TailTopic::Job(id) => paths::job_log_path(data_dir, id, 0),
            TailTopic::Consumer(name) => QueueConfig::new(name.clone()).log_path(data_dir),
        }
    }
}

struct TailTask {
    token: CancellationToken,
}

impl Drop for TailTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

struct Subscriber {
    tx: mpsc::Sender<Frame>,
    tail: Option<TailTask>,
}

struct HubInner {
    jobs: gf_storage::JobStore,
    supervisor: Arc<Supervisor>,
    env_name: String,
    data_dir: PathBuf,
    subscribers: Mutex<HashMap<u64, Subscriber>>,
    next_id: AtomicU64,
}

/// Process-wide registry of push subscribers.
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

impl Hub {
    pub fn new(
        jobs: gf_storage::JobStore,
        supervisor: Arc<Supervisor>,
        env_name: String,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            inner: Arc::new(HubInner {
                jobs,
                supervisor,
                env_name,
                data_dir,
                subscribers: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn env_name(&self) -> &str {
        &self.inner.env_name
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    /// Register a subscriber. The first frame on the channel is the connect
    /// handshake: the current job snapshot plus the consumer status map.
    pub async fn attach(&self) -> (SubscriberId, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        let handshake = serde_json::json!({
            "jobs": self.jobs_snapshot().await,
            "consumer_status": self.status_snapshot().await,
        });
        // Fresh channel, cannot be full
        let _ = tx.try_send(handshake);

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers.lock().insert(id, Subscriber { tx, tail: None });
        tracing::debug!(subscriber = id, "subscriber attached");
        (SubscriberId(id), rx)
    }

    /// Remove a subscriber; any active log tail is cancelled with it.
    pub fn detach(&self, id: SubscriberId) {
        if self.inner.subscribers.lock().remove(&id.0).is_some() {
            tracing::debug!(subscriber = id.0, "subscriber detached");
        }
    }

    /// Push `{jobs: [...]}` to every subscriber.
    pub async fn broadcast_snapshot(&self) {
        let frame = serde_json::json!({ "jobs": self.jobs_snapshot().await });
        self.send_to_all(frame);
    }

    /// Push `{consumer_status: {queue: "running"|"stopped"}}` to everyone.
    pub async fn broadcast_consumer_status(&self) {
        let frame = serde_json::json!({ "consumer_status": self.status_snapshot().await });
        self.send_to_all(frame);
    }

    /// Start tailing a log for one subscriber, replacing any prior tail.
    ///
    /// The tail polls every 500 ms and sends incremental `log_update`
    /// frames, starting from the beginning of the file so the subscriber
    /// first sees existing content. Read failures send one `log_error`
    /// frame and end the tail; the subscriber itself stays attached.
    pub fn subscribe_log(&self, id: SubscriberId, topic: TailTopic) {
        let mut subscribers = self.inner.subscribers.lock();
        let Some(subscriber) = subscribers.get_mut(&id.0) else {
            tracing::warn!(subscriber = id.0, "log subscription for unknown subscriber");
            return;
        };

        let token = CancellationToken::new();
        let path = topic.path(&self.inner.data_dir);
        let label = topic.label();
        tracing::debug!(subscriber = id.0, topic = %label, "log tail started");
        tokio::spawn(tail_log(path, label, subscriber.tx.clone(), token.clone()));
        // Dropping the previous TailTask cancels its loop
        subscriber.tail = Some(TailTask { token });
    }

    fn send_to_all(&self, frame: Frame) {
        let mut dropped = Vec::new();
        {
            let subscribers = self.inner.subscribers.lock();
            for (id, subscriber) in subscribers.iter() {
                if subscriber.tx.try_send(frame.clone()).is_err() {
                    dropped.push(*id);
                }
            }
        }
        for id in dropped {
            tracing::warn!(subscriber = id, "subscriber not keeping up, detaching");
            self.inner.subscribers.lock().remove(&id);
        }
    }

    async fn jobs_snapshot(&self) -> Frame {
        let jobs = self.inner.jobs.clone();
        let env_name = self.inner.env_name.clone();
        let listed = tokio::task::spawn_blocking(move || jobs.list(&env_name, None, false)).await;
        match listed {
            Ok(Ok(jobs)) => serde_json::to_value(jobs).unwrap_or_else(|_| serde_json::json!([])),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "failed to read jobs for snapshot");
                serde_json::json!([])
            }
            Err(e) => {
                tracing::error!(error = %e, "snapshot read task aborted");
                serde_json::json!([])
            }
        }
    }

    async fn status_snapshot(&self) -> Frame {
        let supervisor = Arc::clone(&self.inner.supervisor);
        match tokio::task::spawn_blocking(move || supervisor.status_map()).await {
            Ok(map) => serde_json::to_value(map).unwrap_or_else(|_| serde_json::json!({})),
            Err(e) => {
                tracing::error!(error = %e, "status read task aborted");
                serde_json::json!({})
            }
        }
    }
}

/// [`NoticeSink`] wiring store mutations in the daemon process straight to
/// hub broadcasts.
pub struct HubSink {
    hub: Hub,
    handle: Option<tokio::runtime::Handle>,
}

impl HubSink {
    pub fn new(hub: Hub) -> Self {
        Self { hub, handle: tokio::runtime::Handle::try_current().ok() }
    }
}

impl NoticeSink for HubSink {
    fn notify(&self, notice: Notice) {
        let Some(handle) = &self.handle else {
            tracing::warn!("no runtime handle, dropping notice");
            return;
        };
        let hub = self.hub.clone();
        match notice {
            Notice::JobsChanged { .. } => {
                handle.spawn(async move { hub.broadcast_snapshot().await });
            }
            Notice::ConsumerStatusChanged => {
                handle.spawn(async move { hub.broadcast_consumer_status().await });
            }
        }
    }
}

async fn tail_log(path: PathBuf, topic: String, tx: mpsc::Sender<Frame>, token: CancellationToken) {
    let mut pos: u64 = 0;
    loop {
        if token.is_cancelled() {
            return;
        }
        match read_new(&path, pos).await {
            Ok(Some((content, new_pos))) => {
                pos = new_pos;
                let frame = serde_json::json!({
                    "type": "log_update",
                    "topic": topic,
                    "content": content,
                });
                if tx.send(frame).await.is_err() {
                    return;
                }
            }
            // Nothing new, or the file does not exist yet: keep polling
            Ok(None) => {}
            Err(e) => {
                let frame = serde_json::json!({
                    "type": "log_error",
                    "topic": topic,
                    "error": e.to_string(),
                });
                let _ = tx.send(frame).await;
                return;
            }
        }
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(TAIL_POLL_INTERVAL) => {}
        }
    }
}

async fn read_new(path: &Path, pos: u64) -> std::io::Result<Option<(String, u64)>> {
    let mut file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    file.seek(SeekFrom::Start(pos)).await?;
    let mut content = String::new();
    let read = file.read_to_string(&mut content).await?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some((content, pos + read as u64)))
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
