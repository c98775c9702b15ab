// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Unix-socket notice listener.
//!
//! Consumer processes report store changes here; each frame folds into the
//! matching hub broadcast. Frames are 4-byte length-prefixed JSON.

use crate::hub::Hub;
use gf_core::{decode_notice, Notice, MAX_FRAME_LEN};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;

/// Bind the notice socket, clearing any stale socket file first.
pub fn bind(socket_path: &Path) -> std::io::Result<UnixListener> {
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    UnixListener::bind(socket_path)
}

/// Accept loop; runs until `shutdown` is cancelled.
pub async fn run(listener: UnixListener, hub: Hub, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _addr)) => {
                    let hub = hub.clone();
                    tokio::spawn(handle_connection(stream, hub));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "notice socket accept failed");
                }
            }
        }
    }
    tracing::debug!("notice listener stopped");
}

async fn handle_connection(mut stream: UnixStream, hub: Hub) {
    loop {
        let mut len_buf = [0u8; 4];
        if stream.read_exact(&mut len_buf).await.is_err() {
            // EOF: notifier sent its frames and hung up
            return;
        }
        let len = u32::from_be_bytes(len_buf) as usize;
        if len > MAX_FRAME_LEN {
            tracing::warn!(len, "oversized notice frame, closing connection");
            return;
        }
        let mut payload = vec![0u8; len];
        if stream.read_exact(&mut payload).await.is_err() {
            return;
        }
        match decode_notice(&payload) {
            Ok(notice) => dispatch(&hub, notice).await,
            Err(e) => {
                tracing::warn!(error = %e, "undecodable notice frame, closing connection");
                return;
            }
        }
    }
}

async fn dispatch(hub: &Hub, notice: Notice) {
    match notice {
        Notice::JobsChanged { env_name } => {
            // Snapshots are per-env; foreign envs have no subscribers here
            if env_name == hub.env_name() {
                hub.broadcast_snapshot().await;
            } else {
                tracing::debug!(env = %env_name, "ignoring jobs_changed for foreign env");
            }
        }
        Notice::ConsumerStatusChanged => {
            hub.broadcast_consumer_status().await;
        }
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
