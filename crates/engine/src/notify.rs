// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Fire-and-forget notice client for the daemon's Unix socket.
//!
//! Consumers mutate the shared store and the daemon's broadcast hub has to
//! hear about it; this sink carries that signal across the process boundary.
//! A missing or unresponsive daemon only costs a debug line: broadcast
//! failures never propagate to the mutation that caused them.

use gf_core::{encode_notice, Notice, NoticeSink};
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::time::Duration;

const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// [`NoticeSink`] that sends each notice as one framed message to the
/// daemon socket.
pub struct SocketSink {
    socket_path: PathBuf,
}

impl SocketSink {
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }
}

impl NoticeSink for SocketSink {
    fn notify(&self, notice: Notice) {
        let frame = match encode_notice(&notice) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode notice");
                return;
            }
        };
        match UnixStream::connect(&self.socket_path) {
            Ok(mut stream) => {
                let _ = stream.set_write_timeout(Some(WRITE_TIMEOUT));
                if let Err(e) = stream.write_all(&frame) {
                    tracing::debug!(error = %e, "notice write failed");
                }
            }
            Err(e) => {
                tracing::debug!(
                    socket = %self.socket_path.display(),
                    error = %e,
                    "daemon socket not reachable, dropping notice"
                );
            }
        }
    }
}
