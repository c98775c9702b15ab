// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Store-change notices and their wire framing.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload. Consumers
//! send notices to the daemon socket; inside the daemon the broadcast hub is
//! wired up as a [`NoticeSink`] directly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Frames larger than this are rejected rather than buffered.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// A fire-and-forget signal that observable state changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    /// The job table changed for an env; subscribers want a fresh snapshot.
    JobsChanged { env_name: String },
    /// A consumer started or stopped.
    ConsumerStatusChanged,
}

/// Framing/parse errors for the notice wire format.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame too large: {0} bytes")]
    TooLarge(usize),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a notice as a length-prefixed frame.
pub fn encode_notice(notice: &Notice) -> Result<Vec<u8>, FrameError> {
    let payload = serde_json::to_vec(notice)?;
    if payload.len() > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge(payload.len()));
    }
    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decode a frame payload (without the length prefix).
pub fn decode_notice(payload: &[u8]) -> Result<Notice, FrameError> {
    if payload.len() > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge(payload.len()));
    }
    Ok(serde_json::from_slice(payload)?)
}

/// Receiver of store-change notices.
///
/// Delivery is best-effort: implementations must never fail the mutation
/// that produced the notice.
pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Sink that drops every notice. Used by tests and by stores that are not
/// wired to a hub.
pub struct NullSink;

impl NoticeSink for NullSink {
    fn notify(&self, _notice: Notice) {}
}

#[cfg(test)]
#[path = "notice_tests.rs"]
mod tests;
