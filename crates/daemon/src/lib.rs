// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gf-daemon: the server process.
//!
//! Hosts the stores, the broadcast hub, the consumer supervisor, and the
//! notice listener. The HTTP/WebSocket surface of an embedding application
//! sits on top of these; nothing here speaks HTTP.

pub mod config;
pub mod hub;
pub mod lifecycle;
pub mod listener;
pub mod supervisor;

pub use config::{Config, ConfigError};
pub use hub::{Hub, HubSink, TailTopic};
pub use lifecycle::{startup, Daemon, LifecycleError};
pub use supervisor::{QueueActionResult, Supervisor, SupervisorError};
