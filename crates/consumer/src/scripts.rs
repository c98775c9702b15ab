// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Built-in scripts available to `script` jobs.
//!
//! An embedding application would register its own here; the stock binary
//! ships one example.

use gf_core::{Meta, Script, ScriptError, ScriptOutput, ScriptRegistry};
use std::time::Duration;

/// The registry handed to the worker runtime at startup.
pub fn registry() -> ScriptRegistry {
    ScriptRegistry::new().register("example", Example)
}

/// Demo script: requires `input_text` in meta and produces a batch of
/// greeting messages.
struct Example;

impl Script for Example {
    fn validate_input(&self, meta: &Meta) -> bool {
        match meta.get("input_text").and_then(|v| v.as_str()) {
            None | Some("") => {
                tracing::error!("input_text is required");
                false
            }
            Some("fail") => {
                tracing::error!("input_text is 'fail'");
                false
            }
            Some(_) => true,
        }
    }

    fn run(&self, meta: &Meta) -> Result<ScriptOutput, ScriptError> {
        let input = meta.get("input_text").and_then(|v| v.as_str()).unwrap_or_default();
        let mut messages = Vec::new();
        for i in 0..10 {
            messages.push(format!("Hello World {i} ({input})"));
            std::thread::sleep(Duration::from_millis(100));
        }
        Ok(ScriptOutput {
            success: true,
            message: "Example script completed".to_string(),
            data: serde_json::json!({ "messages": messages }),
        })
    }
}
