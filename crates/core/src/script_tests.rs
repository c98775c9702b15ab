// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

use super::*;

struct Greeter;

impl Script for Greeter {
    fn validate_input(&self, meta: &Meta) -> bool {
        meta.contains_key("who")
    }

    fn run(&self, meta: &Meta) -> Result<ScriptOutput, ScriptError> {
        let who = meta.get("who").and_then(|v| v.as_str()).unwrap_or("nobody");
        Ok(ScriptOutput {
            success: true,
            message: format!("hello {who}"),
            data: serde_json::Value::Null,
        })
    }
}

#[test]
fn registry_resolves_registered_scripts() {
    let registry = ScriptRegistry::new().register("greeter", Greeter);
    assert!(registry.get("greeter").is_some());
    assert!(registry.get("missing").is_none());
    assert_eq!(registry.len(), 1);
}

#[test]
fn later_registration_wins() {
    struct Second;
    impl Script for Second {
        fn run(&self, _meta: &Meta) -> Result<ScriptOutput, ScriptError> {
            Err(ScriptError::Failed("second".into()))
        }
    }

    let registry = ScriptRegistry::new().register("s", Greeter).register("s", Second);
    let script = registry.get("s").unwrap();
    assert!(script.run(&Meta::new()).is_err());
}

#[test]
fn validate_then_run() {
    let registry = ScriptRegistry::new().register("greeter", Greeter);
    let script = registry.get("greeter").unwrap();

    let empty = Meta::new();
    assert!(!script.validate_input(&empty));

    let mut meta = Meta::new();
    meta.insert("who".into(), serde_json::Value::String("world".into()));
    assert!(script.validate_input(&meta));
    let out = script.run(&meta).unwrap();
    assert!(out.success);
    assert_eq!(out.message, "hello world");
}
