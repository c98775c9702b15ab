// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

use super::*;
use tempfile::TempDir;

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load(&dir.path().join("gaffer.toml")).unwrap();
    assert_eq!(config.env_name, "dev");
    assert_eq!(config.data_dir, PathBuf::from("data"));
    assert!(!config.start_consumers_on_start);
    let names: Vec<&str> = config.queues.iter().map(|q| q.name.as_str()).collect();
    assert_eq!(names, vec!["default", "reserved"]);
}

#[test]
fn parses_full_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gaffer.toml");
    std::fs::write(
        &path,
        r#"
env_name = "prod"
data_dir = "/var/lib/gaffer"
start_consumers_on_start = true

[[queues]]
name = "default"

[[queues]]
name = "reserved"

[[queues]]
name = "bulk"
"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.env_name, "prod");
    assert!(config.start_consumers_on_start);
    assert_eq!(config.queues.len(), 3);
    assert!(config.queue("bulk").is_some());
    assert!(config.queue("nope").is_none());
    assert_eq!(config.store_db_path(), PathBuf::from("/var/lib/gaffer/gaffer.sqlite3"));
    assert_eq!(config.socket_path(), PathBuf::from("/var/lib/gaffer/gfd.sock"));
}

#[test]
fn unknown_keys_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gaffer.toml");
    std::fs::write(&path, "envname = \"typo\"\n").unwrap();
    assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
}
