// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

use super::*;
use crate::config::Config;
use crate::supervisor::Supervisor;
use gf_core::{NoticeSink, NullSink};
use gf_engine::SocketSink;
use gf_storage::Database;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

async fn recv(rx: &mut tokio::sync::mpsc::Receiver<crate::hub::Frame>) -> crate::hub::Frame {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for frame")
        .expect("channel closed")
}

#[tokio::test]
async fn consumer_notice_reaches_hub_subscribers() {
    let dir = TempDir::new().unwrap();
    let config = Config { data_dir: dir.path().to_path_buf(), ..Default::default() };
    let db = Database::open_in_memory().unwrap();
    let jobs = db.jobs(Arc::new(NullSink));
    let supervisor = Arc::new(Supervisor::new(config.clone(), None));
    let hub = Hub::new(jobs, supervisor, "dev".to_string(), dir.path().to_path_buf());

    let socket_path = config.socket_path();
    let listener = bind(&socket_path).unwrap();
    let shutdown = CancellationToken::new();
    tokio::spawn(run(listener, hub.clone(), shutdown.clone()));

    let (_id, mut rx) = hub.attach().await;
    recv(&mut rx).await; // handshake

    // What a consumer's store does after a mutation
    let sink = SocketSink::new(socket_path.clone());
    tokio::task::spawn_blocking(move || {
        sink.notify(Notice::JobsChanged { env_name: "dev".to_string() });
    })
    .await
    .unwrap();

    let frame = recv(&mut rx).await;
    assert!(frame.get("jobs").is_some());

    let sink = SocketSink::new(socket_path);
    tokio::task::spawn_blocking(move || sink.notify(Notice::ConsumerStatusChanged))
        .await
        .unwrap();
    let frame = recv(&mut rx).await;
    assert!(frame.get("consumer_status").is_some());

    shutdown.cancel();
}

#[tokio::test]
async fn foreign_env_notices_are_ignored() {
    let dir = TempDir::new().unwrap();
    let config = Config { data_dir: dir.path().to_path_buf(), ..Default::default() };
    let db = Database::open_in_memory().unwrap();
    let supervisor = Arc::new(Supervisor::new(config.clone(), None));
    let hub = Hub::new(
        db.jobs(Arc::new(NullSink)),
        supervisor,
        "dev".to_string(),
        dir.path().to_path_buf(),
    );

    let listener = bind(&config.socket_path()).unwrap();
    let shutdown = CancellationToken::new();
    tokio::spawn(run(listener, hub.clone(), shutdown.clone()));

    let (_id, mut rx) = hub.attach().await;
    recv(&mut rx).await;

    let sink = SocketSink::new(config.socket_path());
    tokio::task::spawn_blocking(move || {
        sink.notify(Notice::JobsChanged { env_name: "prod".to_string() })
    })
    .await
    .unwrap();

    // No frame should arrive for the foreign env
    let silent =
        tokio::time::timeout(Duration::from_millis(500), rx.recv()).await.is_err();
    assert!(silent, "foreign env notice should not broadcast");

    shutdown.cancel();
}

#[test]
fn bind_replaces_stale_socket_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gfd.sock");
    std::fs::write(&path, b"stale").unwrap();

    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    let _guard = rt.enter();
    let listener = bind(&path).unwrap();
    drop(listener);
}
