// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! A job created through the store appears in the next snapshot frame of
//! every attached subscriber.

use gf_core::{JobDraft, JobStatus, NullSink};
use gf_daemon::{Config, Hub, HubSink, Supervisor};
use gf_storage::Database;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

async fn recv(rx: &mut tokio::sync::mpsc::Receiver<serde_json::Value>) -> serde_json::Value {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for frame")
        .expect("channel closed")
}

#[tokio::test]
async fn created_job_reaches_every_subscriber() {
    let dir = TempDir::new().unwrap();
    let config = Config { data_dir: dir.path().to_path_buf(), ..Default::default() };
    let db = Database::open(&config.store_db_path()).unwrap();
    let supervisor = Arc::new(Supervisor::new(config.clone(), None));
    let hub = Hub::new(
        db.jobs(Arc::new(NullSink)),
        supervisor,
        "dev".to_string(),
        dir.path().to_path_buf(),
    );
    // The mutating view a request handler would use
    let jobs = db.jobs(Arc::new(HubSink::new(hub.clone())));

    let (_a, mut rx_a) = hub.attach().await;
    let (_b, mut rx_b) = hub.attach().await;
    recv(&mut rx_a).await;
    recv(&mut rx_b).await;

    let created = jobs
        .create(
            JobDraft {
                name: "submitted-via-rest".into(),
                command: "true".into(),
                status: JobStatus::Queued,
                ..Default::default()
            },
            chrono::Utc::now(),
        )
        .unwrap();

    for rx in [&mut rx_a, &mut rx_b] {
        let frame = recv(rx).await;
        let listed = frame["jobs"].as_array().expect("jobs array");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], created.id.to_string());
        assert_eq!(listed[0]["name"], "submitted-via-rest");
        assert_eq!(listed[0]["status"], "queued");
    }
}
