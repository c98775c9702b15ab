// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gf-consumer: the worker process for one named queue.
//!
//! Spawned and supervised by `gfd`. Drains the queue's durable task queue
//! through the worker runtime, one job at a time, until SIGTERM.

mod scripts;

use clap::Parser;
use gf_core::{paths, SystemClock};
use gf_daemon::Config;
use gf_engine::{Runtime, RuntimeDeps, SocketSink};
use gf_storage::{Database, TaskQueue};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gf-consumer", about = "Gaffer queue consumer")]
struct Args {
    /// Queue to drain
    #[arg(long)]
    queue: String,

    /// Path to the config file
    #[arg(long, default_value = "gaffer.toml")]
    config: PathBuf,
}

#[derive(Debug, Error)]
enum StartError {
    #[error(transparent)]
    Config(#[from] gf_daemon::ConfigError),

    #[error(transparent)]
    Storage(#[from] gf_storage::StorageError),

    #[error("queue {0:?} is not configured")]
    UnknownQueue(String),
}

#[tokio::main]
async fn main() {
    // stdout/stderr go to the consumer log file via the supervisor
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_ansi(false)
        .init();

    if let Err(e) = run(Args::parse()).await {
        tracing::error!(error = %e, "consumer failed to start");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), StartError> {
    let config = Config::load(&args.config)?;
    let queue = config
        .queue(&args.queue)
        .cloned()
        .ok_or_else(|| StartError::UnknownQueue(args.queue.clone()))?;

    let db = Database::open(&config.store_db_path())?;
    let sink = Arc::new(SocketSink::new(paths::socket_path(&config.data_dir)));
    let jobs = db.jobs(sink);
    let schedulers = db.schedulers();
    let tasks = TaskQueue::open(&queue.task_db_path(&config.data_dir))?;

    let runtime = Runtime::new(RuntimeDeps {
        jobs,
        schedulers,
        tasks,
        scripts: Arc::new(scripts::registry()),
        clock: SystemClock,
        env_name: config.env_name.clone(),
        queue,
        data_dir: config.data_dir.clone(),
    });

    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    runtime.run(shutdown).await;
    Ok(())
}

fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    tracing::error!(error = %e, "cannot install SIGTERM handler");
                    let _ = tokio::signal::ctrl_c().await;
                    shutdown.cancel();
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
        tracing::info!("shutdown signal received, finishing current task");
        shutdown.cancel();
    });
}
