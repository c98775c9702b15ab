// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! gfd: the Gaffer server daemon.

use clap::Parser;
use gf_daemon::{lifecycle, Config};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "gfd", about = "Gaffer job engine daemon")]
struct Args {
    /// Path to the config file
    #[arg(long, default_value = "gaffer.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("gfd: {e}");
            std::process::exit(1);
        }
    };

    // Console plus a file under data/logs; the file layer has no ANSI noise
    let _log_guard = match std::fs::create_dir_all(config.log_dir()) {
        Ok(()) => {
            let appender = tracing_appender::rolling::never(config.log_dir(), "gfd.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
                .with(fmt::layer())
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        Err(e) => {
            eprintln!("gfd: cannot create log dir: {e}");
            std::process::exit(1);
        }
    };

    let config_path = args.config.exists().then(|| args.config.clone());
    let mut daemon = match lifecycle::startup(config, config_path).await {
        Ok(daemon) => daemon,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            std::process::exit(1);
        }
    };

    wait_for_shutdown_signal().await;
    daemon.shutdown();
}

async fn wait_for_shutdown_signal() {
    let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
    {
        Ok(sigterm) => sigterm,
        Err(e) => {
            tracing::error!(error = %e, "cannot install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("received ctrl-c"),
        _ = sigterm.recv() => tracing::info!("received SIGTERM"),
    }
}
