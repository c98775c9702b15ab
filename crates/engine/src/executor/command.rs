// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Shell command execution: `sh -c <command>` with the child's merged
//! output streamed line-by-line into the job log.

use super::ExecOutcome;
use crate::error::EngineError;
use crate::job_log::JobLog;
use gf_core::{Job, JobPatch};
use gf_storage::JobStore;
use nix::sys::signal::Signal;
use std::os::unix::process::ExitStatusExt;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

pub(crate) async fn run(
    jobs: &JobStore,
    job: &Job,
    log: &JobLog,
) -> Result<ExecOutcome, EngineError> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(&job.command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    // Record the pid as soon as the child exists so the kill path and the
    // stuck-job reaper can see it.
    if let Some(pid) = child.id() {
        tracing::info!(job_id = %job.id.short(), pid, "job started");
        jobs.update(&job.id, &JobPatch::pid(pid as i32))?;
    }

    // stderr is pumped concurrently so a chatty child can't deadlock on a
    // full pipe while we read stdout.
    let stderr_pump = child.stderr.take().map(|stream| {
        let log = log.clone();
        tokio::spawn(async move { pump_lines(stream, &log).await })
    });
    if let Some(stdout) = child.stdout.take() {
        pump_lines(stdout, log).await;
    }
    if let Some(pump) = stderr_pump {
        let _ = pump.await;
    }

    let status = child.wait().await?;
    if status.success() {
        return Ok(ExecOutcome::Success);
    }
    match status.signal() {
        Some(signal) if signal == Signal::SIGKILL as i32 => {
            log.line("killed by SIGKILL");
            Ok(ExecOutcome::Killed)
        }
        Some(signal) => {
            log.line(&format!("terminated by signal {signal}"));
            Err(EngineError::CommandSignal { signal })
        }
        None => {
            let code = status.code().unwrap_or(-1);
            log.line(&format!("exit code {code}"));
            Err(EngineError::CommandExit { code })
        }
    }
}

async fn pump_lines(stream: impl AsyncRead + Unpin, log: &JobLog) {
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => log.line(&line),
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "failed reading child output");
                break;
            }
        }
    }
}
