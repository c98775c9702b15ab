// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! User kill of a running command: SIGKILL lands, the job returns to
//! `pending` with its pid cleared.

use super::common::{engine, queued_command};
use gf_core::{JobStatus, Priority};
use gf_engine::kill_job;
use std::time::Duration;

#[tokio::test]
async fn killing_a_running_job_returns_it_to_pending() {
    let ctx = engine("default");
    let job = queued_command("default", "sleeper", Priority::Normal, "sleep 60");
    ctx.jobs.insert(&job).unwrap();

    let runtime = ctx.runtime.clone();
    let job_id = job.id;
    let execution = tokio::spawn(async move { runtime.execute_job(job_id).await });

    // Wait for the job to be running with a recorded pid
    let mut running_with_pid = false;
    for _ in 0..100 {
        let current = ctx.jobs.get(&job.id).unwrap();
        if current.status == JobStatus::Running && current.pid.is_some() {
            running_with_pid = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(running_with_pid, "job never started running with a pid");

    let outcome = kill_job(&ctx.jobs, &job.id);
    assert!(outcome.success, "{}", outcome.message);

    execution.await.unwrap().unwrap();

    let killed = ctx.jobs.get(&job.id).unwrap();
    assert_eq!(killed.status, JobStatus::Pending);
    assert_eq!(killed.pid, None);
}
