// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Double-enqueued execute tasks run the job exactly once.

use super::common::{engine, queued_command};
use gf_core::{JobStatus, Priority};
use gf_storage::Task;

#[tokio::test]
async fn duplicate_execute_tasks_run_once() {
    let ctx = engine("default");
    let order_file = ctx.dir.path().join("runs.txt");
    let job = queued_command(
        "default",
        "once",
        Priority::Normal,
        &format!("echo ran >> {}", order_file.display()),
    );
    ctx.jobs.insert(&job).unwrap();

    // Manually enqueue the same job twice
    ctx.tasks.push(&Task::ExecuteJob { job_id: job.id }).unwrap();
    ctx.tasks.push(&Task::ExecuteJob { job_id: job.id }).unwrap();
    ctx.runtime.drain().await;

    assert_eq!(ctx.jobs.get(&job.id).unwrap().status, JobStatus::Done);
    assert_eq!(std::fs::read_to_string(&order_file).unwrap(), "ran\n");
}

#[test]
fn second_claim_observes_stale_transition() {
    let ctx = engine("default");
    let job = queued_command("default", "claimed", Priority::Normal, "true");
    ctx.jobs.insert(&job).unwrap();

    let claimed = ctx.jobs.claim(&job.id).unwrap();
    assert_eq!(claimed.status, JobStatus::Running);

    let err = ctx.jobs.claim(&job.id).unwrap_err();
    assert!(err.is_stale_transition());
}
