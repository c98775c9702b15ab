// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! The stuck-job reaper fails running jobs whose process is gone.

use super::common::engine;
use gf_core::{JobBuilder, JobStatus};

#[test]
fn dead_pid_running_job_is_failed_by_reaper() {
    let ctx = engine("default");
    let job = JobBuilder::default()
        .name("stuck")
        .status(JobStatus::Running)
        .pid(999_999)
        .build();
    ctx.jobs.insert(&job).unwrap();

    assert_eq!(ctx.runtime.cleanup_stuck().unwrap(), 1);

    let reaped = ctx.jobs.get(&job.id).unwrap();
    assert_eq!(reaped.status, JobStatus::Failed);
    assert_eq!(reaped.pid, None);
}

#[test]
fn reaper_only_touches_its_own_queue() {
    let ctx = engine("default");
    let other = JobBuilder::default()
        .queue_name("reserved")
        .status(JobStatus::Running)
        .pid(999_999)
        .build();
    ctx.jobs.insert(&other).unwrap();

    assert_eq!(ctx.runtime.cleanup_stuck().unwrap(), 0);
    assert_eq!(ctx.jobs.get(&other.id).unwrap().status, JobStatus::Running);
}
