// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Repeat schedulers fire on their interval and the spawned jobs execute.

use super::common::engine;
use gf_core::{Clock, JobStatus, SchedulerDraft, TriggerType};
use gf_engine::dispatcher;

#[tokio::test]
async fn repeat_scheduler_fires_per_interval_and_jobs_run() {
    let ctx = engine("default");
    let scheduler = ctx
        .schedulers
        .create(SchedulerDraft {
            name: "minutely".into(),
            trigger_type: TriggerType::Repeat,
            repeat_every_seconds: Some(60),
            job_template: serde_json::json!({
                "command": "true",
                "status": "queued",
            }),
            ..Default::default()
        })
        .unwrap();

    // First tick: due because it never fired
    assert_eq!(ctx.runtime.scheduler_tick().unwrap(), 1);
    let first_run = ctx.schedulers.get(&scheduler.id).unwrap().last_run.unwrap();
    assert_eq!(first_run, ctx.clock.epoch_secs());

    // 30 s later: nothing
    ctx.clock.advance_secs(30);
    assert_eq!(ctx.runtime.scheduler_tick().unwrap(), 0);

    // 90 s after the first fire: due again
    ctx.clock.advance_secs(60);
    assert_eq!(ctx.runtime.scheduler_tick().unwrap(), 1);

    let jobs = ctx.jobs.list("dev", None, false).unwrap();
    assert_eq!(jobs.len(), 2);
    assert!(jobs.iter().all(|j| j.name == "Scheduled Job (repeat): minutely"));

    // Spawned jobs are ordinary queued work
    dispatcher::check_and_process(&ctx.jobs, &ctx.tasks, "dev", "default").unwrap();
    ctx.runtime.drain().await;
    let jobs = ctx.jobs.list("dev", None, false).unwrap();
    assert!(jobs.iter().all(|j| j.status == JobStatus::Done));
}
