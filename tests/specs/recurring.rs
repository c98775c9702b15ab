// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Recurring templates spawn fresh one-shot instances and are themselves
//! never executed.

use super::common::engine;
use gf_core::{JobBuilder, JobStatus, Recurrence};
use gf_engine::dispatcher;

#[tokio::test]
async fn hourly_template_spawns_an_instance_that_executes() {
    let ctx = engine("default");
    let template = JobBuilder::default()
        .name("hourly-echo")
        .status(JobStatus::Queued)
        .recurrence(Recurrence::Hourly)
        .command("true")
        .build();
    ctx.jobs.insert(&template).unwrap();

    assert_eq!(ctx.runtime.spawn_recurring().unwrap(), 1);

    // Find the spawned instance
    let jobs = ctx.jobs.list("dev", None, false).unwrap();
    assert_eq!(jobs.len(), 2);
    let instance = jobs.iter().find(|j| j.id != template.id).unwrap();
    assert_eq!(instance.recurrence, None);
    assert_eq!(instance.status, JobStatus::Queued);
    assert_eq!(instance.retry_count, 0);

    // The instance runs; the template never does
    dispatcher::check_and_process(&ctx.jobs, &ctx.tasks, "dev", "default").unwrap();
    ctx.runtime.drain().await;

    assert_eq!(ctx.jobs.get(&instance.id).unwrap().status, JobStatus::Done);
    let untouched = ctx.jobs.get(&template.id).unwrap();
    assert_eq!(untouched.status, JobStatus::Queued);
    assert_eq!(untouched.recurrence, Some(Recurrence::Hourly));
}
