// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Jobs on one queue complete strictly in priority order.

use super::common::{engine, queued_command};
use gf_core::{JobStatus, Priority};
use gf_engine::dispatcher;

#[tokio::test]
async fn queued_jobs_complete_highest_first() {
    let ctx = engine("default");
    let order_file = ctx.dir.path().join("order.txt");
    let echo = |tag: &str| format!("echo {tag} >> {}", order_file.display());

    let j1 = queued_command("default", "j1", Priority::Low, &echo("L"));
    let j2 = queued_command("default", "j2", Priority::Highest, &echo("H"));
    let j3 = queued_command("default", "j3", Priority::Normal, &echo("N"));
    for job in [&j1, &j2, &j3] {
        ctx.jobs.insert(job).unwrap();
    }

    // The periodic safety net kicks the first dispatch; completions chain
    // the rest.
    dispatcher::check_and_process(&ctx.jobs, &ctx.tasks, "dev", "default").unwrap();
    ctx.runtime.drain().await;

    let order = std::fs::read_to_string(&order_file).unwrap();
    assert_eq!(order, "H\nN\nL\n");

    for job in [&j1, &j2, &j3] {
        assert_eq!(ctx.jobs.get(&job.id).unwrap().status, JobStatus::Done);
    }

    // Backlog exhausted: no further dispatch events until new jobs arrive
    assert!(ctx.tasks.is_empty().unwrap());
    assert_eq!(
        dispatcher::check_and_process(&ctx.jobs, &ctx.tasks, "dev", "default").unwrap(),
        None
    );
}

#[tokio::test]
async fn empty_queue_idles() {
    let ctx = engine("default");
    assert_eq!(
        dispatcher::check_and_process(&ctx.jobs, &ctx.tasks, "dev", "default").unwrap(),
        None
    );
    ctx.runtime.drain().await;
    assert!(ctx.tasks.is_empty().unwrap());
}
