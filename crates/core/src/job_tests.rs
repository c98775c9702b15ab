// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

use super::*;
use yare::parameterized;

#[parameterized(
    pending_to_queued = { JobStatus::Pending, JobStatus::Queued },
    queued_to_running = { JobStatus::Queued, JobStatus::Running },
    running_to_done = { JobStatus::Running, JobStatus::Done },
    running_to_failed = { JobStatus::Running, JobStatus::Failed },
    running_to_error = { JobStatus::Running, JobStatus::Error },
    running_to_pending = { JobStatus::Running, JobStatus::Pending },
    pending_to_cancelled = { JobStatus::Pending, JobStatus::Cancelled },
    queued_to_cancelled = { JobStatus::Queued, JobStatus::Cancelled },
    running_to_cancelled = { JobStatus::Running, JobStatus::Cancelled },
    done_to_cancelled = { JobStatus::Done, JobStatus::Cancelled },
)]
fn legal_transitions(from: JobStatus, to: JobStatus) {
    assert!(from.can_transition_to(to), "{from} -> {to} should be legal");
}

#[parameterized(
    pending_to_running = { JobStatus::Pending, JobStatus::Running },
    pending_to_done = { JobStatus::Pending, JobStatus::Done },
    queued_to_done = { JobStatus::Queued, JobStatus::Done },
    queued_to_pending = { JobStatus::Queued, JobStatus::Pending },
    done_to_running = { JobStatus::Done, JobStatus::Running },
    done_to_queued = { JobStatus::Done, JobStatus::Queued },
    failed_to_running = { JobStatus::Failed, JobStatus::Running },
    cancelled_to_queued = { JobStatus::Cancelled, JobStatus::Queued },
    error_to_done = { JobStatus::Error, JobStatus::Done },
)]
fn illegal_transitions(from: JobStatus, to: JobStatus) {
    assert!(!from.can_transition_to(to), "{from} -> {to} should be illegal");
}

#[test]
fn identity_writes_are_allowed() {
    for status in [
        JobStatus::Pending,
        JobStatus::Queued,
        JobStatus::Running,
        JobStatus::Done,
        JobStatus::Failed,
        JobStatus::Error,
        JobStatus::Cancelled,
    ] {
        assert!(status.can_transition_to(status));
    }
}

#[test]
fn priority_orders_highest_first() {
    let mut priorities = vec![
        Priority::Low,
        Priority::Highest,
        Priority::Lowest,
        Priority::Normal,
        Priority::High,
    ];
    priorities.sort();
    assert_eq!(
        priorities,
        vec![
            Priority::Highest,
            Priority::High,
            Priority::Normal,
            Priority::Low,
            Priority::Lowest,
        ]
    );
    assert_eq!(Priority::Highest.rank(), 0);
    assert_eq!(Priority::Lowest.rank(), 4);
}

#[test]
fn status_strings_round_trip() {
    for status in [
        JobStatus::Pending,
        JobStatus::Queued,
        JobStatus::Running,
        JobStatus::Done,
        JobStatus::Failed,
        JobStatus::Error,
        JobStatus::Cancelled,
    ] {
        assert_eq!(JobStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(JobStatus::parse("bogus"), None);
}

#[test]
fn kind_serializes_as_type_field() {
    let job = JobBuilder::default().kind(JobKind::ApiPost).build();
    let value = serde_json::to_value(&job).unwrap();
    assert_eq!(value["type"], "api_post");
    assert!(value.get("kind").is_none());
}

#[test]
fn spawn_instance_resets_template_fields() {
    let template = JobBuilder::default()
        .recurrence(Recurrence::Hourly)
        .retry_count(3)
        .pid(42)
        .build();
    let now = Utc::now();
    let spawned = template.spawn_instance(now);

    assert_ne!(spawned.id, template.id);
    assert_eq!(spawned.status, JobStatus::Queued);
    assert_eq!(spawned.recurrence, None);
    assert_eq!(spawned.retry_count, 0);
    assert_eq!(spawned.pid, None);
    assert_eq!(spawned.created_at, now);
    assert_eq!(spawned.command, template.command);
    assert_eq!(spawned.queue_name, template.queue_name);
}

#[test]
fn draft_defaults_match_bare_submission() {
    let draft: JobDraft = serde_json::from_str("{}").unwrap();
    assert_eq!(draft.env_name, "dev");
    assert_eq!(draft.queue_name, "default");
    assert_eq!(draft.kind, JobKind::Command);
    assert_eq!(draft.priority, Priority::Normal);
    assert_eq!(draft.status, JobStatus::Pending);
    assert_eq!(draft.recurrence, None);
}

#[test]
fn draft_into_job_assigns_fresh_id() {
    let draft = JobDraft { command: "echo hi".into(), ..Default::default() };
    let now = Utc::now();
    let job = draft.into_job(now);
    assert_eq!(job.command, "echo hi");
    assert_eq!(job.created_at, now);
    assert_eq!(job.pid, None);
}

#[test]
fn patch_apply_distinguishes_unset_from_null() {
    let mut job = JobBuilder::default().pid(123).build();

    // Leave pid untouched
    JobPatch::status(JobStatus::Running).apply(&mut job);
    assert_eq!(job.pid, Some(123));

    // Explicitly clear it
    JobPatch::status_clearing_pid(JobStatus::Done).apply(&mut job);
    assert_eq!(job.pid, None);
    assert_eq!(job.status, JobStatus::Done);
}

#[test]
fn template_detection() {
    assert!(JobBuilder::default().recurrence(Recurrence::Daily).build().is_template());
    assert!(!JobBuilder::default().build().is_template());
}
