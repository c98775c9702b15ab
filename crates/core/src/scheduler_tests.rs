// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

use super::*;

fn repeat_scheduler(every: u32, last_run: Option<i64>) -> JobScheduler {
    let builder = SchedulerBuilder::default()
        .trigger_type(TriggerType::Repeat)
        .repeat_every_seconds(every);
    match last_run {
        Some(at) => builder.last_run(at).build(),
        None => builder.build(),
    }
}

#[test]
fn never_fired_repeat_scheduler_is_due() {
    assert!(repeat_scheduler(60, None).is_due(1_000_000));
}

#[test]
fn due_only_after_full_interval() {
    let s = repeat_scheduler(60, Some(1_000_000));
    assert!(!s.is_due(1_000_030));
    assert!(s.is_due(1_000_060));
    assert!(s.is_due(1_000_090));
}

#[test]
fn disabled_scheduler_is_never_due() {
    let mut s = repeat_scheduler(60, None);
    s.enabled = false;
    assert!(!s.is_due(1_000_000));
}

#[test]
fn on_start_scheduler_is_never_due_for_repeat() {
    let s = SchedulerBuilder::default().trigger_type(TriggerType::OnStart).build();
    assert!(!s.is_due(1_000_000));
}

#[test]
fn missing_or_zero_interval_is_never_due() {
    let s = SchedulerBuilder::default().trigger_type(TriggerType::Repeat).build();
    assert!(!s.is_due(1_000_000));
    assert!(!repeat_scheduler(0, None).is_due(1_000_000));
}

#[test]
fn draft_defaults() {
    let draft: SchedulerDraft = serde_json::from_str("{}").unwrap();
    assert_eq!(draft.trigger_type, TriggerType::OnStart);
    assert!(draft.enabled);
    let s = draft.into_scheduler();
    assert_eq!(s.last_run, None);
}

#[test]
fn patch_can_clear_last_run() {
    let mut s = repeat_scheduler(60, Some(500));
    SchedulerPatch { last_run: Some(None), ..Default::default() }.apply(&mut s);
    assert_eq!(s.last_run, None);
}

#[test]
fn trigger_type_strings_round_trip() {
    for t in [TriggerType::OnStart, TriggerType::Repeat] {
        assert_eq!(TriggerType::parse(t.as_str()), Some(t));
    }
}
