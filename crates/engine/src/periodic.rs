// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Minute-granularity periodic scheduling for maintenance tasks.
//!
//! Cron specs here only know minutes and hours; anything finer is out of
//! scope. Each task fires at most once per matching minute boundary, so a
//! fast poll loop cannot double-fire within the same boundary.

use chrono::{DateTime, Timelike, Utc};
use gf_core::DEFAULT_QUEUE;
use std::collections::HashMap;

/// The maintenance work a due tick asks the runtime to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodicKind {
    /// Dispatcher safety net.
    CheckQueued,
    /// Reap running jobs whose process is gone.
    CleanupStuck,
    /// Spawn fresh instances of hourly/daily templates.
    SpawnRecurring,
    /// Evaluate due repeat schedulers (default queue only).
    SchedulerTick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MinuteField {
    /// Minutes divisible by the step (crontab `*/n`).
    Every(u32),
    /// A fixed minute of the hour.
    At(u32),
}

/// When a periodic task fires, to minute/hour granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CronSpec {
    minute: MinuteField,
    hour: Option<u32>,
}

impl CronSpec {
    pub fn every_minutes(step: u32) -> Self {
        Self { minute: MinuteField::Every(step.max(1)), hour: None }
    }

    pub fn at_minute(minute: u32) -> Self {
        Self { minute: MinuteField::At(minute), hour: None }
    }

    pub fn matches(&self, at: DateTime<Utc>) -> bool {
        let minute_ok = match self.minute {
            MinuteField::Every(step) => at.minute() % step == 0,
            MinuteField::At(minute) => at.minute() == minute,
        };
        let hour_ok = self.hour.map_or(true, |h| at.hour() == h);
        minute_ok && hour_ok
    }
}

struct PeriodicTask {
    name: &'static str,
    spec: CronSpec,
    kind: PeriodicKind,
}

/// The registered periodic tasks for one queue, with once-per-boundary
/// dedup state.
pub struct PeriodicSchedule {
    tasks: Vec<PeriodicTask>,
    // minute stamp (unix minutes) each task last fired on
    fired: HashMap<&'static str, i64>,
}

impl PeriodicSchedule {
    /// Standard registration: safety-net check every minute, stuck reaper
    /// every five, recurring spawn at minute 0 (the spawn handles daily
    /// templates when the hour is also 0), and the scheduler tick every
    /// minute on the default queue only.
    pub fn for_queue(queue_name: &str) -> Self {
        let mut tasks = vec![
            PeriodicTask {
                name: "check_and_process_queued",
                spec: CronSpec::every_minutes(1),
                kind: PeriodicKind::CheckQueued,
            },
            PeriodicTask {
                name: "cleanup_stuck",
                spec: CronSpec::every_minutes(5),
                kind: PeriodicKind::CleanupStuck,
            },
            PeriodicTask {
                name: "spawn_recurring",
                spec: CronSpec::at_minute(0),
                kind: PeriodicKind::SpawnRecurring,
            },
        ];
        if queue_name == DEFAULT_QUEUE {
            tasks.push(PeriodicTask {
                name: "scheduler_tick",
                spec: CronSpec::every_minutes(1),
                kind: PeriodicKind::SchedulerTick,
            });
        }
        Self { tasks, fired: HashMap::new() }
    }

    /// Tasks due at `now` that have not yet fired this minute. Marks them
    /// fired, so calling again within the same minute returns nothing.
    pub fn due(&mut self, now: DateTime<Utc>) -> Vec<PeriodicKind> {
        let stamp = now.timestamp().div_euclid(60);
        let mut due = Vec::new();
        for task in &self.tasks {
            if !task.spec.matches(now) {
                continue;
            }
            if self.fired.get(task.name) == Some(&stamp) {
                continue;
            }
            self.fired.insert(task.name, stamp);
            due.push(task.kind);
        }
        due
    }
}

#[cfg(test)]
#[path = "periodic_tests.rs"]
mod tests;
