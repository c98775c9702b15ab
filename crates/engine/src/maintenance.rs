// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Periodic maintenance: dispatcher safety net, stuck-job reaper,
//! recurring-template spawner, and scheduler evaluation.

use crate::dispatcher;
use crate::error::EngineError;
use crate::runtime::Runtime;
use chrono::{DateTime, Timelike, Utc};
use gf_core::{Clock, Job, JobDraft, JobId, JobPatch, JobScheduler, JobStatus, Recurrence};
use gf_storage::{JobStore, SchedulerStore};
use nix::errno::Errno;
use nix::sys::signal;
use nix::unistd::Pid;

impl<C: Clock> Runtime<C> {
    /// Dispatcher safety net: if nothing is running for this queue and at
    /// least one job is queued, dispatch the next one.
    pub fn check_and_process(&self) -> Result<Option<JobId>, EngineError> {
        dispatcher::check_and_process(&self.jobs, &self.tasks, &self.env_name, &self.queue.name)
    }

    /// Fail running jobs whose OS process no longer exists.
    ///
    /// A running job with no pid at all is equally stuck: something died
    /// between the claim and the pid record.
    pub fn cleanup_stuck(&self) -> Result<usize, EngineError> {
        let running = self.jobs.running_for_queue(&self.env_name, &self.queue.name)?;
        let mut reaped = 0;
        for job in running {
            match job.pid {
                Some(pid) if process_alive(pid) => {
                    tracing::debug!(job_id = %job.id.short(), pid, "running job is alive");
                }
                Some(pid) => {
                    tracing::warn!(
                        job_id = %job.id.short(),
                        pid,
                        "running job's process is gone, marking failed"
                    );
                    self.jobs.update(&job.id, &JobPatch::status_clearing_pid(JobStatus::Failed))?;
                    reaped += 1;
                }
                None => {
                    tracing::warn!(
                        job_id = %job.id.short(),
                        "running job has no pid, marking failed"
                    );
                    self.jobs.update(&job.id, &JobPatch::status_clearing_pid(JobStatus::Failed))?;
                    reaped += 1;
                }
            }
        }
        Ok(reaped)
    }

    /// Spawn fresh instances of due recurrence templates for this queue.
    ///
    /// Hourly templates spawn every call; daily templates only when the hour
    /// is 0. The periodic schedule invokes this at minute 0, so one call per
    /// boundary.
    pub fn spawn_recurring(&self) -> Result<usize, EngineError> {
        let now = self.clock.now_utc();
        let spawn_daily = now.hour() == 0;
        let templates = self.jobs.templates_for_queue(&self.env_name, &self.queue.name)?;
        let mut spawned = 0;
        for template in templates {
            let due = match template.recurrence {
                Some(Recurrence::Hourly) => true,
                Some(Recurrence::Daily) => spawn_daily,
                None => false,
            };
            if !due {
                continue;
            }
            let instance = template.spawn_instance(now);
            self.jobs.insert(&instance)?;
            tracing::info!(
                template_id = %template.id.short(),
                job_id = %instance.id.short(),
                recurrence = %template.recurrence.map(|r| r.as_str()).unwrap_or(""),
                "spawned recurring job instance"
            );
            spawned += 1;
        }
        Ok(spawned)
    }

    /// Fire every due repeat scheduler: stamp `last_run` first, then create
    /// the job from the stored template.
    pub fn scheduler_tick(&self) -> Result<usize, EngineError> {
        let now_secs = self.clock.epoch_secs();
        let due = self.schedulers.list_due_repeat(&self.env_name, now_secs)?;
        let mut fired = 0;
        for scheduler in due {
            tracing::info!(
                scheduler_id = %scheduler.id.short(),
                name = %scheduler.name,
                "repeat scheduler due"
            );
            // last_run advances before the enqueue so a slow spawn cannot
            // re-fire on the next tick
            self.schedulers.mark_fired(&scheduler.id, now_secs)?;
            match spawn_from_scheduler(&self.jobs, &scheduler, self.clock.now_utc()) {
                Ok(job) => {
                    tracing::info!(
                        scheduler_id = %scheduler.id.short(),
                        job_id = %job.id.short(),
                        "created job from scheduler"
                    );
                    fired += 1;
                }
                Err(e) => {
                    tracing::error!(
                        scheduler_id = %scheduler.id.short(),
                        error = %e,
                        "failed to create job from scheduler"
                    );
                }
            }
        }
        Ok(fired)
    }
}

/// Validate a scheduler's stored template as a job draft and create the job.
pub fn spawn_from_scheduler(
    jobs: &JobStore,
    scheduler: &JobScheduler,
    now: DateTime<Utc>,
) -> Result<Job, EngineError> {
    let draft: JobDraft = serde_json::from_value(scheduler.job_template.clone()).map_err(|e| {
        EngineError::InvalidTemplate { name: scheduler.name.clone(), source: e }
    })?;
    let draft = JobDraft {
        name: format!("Scheduled Job ({}): {}", scheduler.trigger_type, scheduler.name),
        env_name: scheduler.env_name.clone(),
        ..draft
    };
    Ok(jobs.create(draft, now)?)
}

/// Fire every enabled `on_start` scheduler once. Called at engine boot.
pub fn run_on_start_schedulers(
    jobs: &JobStore,
    schedulers: &SchedulerStore,
    env_name: &str,
    now: DateTime<Utc>,
) -> Result<usize, EngineError> {
    let on_start = schedulers.list_on_start(env_name)?;
    let mut fired = 0;
    for scheduler in on_start {
        schedulers.mark_fired(&scheduler.id, now.timestamp())?;
        match spawn_from_scheduler(jobs, &scheduler, now) {
            Ok(job) => {
                tracing::info!(
                    scheduler_id = %scheduler.id.short(),
                    job_id = %job.id.short(),
                    "created job from on_start scheduler"
                );
                fired += 1;
            }
            Err(e) => {
                tracing::error!(
                    scheduler_id = %scheduler.id.short(),
                    error = %e,
                    "failed to create job from on_start scheduler"
                );
            }
        }
    }
    Ok(fired)
}

/// Signal-0 liveness probe. EPERM means the process exists but is owned by
/// someone else, which still counts as alive.
pub(crate) fn process_alive(pid: i32) -> bool {
    match signal::kill(Pid::from_raw(pid), None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

#[cfg(test)]
#[path = "maintenance_tests.rs"]
mod tests;
