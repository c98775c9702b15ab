// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! The `execute_job` contract: claim, dispatch by type, record the outcome,
//! and chain the next dispatch.

mod api_post;
mod command;
mod script;

use crate::error::EngineError;
use crate::job_log::JobLog;
use crate::{dispatcher, runtime::Runtime};
use gf_core::{Clock, Job, JobId, JobKind, JobPatch, JobStatus};

/// How an execution step ended, before status classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecOutcome {
    Success,
    /// The child died with SIGKILL: a user-initiated kill. The job goes back
    /// to `pending` so it can be resubmitted, not to `failed`.
    Killed,
}

impl<C: Clock> Runtime<C> {
    /// Execute one job end to end.
    ///
    /// Steps: load, race-safe claim check, atomic `queued → running`,
    /// dispatch by type, classify the outcome, and in every exit path clear
    /// the pid and trigger the next dispatch for this queue.
    pub async fn execute_job(&self, job_id: JobId) -> Result<(), EngineError> {
        let job = match self.jobs.get(&job_id) {
            Ok(job) => job,
            Err(e) if e.is_not_found() => {
                tracing::error!(job_id = %job_id, "job not found, aborting task");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        // Race-safe claim check: another consumer may have taken it already.
        if job.status != JobStatus::Queued {
            tracing::warn!(
                job_id = %job_id.short(),
                status = %job.status,
                "job is not queued; another consumer may be processing it, aborting"
            );
            return Ok(());
        }

        let job = match self.jobs.claim(&job_id) {
            Ok(job) => job,
            Err(e) if e.is_stale_transition() => {
                tracing::warn!(job_id = %job_id.short(), error = %e, "claim lost, aborting");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            job_id = %job.id.short(),
            name = %job.name,
            kind = %job.kind,
            queue = %job.queue_name,
            "executing job"
        );

        let final_status = match self.dispatch(&job).await {
            Ok(ExecOutcome::Success) => {
                tracing::info!(job_id = %job.id.short(), "job completed");
                JobStatus::Done
            }
            Ok(ExecOutcome::Killed) => {
                tracing::warn!(job_id = %job.id.short(), "job killed by SIGKILL, back to pending");
                JobStatus::Pending
            }
            Err(e) if e.is_transport() => {
                tracing::error!(job_id = %job.id.short(), error = %e, "transport error");
                JobStatus::Error
            }
            Err(e) => {
                tracing::error!(job_id = %job.id.short(), error = %e, "job failed");
                JobStatus::Failed
            }
        };

        if let Err(e) = self.jobs.update(&job.id, &JobPatch::status_clearing_pid(final_status)) {
            tracing::error!(job_id = %job.id.short(), error = %e, "failed to record job outcome");
        }

        // Keep the queue moving regardless of how this job ended
        if let Err(e) =
            dispatcher::trigger_next(&self.jobs, &self.tasks, &self.env_name, &self.queue.name)
        {
            tracing::error!(queue = %self.queue.name, error = %e, "post-completion dispatch failed");
        }

        Ok(())
    }

    async fn dispatch(&self, job: &Job) -> Result<ExecOutcome, EngineError> {
        let log = match JobLog::create(&self.data_dir, &job.id, job.retry_count) {
            Ok(log) => log,
            Err(e) => {
                tracing::error!(job_id = %job.id.short(), error = %e, "cannot open job log");
                return Err(e.into());
            }
        };

        let result = match job.kind {
            JobKind::Command => command::run(&self.jobs, job, &log).await,
            JobKind::ApiPost => api_post::run(&self.http, job, &log).await.map(|()| ExecOutcome::Success),
            JobKind::Script => {
                script::run(&self.scripts, job, &log).await.map(|()| ExecOutcome::Success)
            }
        };

        if let Err(e) = &result {
            log.line(&format!("error: {e}"));
        }
        result
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
