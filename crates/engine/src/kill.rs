// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! User-initiated kill of a running job.

use gf_core::{JobId, JobPatch, JobStatus};
use gf_storage::JobStore;
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use serde::Serialize;

/// Per-call result of a kill request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KillOutcome {
    pub success: bool,
    pub message: String,
}

/// Kill a job's process with SIGKILL and put the job back to `pending` so it
/// can be resubmitted. The command execution path observes the SIGKILL and
/// reaches the same status from its side.
pub fn kill_job(jobs: &JobStore, job_id: &JobId) -> KillOutcome {
    let job = match jobs.get(job_id) {
        Ok(job) => job,
        Err(e) if e.is_not_found() => {
            return KillOutcome { success: false, message: format!("job {job_id} not found") };
        }
        Err(e) => {
            return KillOutcome {
                success: false,
                message: format!("failed to load job {job_id}: {e}"),
            };
        }
    };

    let Some(pid) = job.pid else {
        set_pending(jobs, job_id);
        return KillOutcome { success: false, message: format!("no pid found for job {job_id}") };
    };

    match signal::kill(Pid::from_raw(pid), Signal::SIGKILL) {
        Ok(()) => {
            set_pending(jobs, job_id);
            KillOutcome { success: true, message: format!("job {job_id} (pid {pid}) killed") }
        }
        Err(Errno::ESRCH) => {
            // Already gone; still resubmittable
            set_pending(jobs, job_id);
            KillOutcome {
                success: true,
                message: format!("job {job_id} (pid {pid}) not found"),
            }
        }
        Err(e) => KillOutcome {
            success: false,
            message: format!("failed to kill job {job_id} (pid {pid}): {e}"),
        },
    }
}

/// Best-effort transition to `pending`. A job that is not running cannot
/// legally move there; that is logged and ignored rather than surfaced.
fn set_pending(jobs: &JobStore, job_id: &JobId) {
    if let Err(e) = jobs.update(job_id, &JobPatch::status_clearing_pid(JobStatus::Pending)) {
        tracing::warn!(job_id = %job_id, error = %e, "could not reset killed job to pending");
    }
}

#[cfg(test)]
#[path = "kill_tests.rs"]
mod tests;
