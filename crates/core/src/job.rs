// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Job entity and status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a job.
    ///
    /// Stable 128-bit random ID used in the store, log file names, and
    /// broadcast snapshots.
    pub struct JobId;
}

/// Opaque key-value payload passed to the executor.
pub type Meta = serde_json::Map<String, serde_json::Value>;

/// How a job's `command` field is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// `command` is a shell string run via `sh -c`.
    Command,
    /// `command` is a URL; `meta` is POSTed to it as JSON.
    ApiPost,
    /// `command` is a key into the script registry.
    Script,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Command => "command",
            JobKind::ApiPost => "api_post",
            JobKind::Script => "script",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "command" => Some(JobKind::Command),
            "api_post" => Some(JobKind::ApiPost),
            "script" => Some(JobKind::Script),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job priority. Declaration order is dispatch order: sorting ascending
/// puts `Highest` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Highest,
    High,
    Normal,
    Low,
    Lowest,
}

impl Priority {
    /// Ordinal rank, 0 = dispatched first.
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Highest => "highest",
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
            Priority::Lowest => "lowest",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "highest" => Some(Priority::Highest),
            "high" => Some(Priority::High),
            "normal" => Some(Priority::Normal),
            "low" => Some(Priority::Low),
            "lowest" => Some(Priority::Lowest),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Queued,
    Running,
    Done,
    Failed,
    Error,
    Cancelled,
}

impl JobStatus {
    /// Legal transitions:
    /// `pending→queued`, `queued→running`, `running→{done,failed,error,pending}`,
    /// `*→cancelled`. Writing the current status back is a no-op, not a
    /// transition, and always allowed.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        if next == Cancelled || next == self {
            return true;
        }
        matches!(
            (self, next),
            (Pending, Queued)
                | (Queued, Running)
                | (Running, Done)
                | (Running, Failed)
                | (Running, Error)
                | (Running, Pending)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Done | JobStatus::Failed | JobStatus::Error | JobStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
            JobStatus::Error => "error",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(JobStatus::Pending),
            "queued" => Some(JobStatus::Queued),
            "running" => Some(JobStatus::Running),
            "done" => Some(JobStatus::Done),
            "failed" => Some(JobStatus::Failed),
            "error" => Some(JobStatus::Error),
            "cancelled" => Some(JobStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recurrence period for template jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    Hourly,
    Daily,
}

impl Recurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::Hourly => "hourly",
            Recurrence::Daily => "daily",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hourly" => Some(Recurrence::Hourly),
            "daily" => Some(Recurrence::Daily),
            _ => None,
        }
    }
}

impl std::fmt::Display for Recurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored job.
///
/// Jobs with `recurrence` set are templates: they are never dispatched
/// themselves, and the recurring spawner copies them into fresh one-shot
/// instances each period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub env_name: String,
    pub queue_name: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: JobKind,
    /// Shell string, URL, or script registry key depending on `kind`.
    pub command: String,
    #[serde(default)]
    pub meta: Meta,
    pub priority: Priority,
    pub status: JobStatus,
    /// OS process id while running; null otherwise.
    pub pid: Option<i32>,
    pub retry_count: u32,
    pub created_at: DateTime<Utc>,
    pub recurrence: Option<Recurrence>,
    pub archived: bool,
}

impl Job {
    /// Template jobs only ever spawn copies; they are never executed directly.
    pub fn is_template(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Create the fresh one-shot instance a recurring template spawns each
    /// period: new id, current timestamp, queued, non-recurring, retry 0.
    pub fn spawn_instance(&self, now: DateTime<Utc>) -> Job {
        Job {
            id: JobId::new(),
            status: JobStatus::Queued,
            recurrence: None,
            created_at: now,
            retry_count: 0,
            pid: None,
            ..self.clone()
        }
    }
}

/// Payload for creating a job. Field defaults match what a bare submission
/// gets; schedulers validate their `job_template` JSON against this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDraft {
    #[serde(default = "default_env_name")]
    pub env_name: String,
    #[serde(default = "default_queue_name")]
    pub queue_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: JobKind,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub meta: Meta,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(default = "default_status")]
    pub status: JobStatus,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default)]
    pub recurrence: Option<Recurrence>,
    #[serde(default)]
    pub archived: bool,
}

fn default_env_name() -> String {
    "dev".to_string()
}

fn default_queue_name() -> String {
    crate::queue::DEFAULT_QUEUE.to_string()
}

fn default_kind() -> JobKind {
    JobKind::Command
}

fn default_priority() -> Priority {
    Priority::Normal
}

fn default_status() -> JobStatus {
    JobStatus::Pending
}

impl Default for JobDraft {
    fn default() -> Self {
        Self {
            env_name: default_env_name(),
            queue_name: default_queue_name(),
            name: String::new(),
            kind: default_kind(),
            command: String::new(),
            meta: Meta::new(),
            priority: default_priority(),
            status: default_status(),
            retry_count: 0,
            recurrence: None,
            archived: false,
        }
    }
}

impl JobDraft {
    /// Materialize the draft into a row with a fresh id.
    pub fn into_job(self, now: DateTime<Utc>) -> Job {
        Job {
            id: JobId::new(),
            env_name: self.env_name,
            queue_name: self.queue_name,
            name: self.name,
            kind: self.kind,
            command: self.command,
            meta: self.meta,
            priority: self.priority,
            status: self.status,
            pid: None,
            retry_count: self.retry_count,
            created_at: now,
            recurrence: self.recurrence,
            archived: self.archived,
        }
    }
}

/// Partial update for a job. `None` leaves the field untouched; the
/// double-option fields distinguish "leave" from "set to null".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPatch {
    pub env_name: Option<String>,
    pub queue_name: Option<String>,
    pub name: Option<String>,
    pub command: Option<String>,
    pub meta: Option<Meta>,
    pub priority: Option<Priority>,
    pub status: Option<JobStatus>,
    pub pid: Option<Option<i32>>,
    pub retry_count: Option<u32>,
    pub recurrence: Option<Option<Recurrence>>,
    pub archived: Option<bool>,
}

impl JobPatch {
    pub fn status(status: JobStatus) -> Self {
        Self { status: Some(status), ..Default::default() }
    }

    /// Status change for an execution exit path: the pid is only meaningful
    /// while the job is running.
    pub fn status_clearing_pid(status: JobStatus) -> Self {
        Self { status: Some(status), pid: Some(None), ..Default::default() }
    }

    pub fn pid(pid: i32) -> Self {
        Self { pid: Some(Some(pid)), ..Default::default() }
    }

    /// Apply the patch in place.
    pub fn apply(&self, job: &mut Job) {
        if let Some(v) = &self.env_name {
            job.env_name = v.clone();
        }
        if let Some(v) = &self.queue_name {
            job.queue_name = v.clone();
        }
        if let Some(v) = &self.name {
            job.name = v.clone();
        }
        if let Some(v) = &self.command {
            job.command = v.clone();
        }
        if let Some(v) = &self.meta {
            job.meta = v.clone();
        }
        if let Some(v) = self.priority {
            job.priority = v;
        }
        if let Some(v) = self.status {
            job.status = v;
        }
        if let Some(v) = self.pid {
            job.pid = v;
        }
        if let Some(v) = self.retry_count {
            job.retry_count = v;
        }
        if let Some(v) = self.recurrence {
            job.recurrence = v;
        }
        if let Some(v) = self.archived {
            job.archived = v;
        }
    }
}

crate::builder! {
    pub struct JobBuilder => Job {
        into {
            env_name: String = "dev",
            queue_name: String = crate::queue::DEFAULT_QUEUE,
            name: String = "test-job",
            command: String = "true",
        }
        set {
            id: JobId = JobId::new(),
            kind: JobKind = JobKind::Command,
            meta: Meta = Meta::new(),
            priority: Priority = Priority::Normal,
            status: JobStatus = JobStatus::Queued,
            retry_count: u32 = 0,
            created_at: DateTime<Utc> = Utc::now(),
            archived: bool = false,
        }
        option {
            pid: i32 = None,
            recurrence: Recurrence = None,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
