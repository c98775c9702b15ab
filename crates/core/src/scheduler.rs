// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Persistent job schedulers: triggers that produce jobs from a template.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a job scheduler.
    pub struct SchedulerId;
}

/// When a scheduler fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    /// Fires once at engine boot.
    OnStart,
    /// Fires every `repeat_every_seconds`.
    Repeat,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::OnStart => "on_start",
            TriggerType::Repeat => "repeat",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "on_start" => Some(TriggerType::OnStart),
            "repeat" => Some(TriggerType::Repeat),
            _ => None,
        }
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persistent trigger that produces jobs from a stored template.
///
/// `job_template` is opaque JSON here; it is validated as a `JobDraft` at
/// spawn time so a broken template fails the spawn, not the scheduler CRUD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobScheduler {
    pub id: SchedulerId,
    pub env_name: String,
    pub name: String,
    pub description: String,
    pub trigger_type: TriggerType,
    /// Positive interval for `repeat`; ignored for `on_start`.
    pub repeat_every_seconds: Option<u32>,
    pub job_template: serde_json::Value,
    pub enabled: bool,
    /// Unix seconds of the last spawn; null if never fired.
    pub last_run: Option<i64>,
}

impl JobScheduler {
    /// A repeat scheduler is due iff enabled and either never fired or the
    /// interval has fully elapsed since `last_run`.
    pub fn is_due(&self, now: i64) -> bool {
        if !self.enabled || self.trigger_type != TriggerType::Repeat {
            return false;
        }
        match self.repeat_every_seconds {
            Some(every) if every > 0 => {
                self.last_run.map_or(true, |last| now - last >= i64::from(every))
            }
            _ => false,
        }
    }
}

/// Payload for creating a scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerDraft {
    #[serde(default = "default_env_name")]
    pub env_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_trigger_type")]
    pub trigger_type: TriggerType,
    #[serde(default)]
    pub repeat_every_seconds: Option<u32>,
    #[serde(default = "default_job_template")]
    pub job_template: serde_json::Value,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_env_name() -> String {
    "dev".to_string()
}

fn default_trigger_type() -> TriggerType {
    TriggerType::OnStart
}

fn default_job_template() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn default_enabled() -> bool {
    true
}

impl Default for SchedulerDraft {
    fn default() -> Self {
        Self {
            env_name: default_env_name(),
            name: String::new(),
            description: String::new(),
            trigger_type: default_trigger_type(),
            repeat_every_seconds: None,
            job_template: default_job_template(),
            enabled: default_enabled(),
        }
    }
}

impl SchedulerDraft {
    pub fn into_scheduler(self) -> JobScheduler {
        JobScheduler {
            id: SchedulerId::new(),
            env_name: self.env_name,
            name: self.name,
            description: self.description,
            trigger_type: self.trigger_type,
            repeat_every_seconds: self.repeat_every_seconds,
            job_template: self.job_template,
            enabled: self.enabled,
            last_run: None,
        }
    }
}

/// Partial update for a scheduler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulerPatch {
    pub env_name: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub trigger_type: Option<TriggerType>,
    pub repeat_every_seconds: Option<Option<u32>>,
    pub job_template: Option<serde_json::Value>,
    pub enabled: Option<bool>,
    pub last_run: Option<Option<i64>>,
}

impl SchedulerPatch {
    pub fn apply(&self, scheduler: &mut JobScheduler) {
        if let Some(v) = &self.env_name {
            scheduler.env_name = v.clone();
        }
        if let Some(v) = &self.name {
            scheduler.name = v.clone();
        }
        if let Some(v) = &self.description {
            scheduler.description = v.clone();
        }
        if let Some(v) = self.trigger_type {
            scheduler.trigger_type = v;
        }
        if let Some(v) = self.repeat_every_seconds {
            scheduler.repeat_every_seconds = v;
        }
        if let Some(v) = &self.job_template {
            scheduler.job_template = v.clone();
        }
        if let Some(v) = self.enabled {
            scheduler.enabled = v;
        }
        if let Some(v) = self.last_run {
            scheduler.last_run = v;
        }
    }
}

crate::builder! {
    pub struct SchedulerBuilder => JobScheduler {
        into {
            env_name: String = "dev",
            name: String = "test-scheduler",
            description: String = "",
        }
        set {
            id: SchedulerId = SchedulerId::new(),
            trigger_type: TriggerType = TriggerType::Repeat,
            job_template: serde_json::Value = serde_json::Value::Object(serde_json::Map::new()),
            enabled: bool = true,
        }
        option {
            repeat_every_seconds: u32 = None,
            last_run: i64 = None,
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
