// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Script execution: resolve the registry key, validate input, run on the
//! blocking pool, and append the structured output to the job log.

use crate::error::EngineError;
use crate::job_log::JobLog;
use gf_core::{Job, ScriptRegistry};
use std::sync::Arc;

pub(crate) async fn run(
    scripts: &Arc<ScriptRegistry>,
    job: &Job,
    log: &JobLog,
) -> Result<(), EngineError> {
    let script = scripts
        .get(&job.command)
        .ok_or_else(|| EngineError::UnknownScript(job.command.clone()))?;

    log.line(&format!("job_id: {}", job.id));
    log.line(&format!("script: {}", job.command));
    log.line("meta:");
    log.block(&serde_json::to_string_pretty(&job.meta).unwrap_or_default());
    log.line("----------------------------------------");

    let mut meta = job.meta.clone();
    meta.insert("job_id".to_string(), serde_json::Value::String(job.id.to_string()));

    if !script.validate_input(&meta) {
        return Err(EngineError::ScriptValidation(job.command.clone()));
    }

    // Scripts are synchronous and may block for a long time; keep them off
    // the worker's reactor.
    let output = tokio::task::spawn_blocking(move || script.run(&meta))
        .await
        .map_err(|e| EngineError::Script(format!("script task aborted: {e}")))?
        .map_err(|e| EngineError::Script(e.to_string()))?;

    log.line("output:");
    log.line(&format!("  success: {}", output.success));
    log.line(&format!("  message: {}", output.message));
    log.line("  data:");
    log.block(&serde_json::to_string_pretty(&output.data).unwrap_or_default());

    tracing::info!(
        job_id = %job.id.short(),
        script = %job.command,
        success = output.success,
        "script job completed"
    );
    Ok(())
}
