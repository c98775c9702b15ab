// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! API POST execution: `meta` posted as the JSON body to the job's URL.

use crate::error::EngineError;
use crate::job_log::JobLog;
use gf_core::Job;

pub(crate) async fn run(
    http: &reqwest::Client,
    job: &Job,
    log: &JobLog,
) -> Result<(), EngineError> {
    log.line(&format!("POST {}", job.command));

    let response = http
        .post(job.command.as_str())
        .json(&serde_json::Value::Object(job.meta.clone()))
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    log.line(&format!("status: {status}"));
    if !body.is_empty() {
        log.block(&body);
    }

    if !status.is_success() {
        return Err(EngineError::HttpStatus { status: status.as_u16() });
    }
    tracing::info!(job_id = %job.id.short(), status = %status, "api_post job succeeded");
    Ok(())
}
