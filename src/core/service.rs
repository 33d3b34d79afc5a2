// src/core/service.rs

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::backend::{ScanBackend, StopOutcome};
use crate::core::error::{ScanError, ScanOutcome};
use crate::core::models::{Intensity, ReportFormat, ScanMode, ScanRequest, ScanResult, ScanTask, TaskStatus};
use crate::core::report::ReportArtifact;

/// The client's side of the scan-service contract.
///
/// Wraps a backend with the rules the raw HTTP calls do not know about:
/// which calls may be retried, when a stop is a no-op, and when a result can
/// be trusted.
pub struct ScanService<B> {
    backend: Arc<B>,
}

impl<B> Clone for ScanService<B> {
    fn clone(&self) -> Self {
        Self { backend: Arc::clone(&self.backend) }
    }
}

impl<B: ScanBackend> ScanService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend: Arc::new(backend) }
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Validates and submits a new scan. Never retried.
    pub async fn submit(&self, target: &str, mode: ScanMode, intensity: Intensity) -> ScanOutcome<ScanTask> {
        let request = ScanRequest::new(target, mode, intensity)?;
        let task = self.backend.create_scan(&request).await.map_err(|e| {
            warn!(scan_target = %request.target, error = %e, "Scan submission failed.");
            e
        })?;
        if task.status != TaskStatus::Pending {
            return Err(ScanError::Protocol(format!(
                "new task {} reported as {} instead of pending",
                task.id,
                task.status.kind()
            )));
        }
        info!(task_id = %task.id, scan_target = %task.target, "Scan submitted.");
        Ok(task)
    }

    /// Full snapshot of every task. Retried once on transport failure.
    pub async fn list_tasks(&self) -> ScanOutcome<Vec<ScanTask>> {
        retry_read("list_tasks", move || self.backend.list_scans()).await
    }

    /// Current state of one task. Retried once on transport failure.
    pub async fn get_task(&self, id: &str) -> ScanOutcome<ScanTask> {
        retry_read("get_task", move || self.backend.get_scan(id)).await
    }

    /// Asks the backend to stop a task.
    ///
    /// Stopping a task that is already finished is not an error, so a double
    /// press on the stop key is harmless. `known` is the task as the registry
    /// last saw it; a terminal task is not even sent to the backend. Failures
    /// that are not no-ops (unknown id, backend down) are returned as errors.
    pub async fn stop_task(&self, id: &str, known: Option<&ScanTask>) -> ScanOutcome<StopOutcome> {
        if known.is_some_and(|t| t.status.is_terminal()) {
            debug!(task_id = id, "Task already terminal, skipping stop request.");
            return Ok(StopOutcome::AlreadyFinished);
        }
        let outcome = self.backend.stop_scan(id).await.map_err(|e| {
            warn!(task_id = id, error = %e, "Stop request failed.");
            e
        })?;
        info!(task_id = id, ?outcome, "Stop request handled.");
        Ok(outcome)
    }

    /// Fetches the result of a completed task.
    ///
    /// The task is read first: anything but `completed` fails with `NotReady`
    /// and the result endpoint is never called. A completed task whose result
    /// is missing is treated as a transient failure, never as an empty result.
    pub async fn fetch_result(&self, task_id: &str) -> ScanOutcome<ScanResult> {
        let task = self.get_task(task_id).await?;
        if !task.is_completed() {
            debug!(task_id, status = %task.status.kind(), "Result requested before completion.");
            return Err(ScanError::NotReady(task_id.to_string()));
        }

        let result = retry_read("fetch_result", move || async move {
            self.backend.get_result(task_id).await.map_err(|e| match e {
                // The task is completed, so the result must exist: a miss is the
                // result store lagging behind, not an empty scan.
                ScanError::NotFound(_) | ScanError::NotReady(_) => {
                    ScanError::Transport(format!("result for completed task {task_id} is not available yet"))
                }
                other => other,
            })
        })
        .await?;

        if result.task_id != task_id {
            return Err(ScanError::Protocol(format!(
                "asked for the result of task {task_id} but got task {}",
                result.task_id
            )));
        }
        result.validate()?;
        info!(
            task_id,
            hosts = result.hosts.len(),
            ports = result.ports.len(),
            vulnerabilities = result.vulnerabilities.len(),
            "Scan result fetched."
        );
        Ok(result)
    }

    /// Requests a rendered report. Never retried automatically; report
    /// generation is expensive and the user decides when to try again.
    pub async fn export_report(&self, task_id: &str, format: ReportFormat) -> ScanOutcome<ReportArtifact> {
        let artifact = self.backend.get_report(task_id, format).await.map_err(|e| {
            warn!(task_id, %format, error = %e, "Report export failed.");
            e
        })?;
        info!(task_id, %format, bytes = artifact.len(), "Report received.");
        Ok(artifact)
    }
}

/// Runs an idempotent read, retrying exactly once if it fails in transport.
async fn retry_read<T, F, Fut>(operation: &'static str, mut call: F) -> ScanOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ScanOutcome<T>>,
{
    match call().await {
        Err(e) if e.is_retryable() => {
            warn!(operation, error = %e, "Transient failure on read, retrying once.");
            call().await
        }
        other => other,
    }
}
