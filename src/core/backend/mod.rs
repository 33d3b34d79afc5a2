// src/core/backend/mod.rs

// The backend seam: everything the client can ask the scan service.
// `http` talks to the real service, `fake` is an in-memory stand-in for tests.
pub mod http;

#[cfg(test)]
pub mod fake;

use std::future::Future;

use crate::core::error::ScanOutcome;
use crate::core::models::{ReportFormat, ScanRequest, ScanResult, ScanTask};
use crate::core::report::ReportArtifact;

/// What a stop request achieved. Both variants count as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The backend accepted the stop and will move the task to `error`.
    Stopped,
    /// The task was already terminal; nothing to do.
    AlreadyFinished,
}

/// The six operations the scan service exposes.
///
/// Implementations perform exactly one request per call. Retrying is the
/// caller's business (see `ScanService`), because only the caller knows
/// whether an operation is safe to repeat.
pub trait ScanBackend: Send + Sync + 'static {
    /// `POST /scans`
    fn create_scan(&self, request: &ScanRequest) -> impl Future<Output = ScanOutcome<ScanTask>> + Send;

    /// `GET /scans`
    fn list_scans(&self) -> impl Future<Output = ScanOutcome<Vec<ScanTask>>> + Send;

    /// `GET /scans/{id}`
    fn get_scan(&self, id: &str) -> impl Future<Output = ScanOutcome<ScanTask>> + Send;

    /// `POST /scans/{id}/stop`
    fn stop_scan(&self, id: &str) -> impl Future<Output = ScanOutcome<StopOutcome>> + Send;

    /// `GET /results/{taskId}`
    fn get_result(&self, task_id: &str) -> impl Future<Output = ScanOutcome<ScanResult>> + Send;

    /// `GET /reports/{taskId}?format=pdf|html`
    fn get_report(
        &self,
        task_id: &str,
        format: ReportFormat,
    ) -> impl Future<Output = ScanOutcome<ReportArtifact>> + Send;
}
