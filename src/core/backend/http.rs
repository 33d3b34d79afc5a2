// src/core/backend/http.rs

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::AppConfig;
use crate::core::backend::{ScanBackend, StopOutcome};
use crate::core::error::{ScanError, ScanOutcome};
use crate::core::models::{ReportFormat, ScanRequest, ScanResult, ScanTask};
use crate::core::report::ReportArtifact;

const USER_AGENT: &str = concat!("VulnScout/", env!("CARGO_PKG_VERSION"));

/// Which call produced a response; the same status code means different
/// things on different endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Submit,
    List,
    Get,
    Stop,
    Result,
    Report,
}

/// `ScanBackend` over the service's REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(config: &AppConfig) -> ScanOutcome<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                error!(error = %e, "Failed to build HTTP client.");
                ScanError::Transport(format!("failed to build HTTP client: {e}"))
            })?;
        info!(base = %config.api_url, "HTTP backend ready.");
        Ok(Self { client, base: config.api_url.clone() })
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> ScanOutcome<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ScanError::Validation(format!("{} cannot be used as a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, endpoint: Endpoint, id: &str, request: reqwest::RequestBuilder) -> ScanOutcome<Response> {
        let response = request.send().await.map_err(|e| {
            warn!(?endpoint, id, error = %e, "Request to backend failed.");
            ScanError::from(e)
        })?;
        let status = response.status();
        debug!(?endpoint, id, %status, "Backend responded.");
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = classify_status(endpoint, status, id, &body);
        warn!(?endpoint, id, %status, error = %err, "Backend rejected request.");
        Err(err)
    }

    async fn json<T: DeserializeOwned>(endpoint: Endpoint, id: &str, response: Response) -> ScanOutcome<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(?endpoint, id, error = %e, "Backend payload failed to decode.");
            ScanError::from(e)
        })
    }
}

impl ScanBackend for HttpBackend {
    async fn create_scan(&self, request: &ScanRequest) -> ScanOutcome<ScanTask> {
        let url = self.endpoint(&["scans"])?;
        info!(scan_target = %request.target, mode = %request.mode, intensity = %request.intensity, "Submitting scan.");
        let response = self.send(Endpoint::Submit, "", self.client.post(url).json(request)).await?;
        Self::json(Endpoint::Submit, "", response).await
    }

    async fn list_scans(&self) -> ScanOutcome<Vec<ScanTask>> {
        let url = self.endpoint(&["scans"])?;
        let response = self.send(Endpoint::List, "", self.client.get(url)).await?;
        Self::json(Endpoint::List, "", response).await
    }

    async fn get_scan(&self, id: &str) -> ScanOutcome<ScanTask> {
        let url = self.endpoint(&["scans", id])?;
        let response = self.send(Endpoint::Get, id, self.client.get(url)).await?;
        Self::json(Endpoint::Get, id, response).await
    }

    async fn stop_scan(&self, id: &str) -> ScanOutcome<StopOutcome> {
        let url = self.endpoint(&["scans", id, "stop"])?;
        match self.send(Endpoint::Stop, id, self.client.post(url)).await {
            Ok(_) => Ok(StopOutcome::Stopped),
            Err(ScanError::NotReady(_)) => Ok(StopOutcome::AlreadyFinished),
            Err(e) => Err(e),
        }
    }

    async fn get_result(&self, task_id: &str) -> ScanOutcome<ScanResult> {
        let url = self.endpoint(&["results", task_id])?;
        let response = self.send(Endpoint::Result, task_id, self.client.get(url)).await?;
        Self::json(Endpoint::Result, task_id, response).await
    }

    async fn get_report(&self, task_id: &str, format: ReportFormat) -> ScanOutcome<ReportArtifact> {
        let mut url = self.endpoint(&["reports", task_id])?;
        url.query_pairs_mut().append_pair("format", format.as_ref());
        info!(task_id, %format, "Requesting report.");
        let response = self.send(Endpoint::Report, task_id, self.client.get(url)).await?;

        let content_type = header_string(&response, CONTENT_TYPE.as_str());
        let disposition = header_string(&response, CONTENT_DISPOSITION.as_str());
        let body = response.bytes().await?.to_vec();
        ReportArtifact::from_response_parts(task_id, format, content_type.as_deref(), disposition.as_deref(), body)
    }
}

fn header_string(response: &Response, name: &str) -> Option<String> {
    response.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

/// Maps a non-success status to the error kind the rest of the client reasons about.
///
/// A conflict on `Stop` comes back as `NotReady`; `stop_scan` turns it into
/// `StopOutcome::AlreadyFinished`.
pub fn classify_status(endpoint: Endpoint, status: StatusCode, id: &str, body: &str) -> ScanError {
    let detail = error_detail(body);
    let says_not_ready = {
        let lower = detail.to_ascii_lowercase();
        ["not completed", "not ready", "not running", "already"]
            .iter()
            .any(|phrase| lower.contains(phrase))
    };

    match (endpoint, status) {
        (Endpoint::List | Endpoint::Submit, StatusCode::NOT_FOUND) => {
            ScanError::Transport(format!("endpoint not found ({status}); check the backend URL"))
        }
        (_, StatusCode::NOT_FOUND) => ScanError::NotFound(id.to_string()),

        (Endpoint::Result | Endpoint::Report | Endpoint::Stop, StatusCode::CONFLICT | StatusCode::GONE) => {
            ScanError::NotReady(id.to_string())
        }
        (Endpoint::Result | Endpoint::Report | Endpoint::Stop, StatusCode::BAD_REQUEST) if says_not_ready => {
            ScanError::NotReady(id.to_string())
        }
        // 425 Too Early
        (Endpoint::Result | Endpoint::Report, s) if s.as_u16() == 425 => ScanError::NotReady(id.to_string()),

        (_, StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY | StatusCode::CONFLICT) => {
            ScanError::Validation(detail)
        }

        (Endpoint::Report, s) if s.is_server_error() => ScanError::Render(detail),
        (_, s) if s.is_server_error() => ScanError::Transport(format!("{status}: {detail}")),

        _ => ScanError::Transport(format!("unexpected status {status}: {detail}")),
    }
}

/// Pulls a human-readable message out of an error body.
///
/// Understands `{"detail": ...}` and `{"message": ...}` bodies and falls back
/// to the raw text.
pub fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no details".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}
