// src/core/models.rs

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::core::error::ScanError;

// --- Scan Parameters ---

// Scan depth: how much internal knowledge the scanner is given about the target.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScanMode {
    #[default]
    Black,
    Gray,
    White,
}

impl ScanMode {
    pub fn label(&self) -> &'static str {
        match self {
            ScanMode::Black => "Black box",
            ScanMode::Gray => "Gray box",
            ScanMode::White => "White box",
        }
    }
}

// How aggressive the scan is allowed to be.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Intensity {
    Low,
    #[default]
    Medium,
    High,
}

/// Returns the variant after `current`, wrapping around at the end.
pub fn cycle_next<T: IntoEnumIterator + PartialEq + Copy>(current: T) -> T {
    let all: Vec<T> = T::iter().collect();
    let pos = all.iter().position(|v| *v == current).unwrap_or(0);
    all[(pos + 1) % all.len()]
}

/// Returns the variant before `current`, wrapping around at the start.
pub fn cycle_prev<T: IntoEnumIterator + PartialEq + Copy>(current: T) -> T {
    let all: Vec<T> = T::iter().collect();
    let pos = all.iter().position(|v| *v == current).unwrap_or(0);
    all[(pos + all.len() - 1) % all.len()]
}

// The body of `POST /scans`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanRequest {
    pub target: String,
    pub mode: ScanMode,
    pub intensity: Intensity,
}

impl ScanRequest {
    /// Builds a request, rejecting an empty target before anything hits the network.
    ///
    /// Only the cheap check lives here; whether the target resolves is the
    /// backend's call.
    pub fn new(target: &str, mode: ScanMode, intensity: Intensity) -> Result<Self, ScanError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(ScanError::Validation("scan target must not be empty".to_string()));
        }
        Ok(Self { target: target.to_string(), mode, intensity })
    }
}

// --- Task Lifecycle ---

/// A completion percentage that is always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Progress(u8);

impl Progress {
    pub const ZERO: Progress = Progress(0);
    pub const FULL: Progress = Progress(100);

    pub fn new(value: u8) -> Option<Self> {
        (value <= 100).then_some(Progress(value))
    }

    /// Converts the numeric progress the backend sends (it may be fractional).
    pub fn from_wire(value: f64) -> Result<Self, String> {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(format!("progress {value} is outside 0..=100"));
        }
        Ok(Progress(value.round() as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// The four status names as they appear on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatusKind {
    Pending,
    Running,
    Completed,
    Error,
}

/// Backend-owned task status.
///
/// Progress is folded into the variants so a completed task at 40% or a
/// pending task at 10% cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running { progress: Progress },
    Completed,
    Error { at_progress: Progress },
}

impl TaskStatus {
    pub fn kind(&self) -> StatusKind {
        match self {
            TaskStatus::Pending => StatusKind::Pending,
            TaskStatus::Running { .. } => StatusKind::Running,
            TaskStatus::Completed => StatusKind::Completed,
            TaskStatus::Error { .. } => StatusKind::Error,
        }
    }

    pub fn progress(&self) -> Progress {
        match self {
            TaskStatus::Pending => Progress::ZERO,
            TaskStatus::Running { progress } => *progress,
            TaskStatus::Completed => Progress::FULL,
            TaskStatus::Error { at_progress } => *at_progress,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Error { .. })
    }

    /// Whether the backend may move a task directly from `self` to `next`.
    pub fn can_transition_to(&self, next: &TaskStatus) -> bool {
        use StatusKind::*;
        matches!(
            (self.kind(), next.kind()),
            (Pending, Pending)
                | (Pending, Running)
                | (Running, Running)
                | (Running, Completed)
                | (Running, Error)
                | (Completed, Completed)
                | (Error, Error)
        )
    }

    /// Whether `next` can be observed after `self` when intermediate states
    /// may have been missed between two polls.
    pub fn can_reach(&self, next: &TaskStatus) -> bool {
        // A pending task may finish between two polls without ever being seen running.
        self.can_transition_to(next) || (self.kind() == StatusKind::Pending && next.is_terminal())
    }

    // The pending and completed checks run on the raw value: rounding 99.5 up
    // must not turn a bad payload into a valid one.
    fn from_wire(kind: StatusKind, raw_progress: f64) -> Result<Self, String> {
        let progress = Progress::from_wire(raw_progress)?;
        match kind {
            StatusKind::Pending if raw_progress != 0.0 => {
                Err(format!("pending task reports progress {raw_progress}"))
            }
            StatusKind::Pending => Ok(TaskStatus::Pending),
            StatusKind::Running => Ok(TaskStatus::Running { progress }),
            StatusKind::Completed if raw_progress != 100.0 => {
                Err(format!("completed task reports progress {raw_progress}"))
            }
            StatusKind::Completed => Ok(TaskStatus::Completed),
            StatusKind::Error => Ok(TaskStatus::Error { at_progress: progress }),
        }
    }
}

// --- Scan Task ---

/// One requested scan, as last reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TaskWire", into = "TaskWire")]
pub struct ScanTask {
    pub id: String,
    pub target: String,
    pub mode: ScanMode,
    pub intensity: Intensity,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ScanTask {
    pub fn progress(&self) -> Progress {
        self.status.progress()
    }

    pub fn is_running(&self) -> bool {
        self.status.kind() == StatusKind::Running
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

// The JSON shape of a task: status and progress as two loose fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskWire {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    target: String,
    mode: ScanMode,
    intensity: Intensity,
    status: StatusKind,
    #[serde(default)]
    progress: f64,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<TaskWire> for ScanTask {
    type Error = String;

    fn try_from(wire: TaskWire) -> Result<Self, Self::Error> {
        if wire.target.trim().is_empty() {
            return Err(format!("task {} has an empty target", wire.id));
        }
        let status = TaskStatus::from_wire(wire.status, wire.progress)
            .map_err(|e| format!("task {}: {e}", wire.id))?;
        if wire.completed_at.is_some() && !status.is_terminal() {
            return Err(format!("task {} has completedAt but is still {}", wire.id, wire.status));
        }
        Ok(ScanTask {
            id: wire.id,
            target: wire.target,
            mode: wire.mode,
            intensity: wire.intensity,
            status,
            created_at: wire.created_at,
            completed_at: wire.completed_at,
        })
    }
}

impl From<ScanTask> for TaskWire {
    fn from(task: ScanTask) -> Self {
        TaskWire {
            progress: f64::from(task.progress().get()),
            status: task.status.kind(),
            id: task.id,
            target: task.target,
            mode: task.mode,
            intensity: task.intensity,
            created_at: task.created_at,
            completed_at: task.completed_at,
        }
    }
}

// Ids are opaque strings to us, but some backends send them as integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

// --- Scan Result ---

// Qualitative rank of a finding. Declared low-to-high so `Ord` puts Critical on top.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub ip: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
}

impl Host {
    pub fn os_or_unknown(&self) -> &str {
        self.os.as_deref().filter(|s| !s.is_empty()).unwrap_or("unknown")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub number: u16,
    pub protocol: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub state: String,
}

impl Port {
    // TCP and UDP on the same number are two different ports.
    fn key(&self) -> (u16, String) {
        (self.number, self.protocol.to_ascii_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub severity: Severity,
    pub cvss_score: f64,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub proof: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// Findings of one completed task. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    #[serde(deserialize_with = "deserialize_id")]
    pub task_id: String,
    #[serde(default)]
    pub hosts: Vec<Host>,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
}

impl ScanResult {
    /// Checks the referential and uniqueness rules of a result.
    ///
    /// Returns the first violation found as a `Protocol` error.
    pub fn validate(&self) -> Result<(), ScanError> {
        let violation = |msg: String| Err(ScanError::Protocol(format!("result for task {}: {msg}", self.task_id)));

        let mut ips = HashSet::new();
        for host in &self.hosts {
            if host.ip.trim().is_empty() {
                return violation("host with empty ip".to_string());
            }
            if !ips.insert(host.ip.as_str()) {
                return violation(format!("duplicate host {}", host.ip));
            }
        }

        let mut port_keys = HashSet::new();
        for port in &self.ports {
            if port.number == 0 {
                return violation("port number 0 is out of range".to_string());
            }
            if !port_keys.insert(port.key()) {
                return violation(format!("duplicate port {}/{}", port.number, port.protocol));
            }
        }

        let mut vuln_ids = HashSet::new();
        for vuln in &self.vulnerabilities {
            if !vuln_ids.insert(vuln.id.as_str()) {
                return violation(format!("duplicate vulnerability id {}", vuln.id));
            }
            if !vuln.cvss_score.is_finite() || !(0.0..=10.0).contains(&vuln.cvss_score) {
                return violation(format!("vulnerability {} has CVSS {}", vuln.id, vuln.cvss_score));
            }
            if let Some(ip) = &vuln.host {
                if !ips.contains(ip.as_str()) {
                    return violation(format!("vulnerability {} references unknown host {ip}", vuln.id));
                }
            }
            if let Some(number) = vuln.port {
                if !self.ports.iter().any(|p| p.number == number) {
                    return violation(format!("vulnerability {} references unknown port {number}", vuln.id));
                }
            }
        }

        Ok(())
    }

    pub fn host(&self, ip: &str) -> Option<&Host> {
        self.hosts.iter().find(|h| h.ip == ip)
    }
}

// --- Reports ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReportFormat {
    Pdf,
    Html,
}

impl ReportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "application/pdf",
            ReportFormat::Html => "text/html",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Html => "html",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task_json(status: &str, progress: f64) -> serde_json::Value {
        json!({
            "id": "1",
            "target": "example.com",
            "mode": "black",
            "intensity": "medium",
            "status": status,
            "progress": progress,
            "createdAt": "2024-01-15T10:00:00Z"
        })
    }

    fn decode(value: serde_json::Value) -> Result<ScanTask, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn decodes_every_legal_status() {
        assert_eq!(decode(task_json("pending", 0.0)).unwrap().status, TaskStatus::Pending);
        assert_eq!(
            decode(task_json("running", 45.0)).unwrap().status,
            TaskStatus::Running { progress: Progress::new(45).unwrap() }
        );
        assert_eq!(decode(task_json("completed", 100.0)).unwrap().status, TaskStatus::Completed);
        assert_eq!(
            decode(task_json("error", 30.0)).unwrap().status,
            TaskStatus::Error { at_progress: Progress::new(30).unwrap() }
        );
    }

    #[test]
    fn completed_implies_full_progress() {
        assert!(decode(task_json("completed", 99.0)).is_err());
        assert!(decode(task_json("completed", 99.5)).is_err());
        let task = decode(task_json("completed", 100.0)).unwrap();
        assert_eq!(task.progress(), Progress::FULL);
    }

    #[test]
    fn pending_must_be_at_zero() {
        assert!(decode(task_json("pending", 10.0)).is_err());
        assert!(decode(task_json("pending", 0.4)).is_err());
        assert_eq!(decode(task_json("pending", 0.0)).unwrap().status, TaskStatus::Pending);
    }

    #[test]
    fn error_keeps_progress_at_abort() {
        let task = decode(task_json("error", 62.4)).unwrap();
        assert_eq!(task.progress().get(), 62);
    }

    #[test]
    fn progress_out_of_range_is_rejected() {
        assert!(decode(task_json("running", 101.0)).is_err());
        assert!(decode(task_json("running", -1.0)).is_err());
    }

    #[test]
    fn completed_at_only_on_terminal_tasks() {
        let mut value = task_json("running", 10.0);
        value["completedAt"] = json!("2024-01-15T11:00:00Z");
        assert!(decode(value).is_err());

        let mut value = task_json("error", 10.0);
        value["completedAt"] = json!("2024-01-15T11:00:00Z");
        assert!(decode(value).unwrap().completed_at.is_some());
    }

    #[test]
    fn numeric_ids_become_strings() {
        let mut value = task_json("pending", 0.0);
        value["id"] = json!(42);
        assert_eq!(decode(value).unwrap().id, "42");
    }

    #[test]
    fn task_serializes_back_to_wire_shape() {
        let task = decode(task_json("running", 45.0)).unwrap();
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["status"], "running");
        assert_eq!(value["progress"], 45.0);
        assert_eq!(value["createdAt"], "2024-01-15T10:00:00Z");
        assert!(value.get("completedAt").is_none());
    }

    #[test]
    fn transition_table() {
        let running = TaskStatus::Running { progress: Progress::new(50).unwrap() };
        let error = TaskStatus::Error { at_progress: Progress::new(50).unwrap() };

        assert!(TaskStatus::Pending.can_transition_to(&running));
        assert!(!TaskStatus::Pending.can_transition_to(&TaskStatus::Completed));
        assert!(running.can_transition_to(&TaskStatus::Completed));
        assert!(running.can_transition_to(&error));
        assert!(!running.can_transition_to(&TaskStatus::Pending));
        assert!(!TaskStatus::Completed.can_transition_to(&running));
        assert!(!error.can_transition_to(&TaskStatus::Completed));
    }

    #[test]
    fn polls_may_skip_running() {
        assert!(TaskStatus::Pending.can_reach(&TaskStatus::Completed));
        assert!(!TaskStatus::Completed.can_reach(&TaskStatus::Pending));
    }

    #[test]
    fn request_rejects_blank_target() {
        let err = ScanRequest::new("   ", ScanMode::Black, Intensity::Medium).unwrap_err();
        assert!(matches!(err, ScanError::Validation(_)));

        let req = ScanRequest::new(" example.com ", ScanMode::Black, Intensity::Medium).unwrap();
        assert_eq!(req.target, "example.com");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"target": "example.com", "mode": "black", "intensity": "medium"})
        );
    }

    #[test]
    fn enums_cycle_with_wraparound() {
        assert_eq!(cycle_next(ScanMode::Black), ScanMode::Gray);
        assert_eq!(cycle_next(ScanMode::White), ScanMode::Black);
        assert_eq!(cycle_prev(Intensity::Low), Intensity::High);
    }

    #[test]
    fn severity_orders_critical_highest() {
        let mut all = vec![Severity::Medium, Severity::Critical, Severity::Low, Severity::High];
        all.sort();
        assert_eq!(all, vec![Severity::Low, Severity::Medium, Severity::High, Severity::Critical]);
    }

    fn sample_result() -> ScanResult {
        serde_json::from_value(json!({
            "taskId": 2,
            "hosts": [{"ip": "192.168.1.1", "hostname": "router"}, {"ip": "192.168.1.10"}],
            "ports": [
                {"number": 53, "protocol": "tcp", "service": "dns", "state": "open"},
                {"number": 53, "protocol": "udp", "service": "dns", "state": "open"}
            ],
            "vulnerabilities": [{
                "id": "v1",
                "title": "Open resolver",
                "severity": "high",
                "cvssScore": 7.5,
                "host": "192.168.1.1",
                "port": 53
            }]
        }))
        .unwrap()
    }

    #[test]
    fn valid_result_passes() {
        let result = sample_result();
        assert_eq!(result.task_id, "2");
        assert!(result.validate().is_ok());
        assert_eq!(result.hosts[1].os_or_unknown(), "unknown");
    }

    #[test]
    fn same_port_number_different_protocol_is_allowed_but_duplicates_are_not() {
        let mut result = sample_result();
        result.ports.push(Port {
            number: 53,
            protocol: "TCP".into(),
            service: "dns".into(),
            state: "open".into(),
        });
        assert!(matches!(result.validate(), Err(ScanError::Protocol(_))));
    }

    #[test]
    fn vulnerability_must_reference_known_host() {
        let mut result = sample_result();
        result.vulnerabilities[0].host = Some("10.0.0.1".into());
        assert!(matches!(result.validate(), Err(ScanError::Protocol(_))));
    }

    #[test]
    fn vulnerability_must_reference_known_port() {
        let mut result = sample_result();
        result.vulnerabilities[0].port = Some(8080);
        assert!(result.validate().is_err());
    }

    #[test]
    fn duplicate_hosts_and_bad_cvss_are_rejected() {
        let mut result = sample_result();
        result.hosts.push(Host { ip: "192.168.1.1".into(), hostname: None, os: None });
        assert!(result.validate().is_err());

        let mut result = sample_result();
        result.vulnerabilities[0].cvss_score = 11.0;
        assert!(result.validate().is_err());
    }

    #[test]
    fn port_numbers_above_range_fail_to_decode() {
        let value = json!({"number": 70000, "protocol": "tcp"});
        assert!(serde_json::from_value::<Port>(value).is_err());
    }

    #[test]
    fn report_format_metadata() {
        assert_eq!(ReportFormat::Pdf.content_type(), "application/pdf");
        assert_eq!(ReportFormat::Html.extension(), "html");
        assert_eq!("pdf".parse::<ReportFormat>().unwrap(), ReportFormat::Pdf);
    }
}
