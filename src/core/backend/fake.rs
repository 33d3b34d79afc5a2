// src/core/backend/fake.rs

// In-memory scan service used by the tests. It behaves like the real backend:
// ids are minted on submit, status only moves when a test drives it, and
// results/reports exist only for completed tasks.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::Utc;

use crate::core::backend::{ScanBackend, StopOutcome};
use crate::core::error::{ScanError, ScanOutcome};
use crate::core::models::{Progress, ReportFormat, ScanRequest, ScanResult, ScanTask, TaskStatus};
use crate::core::report::ReportArtifact;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Create,
    List,
    Get,
    Stop,
    Result,
    Report,
}

#[derive(Default)]
struct State {
    next_id: u32,
    tasks: Vec<ScanTask>,
    results: HashMap<String, ScanResult>,
    failures: VecDeque<(Op, ScanError)>,
    calls: HashMap<Op, usize>,
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call of `op` fail with `err`.
    pub fn fail_next(&self, op: Op, err: ScanError) {
        self.state.lock().unwrap().failures.push_back((op, err));
    }

    pub fn calls(&self, op: Op) -> usize {
        self.state.lock().unwrap().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn set_status(&self, id: &str, status: TaskStatus) {
        let mut state = self.state.lock().unwrap();
        if let Some(task) = state.tasks.iter_mut().find(|t| t.id == id) {
            task.status = status;
            if status.is_terminal() {
                task.completed_at = Some(Utc::now());
            }
        }
    }

    pub fn start(&self, id: &str, progress: u8) {
        self.set_status(id, TaskStatus::Running { progress: Progress::new(progress).unwrap() });
    }

    /// Finishes a task and stores its result, the way the backend does it: atomically.
    pub fn complete(&self, id: &str, result: ScanResult) {
        self.set_status(id, TaskStatus::Completed);
        self.state.lock().unwrap().results.insert(id.to_string(), result);
    }

    /// Marks a task completed without storing a result, to simulate a lagging result store.
    pub fn complete_without_result(&self, id: &str) {
        self.set_status(id, TaskStatus::Completed);
    }

    pub fn insert_result(&self, id: &str, result: ScanResult) {
        self.state.lock().unwrap().results.insert(id.to_string(), result);
    }

    fn enter(&self, op: Op) -> ScanOutcome<std::sync::MutexGuard<'_, State>> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(op).or_default() += 1;
        if let Some(pos) = state.failures.iter().position(|(o, _)| *o == op) {
            if let Some((_, err)) = state.failures.remove(pos) {
                return Err(err);
            }
        }
        Ok(state)
    }
}

impl ScanBackend for FakeBackend {
    async fn create_scan(&self, request: &ScanRequest) -> ScanOutcome<ScanTask> {
        let mut state = self.enter(Op::Create)?;
        state.next_id += 1;
        let task = ScanTask {
            id: state.next_id.to_string(),
            target: request.target.clone(),
            mode: request.mode,
            intensity: request.intensity,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn list_scans(&self) -> ScanOutcome<Vec<ScanTask>> {
        let state = self.enter(Op::List)?;
        Ok(state.tasks.clone())
    }

    async fn get_scan(&self, id: &str) -> ScanOutcome<ScanTask> {
        let state = self.enter(Op::Get)?;
        state.tasks.iter().find(|t| t.id == id).cloned().ok_or_else(|| ScanError::NotFound(id.to_string()))
    }

    async fn stop_scan(&self, id: &str) -> ScanOutcome<StopOutcome> {
        let mut state = self.enter(Op::Stop)?;
        let task = state.tasks.iter_mut().find(|t| t.id == id).ok_or_else(|| ScanError::NotFound(id.to_string()))?;
        match task.status {
            TaskStatus::Running { progress } => {
                task.status = TaskStatus::Error { at_progress: progress };
                task.completed_at = Some(Utc::now());
                Ok(StopOutcome::Stopped)
            }
            // This fake only stops running tasks; anything else answers as a no-op.
            _ => Ok(StopOutcome::AlreadyFinished),
        }
    }

    async fn get_result(&self, task_id: &str) -> ScanOutcome<ScanResult> {
        let state = self.enter(Op::Result)?;
        let task = state
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .ok_or_else(|| ScanError::NotFound(task_id.to_string()))?;
        if !task.is_completed() {
            return Err(ScanError::NotReady(task_id.to_string()));
        }
        state.results.get(task_id).cloned().ok_or_else(|| ScanError::NotFound(task_id.to_string()))
    }

    async fn get_report(&self, task_id: &str, format: ReportFormat) -> ScanOutcome<ReportArtifact> {
        let state = self.enter(Op::Report)?;
        let task = state
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .ok_or_else(|| ScanError::NotFound(task_id.to_string()))?;
        if !task.is_completed() {
            return Err(ScanError::NotReady(task_id.to_string()));
        }
        let body = match format {
            ReportFormat::Pdf => b"%PDF-1.7\n% fake report\n".to_vec(),
            ReportFormat::Html => format!(
                "<!DOCTYPE html><html><head><title>Security Report - Scan #{task_id}</title></head>\
                 <body><h1>VulnScout Security Assessment Report</h1><p>Target: {}</p></body></html>",
                task.target
            )
            .into_bytes(),
        };
        ReportArtifact::from_response_parts(task_id, format, Some(format.content_type()), None, body)
    }
}
