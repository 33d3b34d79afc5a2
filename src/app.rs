// src/app.rs

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::{ListState, ScrollbarState, TableState};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::backend::StopOutcome;
use crate::core::error::{ScanError, ScanOutcome};
use crate::core::models::{cycle_next, cycle_prev, Intensity, ReportFormat, ScanMode, ScanResult, ScanTask, Severity};
use crate::core::registry::TaskRegistry;
use crate::core::ticket::{RequestTicket, Slot, TicketDesk};

pub const SPINNER_CHARS: [char; 8] = ['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];

const LOG_TAIL_LINES: usize = 200;

// --- Views ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Tasks,
    Submit,
    Detail,
}

#[derive(Debug, Default)]
pub struct SubmitForm {
    pub input: String,
    pub mode: ScanMode,
    pub intensity: Intensity,
    pub submitting: bool,
}

#[derive(Debug)]
pub enum DetailState {
    Loading,
    Ready(ScanResult),
    /// The task exists but has not completed yet.
    NotReady(String),
    Failed(String),
}

#[derive(Debug)]
pub struct DetailView {
    pub task_id: String,
    pub state: DetailState,
    pub filter: Option<Severity>,
    pub list_state: ListState,
}

#[derive(Debug)]
pub struct ExportPopup {
    pub task_id: String,
    /// Format of the request in flight, if any.
    pub exporting: Option<ReportFormat>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

// --- Background work ---

/// Work the event loop has to spawn on behalf of the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Refresh { seq: u64 },
    Submit { target: String, mode: ScanMode, intensity: Intensity },
    Stop { ticket: RequestTicket, known: Option<ScanTask> },
    FetchResult { ticket: RequestTicket },
    Export { ticket: RequestTicket, format: ReportFormat },
}

/// A report that made it onto disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedReport {
    pub format: ReportFormat,
    pub path: PathBuf,
    pub title: Option<String>,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Backend(#[from] ScanError),
    #[error("could not write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Responses coming back from spawned requests.
#[derive(Debug)]
pub enum AppEvent {
    Refreshed { seq: u64, outcome: ScanOutcome<Vec<ScanTask>> },
    Submitted(ScanOutcome<ScanTask>),
    Stopped { ticket: RequestTicket, outcome: ScanOutcome<StopOutcome> },
    ResultFetched { ticket: RequestTicket, outcome: ScanOutcome<ScanResult> },
    Exported { ticket: RequestTicket, outcome: Result<ExportedReport, ExportError> },
}

// --- App ---

pub struct App {
    pub should_quit: bool,
    pub view: View,
    pub registry: TaskRegistry,
    pub tickets: TicketDesk,
    pub task_table_state: TableState,
    pub form: SubmitForm,
    pub detail: Option<DetailView>,
    pub export_popup: Option<ExportPopup>,
    pub status: Option<StatusMessage>,
    pub refreshing: bool,
    pub poll_interval: Duration,
    last_poll: Option<Instant>,
    pub spinner_frame: usize,
    pub show_logs: bool,
    pub log_content: Vec<String>,
    pub log_horizontal_scroll: usize,
    pub log_horizontal_scroll_state: ScrollbarState,
}

impl App {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            should_quit: false,
            view: View::Tasks,
            registry: TaskRegistry::new(),
            tickets: TicketDesk::new(),
            task_table_state: TableState::default(),
            form: SubmitForm::default(),
            detail: None,
            export_popup: None,
            status: None,
            refreshing: false,
            poll_interval,
            last_poll: None,
            spinner_frame: 0,
            show_logs: false,
            log_content: Vec::new(),
            log_horizontal_scroll: 0,
            log_horizontal_scroll_state: ScrollbarState::default(),
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn selected_task(&self) -> Option<&ScanTask> {
        self.task_table_state
            .selected()
            .and_then(|i| self.registry.tasks().get(i))
    }

    /// Advances animations and returns a refresh when the poll interval has elapsed.
    pub fn on_tick(&mut self, now: Instant) -> Option<Command> {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len();
        if self.show_logs {
            self.log_content = crate::logging::read_log_tail(LOG_TAIL_LINES);
        }
        let due = self
            .last_poll
            .is_none_or(|last| now.duration_since(last) >= self.poll_interval);
        if due && !self.refreshing {
            self.last_poll = Some(now);
            return Some(self.refresh());
        }
        None
    }

    fn refresh(&mut self) -> Command {
        self.refreshing = true;
        Command::Refresh { seq: self.tickets.next_seq() }
    }

    // --- Keys ---

    /// Routes a key press to the active view.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if self.export_popup.is_some() {
            return self.handle_export_key(key.code);
        }
        match self.view {
            View::Tasks => self.handle_tasks_key(key.code),
            View::Submit => self.handle_submit_key(key.code),
            View::Detail => self.handle_detail_key(key.code),
        }
    }

    fn handle_tasks_key(&mut self, code: KeyCode) -> Option<Command> {
        match code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Up => self.select_previous_task(),
            KeyCode::Down => self.select_next_task(),
            KeyCode::Char('n') => {
                self.form = SubmitForm::default();
                self.view = View::Submit;
            }
            KeyCode::Char('r') => return Some(self.refresh()),
            KeyCode::Char('s') => return self.stop_selected(),
            KeyCode::Char('e') => {
                if let Some(id) = self.selected_task().map(|t| t.id.clone()) {
                    self.export_popup = Some(ExportPopup { task_id: id, exporting: None });
                }
            }
            KeyCode::Char('l') => self.toggle_logs(),
            KeyCode::Left if self.show_logs => self.scroll_logs_left(),
            KeyCode::Right if self.show_logs => self.scroll_logs_right(),
            KeyCode::Enter => return self.open_detail(),
            _ => {}
        }
        None
    }

    fn handle_submit_key(&mut self, code: KeyCode) -> Option<Command> {
        if self.form.submitting {
            return None;
        }
        match code {
            KeyCode::Esc => self.view = View::Tasks,
            KeyCode::Tab => self.form.mode = cycle_next(self.form.mode),
            KeyCode::Right => self.form.intensity = cycle_next(self.form.intensity),
            KeyCode::Left | KeyCode::BackTab => self.form.intensity = cycle_prev(self.form.intensity),
            KeyCode::Backspace => {
                self.form.input.pop();
            }
            KeyCode::Char(c) => self.form.input.push(c),
            KeyCode::Enter => {
                if self.form.input.trim().is_empty() {
                    self.status = Some(StatusMessage::Error("Target must not be empty".into()));
                    return None;
                }
                self.form.submitting = true;
                return Some(Command::Submit {
                    target: self.form.input.clone(),
                    mode: self.form.mode,
                    intensity: self.form.intensity,
                });
            }
            _ => {}
        }
        None
    }

    fn handle_detail_key(&mut self, code: KeyCode) -> Option<Command> {
        match code {
            KeyCode::Esc => {
                self.tickets.cancel(Slot::Result);
                self.detail = None;
                self.view = View::Tasks;
            }
            KeyCode::Up => self.scroll_findings(-1),
            KeyCode::Down => self.scroll_findings(1),
            KeyCode::Char('f') => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.filter = next_filter(detail.filter);
                    detail.list_state.select(Some(0));
                }
            }
            KeyCode::Char('r') => {
                let id = self.detail.as_ref().map(|d| d.task_id.clone())?;
                return Some(self.fetch_result(id));
            }
            KeyCode::Char('e') => {
                if let Some(detail) = &self.detail {
                    self.export_popup = Some(ExportPopup { task_id: detail.task_id.clone(), exporting: None });
                }
            }
            KeyCode::Char('q') => self.quit(),
            _ => {}
        }
        None
    }

    fn handle_export_key(&mut self, code: KeyCode) -> Option<Command> {
        let popup = self.export_popup.as_mut()?;
        let format = match code {
            KeyCode::Esc => {
                self.tickets.cancel(Slot::Report);
                self.export_popup = None;
                return None;
            }
            KeyCode::Char('p') => ReportFormat::Pdf,
            KeyCode::Char('h') => ReportFormat::Html,
            _ => return None,
        };
        if popup.exporting.is_some() {
            return None;
        }
        popup.exporting = Some(format);
        let ticket = self.tickets.issue(Slot::Report, &popup.task_id);
        Some(Command::Export { ticket, format })
    }

    fn stop_selected(&mut self) -> Option<Command> {
        let task = self.selected_task()?.clone();
        if task.status.is_terminal() {
            self.status = Some(StatusMessage::Info(format!("Scan #{} has already finished", task.id)));
            return None;
        }
        let ticket = self.tickets.issue(Slot::Stop, &task.id);
        Some(Command::Stop { ticket, known: Some(task) })
    }

    fn open_detail(&mut self) -> Option<Command> {
        let id = self.selected_task()?.id.clone();
        self.view = View::Detail;
        Some(self.fetch_result(id))
    }

    fn fetch_result(&mut self, task_id: String) -> Command {
        let ticket = self.tickets.issue(Slot::Result, &task_id);
        self.detail = Some(DetailView {
            task_id,
            state: DetailState::Loading,
            filter: None,
            list_state: ListState::default(),
        });
        Command::FetchResult { ticket }
    }

    // --- Responses ---

    /// Applies a background response. Returns follow-up work, if any.
    pub fn apply(&mut self, event: AppEvent) -> Option<Command> {
        match event {
            AppEvent::Refreshed { seq, outcome } => {
                self.refreshing = false;
                match outcome {
                    Ok(tasks) => {
                        if self.registry.replace(seq, tasks) {
                            self.clamp_task_selection();
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Task refresh failed.");
                        self.status = Some(StatusMessage::Error(format!("Refresh failed: {e}")));
                    }
                }
                None
            }
            AppEvent::Submitted(outcome) => {
                self.form.submitting = false;
                match outcome {
                    Ok(task) => {
                        info!(task_id = %task.id, "Scan submitted.");
                        self.status = Some(StatusMessage::Info(format!("Scan #{} queued for {}", task.id, task.target)));
                        let id = task.id.clone();
                        // Any refresh still in flight was asked before this task existed.
                        let seq = self.tickets.next_seq();
                        self.registry.upsert(seq, task);
                        let index = self.registry.tasks().iter().position(|t| t.id == id);
                        self.task_table_state.select(index);
                        self.view = View::Tasks;
                    }
                    Err(e) => {
                        self.status = Some(StatusMessage::Error(format!("Submission failed: {e}")));
                    }
                }
                None
            }
            AppEvent::Stopped { ticket, outcome } => {
                let current = self.tickets.redeem(Slot::Stop, &ticket);
                match outcome {
                    Ok(StopOutcome::Stopped) if current => {
                        self.status = Some(StatusMessage::Info(format!("Scan #{} stopped", ticket.target)));
                    }
                    Ok(StopOutcome::AlreadyFinished) if current => {
                        self.status = Some(StatusMessage::Info(format!("Scan #{} has already finished", ticket.target)));
                    }
                    Err(e) if current => {
                        self.status = Some(StatusMessage::Error(format!("Could not stop scan #{}: {e}", ticket.target)));
                    }
                    _ => debug!(task_id = %ticket.target, "Ignoring stale stop response."),
                }
                Some(self.refresh())
            }
            AppEvent::ResultFetched { ticket, outcome } => {
                if !self.tickets.redeem(Slot::Result, &ticket) {
                    debug!(task_id = %ticket.target, seq = ticket.seq, "Dropping stale result.");
                    return None;
                }
                let Some(detail) = self.detail.as_mut().filter(|d| d.task_id == ticket.target) else {
                    return None;
                };
                detail.state = match outcome {
                    Ok(result) => {
                        detail.list_state.select(Some(0));
                        DetailState::Ready(result)
                    }
                    Err(ScanError::NotReady(_)) => {
                        DetailState::NotReady(format!("Scan #{} has not completed yet. Press r to check again.", ticket.target))
                    }
                    Err(e) => DetailState::Failed(e.to_string()),
                };
                None
            }
            AppEvent::Exported { ticket, outcome } => {
                if !self.tickets.redeem(Slot::Report, &ticket) {
                    debug!(task_id = %ticket.target, "Dropping stale report.");
                    return None;
                }
                self.export_popup = None;
                self.status = Some(match outcome {
                    Ok(report) => match report.title {
                        Some(title) => StatusMessage::Info(format!("Saved \"{title}\" to {}", report.path.display())),
                        None => StatusMessage::Info(format!(
                            "Saved {} report to {}",
                            report.format.extension().to_uppercase(),
                            report.path.display()
                        )),
                    },
                    Err(ExportError::Backend(ScanError::NotReady(_))) => StatusMessage::Error(format!(
                        "Scan #{} has no results yet, nothing to export",
                        ticket.target
                    )),
                    Err(e) => StatusMessage::Error(format!("Export failed: {e}")),
                });
                None
            }
        }
    }

    // --- Navigation ---

    fn select_next_task(&mut self) {
        if self.registry.is_empty() {
            return;
        }
        let next = match self.task_table_state.selected() {
            Some(i) if i + 1 < self.registry.len() => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.task_table_state.select(Some(next));
    }

    fn select_previous_task(&mut self) {
        if self.registry.is_empty() {
            return;
        }
        let prev = self.task_table_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.task_table_state.select(Some(prev));
    }

    fn clamp_task_selection(&mut self) {
        let len = self.registry.len();
        let selected = match self.task_table_state.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => Some(0),
        };
        self.task_table_state.select(selected);
    }

    fn scroll_findings(&mut self, delta: isize) {
        let Some(detail) = self.detail.as_mut() else { return };
        let DetailState::Ready(result) = &detail.state else { return };
        let count = crate::core::analysis::sorted_vulnerabilities(result, detail.filter).len();
        if count == 0 {
            return;
        }
        let current = detail.list_state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(count - 1);
        detail.list_state.select(Some(next));
    }

    fn toggle_logs(&mut self) {
        self.show_logs = !self.show_logs;
        if self.show_logs {
            self.log_content = crate::logging::read_log_tail(LOG_TAIL_LINES);
        }
    }

    fn scroll_logs_left(&mut self) {
        self.log_horizontal_scroll = self.log_horizontal_scroll.saturating_sub(4);
        self.log_horizontal_scroll_state = self.log_horizontal_scroll_state.position(self.log_horizontal_scroll);
    }

    fn scroll_logs_right(&mut self) {
        self.log_horizontal_scroll = self.log_horizontal_scroll.saturating_add(4);
        self.log_horizontal_scroll_state = self.log_horizontal_scroll_state.position(self.log_horizontal_scroll);
    }
}

/// All, then each severity from most to least severe, then back to all.
fn next_filter(current: Option<Severity>) -> Option<Severity> {
    match current {
        None => Some(Severity::Critical),
        Some(Severity::Critical) => Some(Severity::High),
        Some(Severity::High) => Some(Severity::Medium),
        Some(Severity::Medium) => Some(Severity::Low),
        Some(Severity::Low) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Progress, TaskStatus};
    use chrono::Utc;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn task(id: &str, status: TaskStatus) -> ScanTask {
        ScanTask {
            id: id.into(),
            target: "example.com".into(),
            mode: ScanMode::Black,
            intensity: Intensity::Medium,
            completed_at: status.is_terminal().then(Utc::now),
            status,
            created_at: Utc::now(),
        }
    }

    fn app_with(tasks: Vec<ScanTask>) -> App {
        let mut app = App::new(Duration::from_secs(5));
        let seq = app.tickets.next_seq();
        app.apply(AppEvent::Refreshed { seq, outcome: Ok(tasks) });
        app
    }

    fn empty_result(id: &str) -> ScanResult {
        ScanResult { task_id: id.into(), hosts: vec![], ports: vec![], vulnerabilities: vec![] }
    }

    #[test]
    fn first_tick_polls_then_waits_for_interval() {
        let mut app = App::new(Duration::from_secs(5));
        let start = Instant::now();
        assert!(matches!(app.on_tick(start), Some(Command::Refresh { .. })));
        // In flight: no second refresh even when due.
        assert_eq!(app.on_tick(start + Duration::from_secs(6)), None);

        app.apply(AppEvent::Refreshed { seq: 1, outcome: Ok(vec![]) });
        assert_eq!(app.on_tick(start + Duration::from_secs(1)), None);
        assert!(matches!(app.on_tick(start + Duration::from_secs(5)), Some(Command::Refresh { .. })));
    }

    #[test]
    fn older_snapshot_does_not_overwrite_newer() {
        let mut app = App::new(Duration::from_secs(5));
        let Command::Refresh { seq: old } = app.refresh() else { unreachable!() };
        let Command::Refresh { seq: new } = app.refresh() else { unreachable!() };
        app.apply(AppEvent::Refreshed { seq: new, outcome: Ok(vec![task("1", TaskStatus::Completed)]) });
        app.apply(AppEvent::Refreshed { seq: old, outcome: Ok(vec![task("1", TaskStatus::Pending)]) });
        assert!(app.registry.get("1").is_some_and(|t| t.is_completed()));
    }

    #[test]
    fn submit_requires_target_and_inserts_pending_task() {
        let mut app = app_with(vec![]);
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.view, View::Submit);
        assert_eq!(app.handle_key(key(KeyCode::Enter)), None);
        assert!(matches!(app.status, Some(StatusMessage::Error(_))));

        for c in "example.com".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Right));
        let cmd = app.handle_key(key(KeyCode::Enter));
        assert_eq!(
            cmd,
            Some(Command::Submit {
                target: "example.com".into(),
                mode: cycle_next(ScanMode::default()),
                intensity: cycle_next(Intensity::default()),
            })
        );

        app.apply(AppEvent::Submitted(Ok(task("1", TaskStatus::Pending))));
        assert_eq!(app.view, View::Tasks);
        assert_eq!(app.registry.len(), 1);
        assert_eq!(app.selected_task().map(|t| t.progress()), Some(Progress::ZERO));
    }

    #[test]
    fn refresh_answered_after_submit_keeps_new_task() {
        let mut app = App::new(Duration::from_secs(5));
        let Some(Command::Refresh { seq }) = app.on_tick(Instant::now()) else {
            panic!("expected a refresh");
        };
        app.apply(AppEvent::Submitted(Ok(task("1", TaskStatus::Pending))));
        assert_eq!(app.registry.len(), 1);

        app.apply(AppEvent::Refreshed { seq, outcome: Ok(vec![]) });
        assert_eq!(app.registry.len(), 1);
        assert!(!app.refreshing);

        let Some(Command::Refresh { seq }) = app.handle_key(key(KeyCode::Char('r'))) else {
            panic!("expected a refresh");
        };
        let running = TaskStatus::Running { progress: Progress::new(20).unwrap() };
        app.apply(AppEvent::Refreshed { seq, outcome: Ok(vec![task("1", running)]) });
        assert!(app.registry.get("1").is_some_and(|t| t.is_running()));
    }

    #[test]
    fn failed_submission_keeps_form_and_registry() {
        let mut app = app_with(vec![]);
        app.handle_key(key(KeyCode::Char('n')));
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Enter));
        app.apply(AppEvent::Submitted(Err(ScanError::Transport("refused".into()))));
        assert_eq!(app.view, View::Submit);
        assert_eq!(app.form.input, "x");
        assert!(app.registry.is_empty());
        assert!(matches!(app.status, Some(StatusMessage::Error(_))));
    }

    #[test]
    fn stop_on_finished_task_sends_nothing() {
        let mut app = app_with(vec![task("1", TaskStatus::Completed)]);
        assert_eq!(app.handle_key(key(KeyCode::Char('s'))), None);
        assert!(matches!(app.status, Some(StatusMessage::Info(_))));
    }

    #[test]
    fn stop_response_reports_and_refreshes() {
        let running = TaskStatus::Running { progress: Progress::new(40).unwrap() };
        let mut app = app_with(vec![task("1", running)]);
        let Some(Command::Stop { ticket, .. }) = app.handle_key(key(KeyCode::Char('s'))) else {
            panic!("expected a stop command");
        };
        let follow_up = app.apply(AppEvent::Stopped { ticket, outcome: Ok(StopOutcome::AlreadyFinished) });
        assert!(matches!(follow_up, Some(Command::Refresh { .. })));
        assert_eq!(app.status, Some(StatusMessage::Info("Scan #1 has already finished".into())));
    }

    #[test]
    fn not_ready_result_is_not_an_empty_view() {
        let mut app = app_with(vec![task("1", TaskStatus::Pending)]);
        let Some(Command::FetchResult { ticket }) = app.handle_key(key(KeyCode::Enter)) else {
            panic!("expected a fetch");
        };
        app.apply(AppEvent::ResultFetched { ticket, outcome: Err(ScanError::NotReady("1".into())) });
        let detail = app.detail.as_ref().unwrap();
        assert!(matches!(detail.state, DetailState::NotReady(_)));
    }

    #[test]
    fn result_arriving_after_leaving_detail_is_dropped() {
        let mut app = app_with(vec![task("1", TaskStatus::Completed), task("2", TaskStatus::Completed)]);
        let Some(Command::FetchResult { ticket: first }) = app.handle_key(key(KeyCode::Enter)) else {
            panic!("expected a fetch");
        };
        app.handle_key(key(KeyCode::Esc));
        app.handle_key(key(KeyCode::Down));
        let Some(Command::FetchResult { ticket: second }) = app.handle_key(key(KeyCode::Enter)) else {
            panic!("expected a fetch");
        };

        app.apply(AppEvent::ResultFetched { ticket: first, outcome: Ok(empty_result("1")) });
        let detail = app.detail.as_ref().unwrap();
        assert_eq!(detail.task_id, "2");
        assert!(matches!(detail.state, DetailState::Loading));

        app.apply(AppEvent::ResultFetched { ticket: second, outcome: Ok(empty_result("2")) });
        assert!(matches!(app.detail.as_ref().unwrap().state, DetailState::Ready(_)));
    }

    #[test]
    fn export_popup_issues_one_request_and_can_be_cancelled() {
        let mut app = app_with(vec![task("2", TaskStatus::Completed)]);
        app.handle_key(key(KeyCode::Char('e')));
        let Some(Command::Export { ticket, format }) = app.handle_key(key(KeyCode::Char('p'))) else {
            panic!("expected an export");
        };
        assert_eq!(format, ReportFormat::Pdf);
        assert_eq!(ticket.target, "2");
        assert_eq!(app.handle_key(key(KeyCode::Char('h'))), None);

        app.handle_key(key(KeyCode::Esc));
        assert!(app.export_popup.is_none());
        let report = ExportedReport { format, path: PathBuf::from("/tmp/r.pdf"), title: None };
        app.apply(AppEvent::Exported { ticket, outcome: Ok(report) });
        assert_eq!(app.status, None);
    }

    #[test]
    fn export_not_ready_gets_its_own_message() {
        let mut app = app_with(vec![task("3", TaskStatus::Pending)]);
        app.handle_key(key(KeyCode::Char('e')));
        let Some(Command::Export { ticket, .. }) = app.handle_key(key(KeyCode::Char('h'))) else {
            panic!("expected an export");
        };
        app.apply(AppEvent::Exported {
            ticket,
            outcome: Err(ExportError::Backend(ScanError::NotReady("3".into()))),
        });
        assert_eq!(
            app.status,
            Some(StatusMessage::Error("Scan #3 has no results yet, nothing to export".into()))
        );
    }

    #[test]
    fn severity_filter_cycles_back_to_all() {
        let mut filter = None;
        for _ in 0..5 {
            filter = next_filter(filter);
        }
        assert_eq!(filter, None);
    }

    #[test]
    fn selection_is_clamped_after_refresh() {
        let mut app = app_with(vec![task("1", TaskStatus::Pending), task("2", TaskStatus::Pending)]);
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.task_table_state.selected(), Some(1));
        let seq = app.tickets.next_seq();
        app.apply(AppEvent::Refreshed { seq, outcome: Ok(vec![task("1", TaskStatus::Pending)]) });
        assert_eq!(app.task_table_state.selected(), Some(0));
    }
}
