// src/ui/widgets/task_list.rs

use crate::app::{App, SPINNER_CHARS};
use crate::core::models::{ScanTask, StatusKind, TaskStatus};
use chrono::Local;
use ratatui::{
    prelude::*,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, Wrap},
};

fn status_style(status: &TaskStatus) -> Style {
    match status.kind() {
        StatusKind::Pending => Style::default().fg(Color::Gray),
        StatusKind::Running => Style::default().fg(Color::Cyan),
        StatusKind::Completed => Style::default().fg(Color::Green),
        StatusKind::Error => Style::default().fg(Color::Red),
    }
}

fn status_label(task: &ScanTask, spinner_frame: usize) -> String {
    if task.is_running() {
        format!("{} running", SPINNER_CHARS[spinner_frame])
    } else {
        task.status.kind().to_string()
    }
}

/// Renders every known task as a table row, newest last, with the selection highlighted.
pub fn render_task_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Scans (Navigate with ↑ ↓)");

    if app.registry.is_empty() {
        let text = if app.registry.refreshed_at().is_none() {
            format!("{} Loading scans...", SPINNER_CHARS[app.spinner_frame])
        } else {
            "No scans yet. Press 'n' to start one.".to_string()
        };
        frame.render_widget(Paragraph::new(text).alignment(Alignment::Center).block(block), area);
        return;
    }

    let header = Row::new(["#", "Target", "Mode", "Intensity", "Status", "Progress", "Created"])
        .style(Style::new().bold().fg(Color::Yellow));

    let rows: Vec<Row> = app
        .registry
        .tasks()
        .iter()
        .map(|task| {
            Row::new(vec![
                Cell::from(task.id.clone()),
                Cell::from(task.target.clone()),
                Cell::from(task.mode.to_string()),
                Cell::from(task.intensity.to_string()),
                Cell::from(Span::styled(status_label(task, app.spinner_frame), status_style(&task.status))),
                Cell::from(task.progress().to_string()),
                Cell::from(task.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(6),
        Constraint::Min(16),
        Constraint::Length(6),
        Constraint::Length(9),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(16),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::new().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    frame.render_stateful_widget(table, area, &mut app.task_table_state);
}

/// Side panel with the selected task's details and a progress gauge.
pub fn render_task_panel(frame: &mut Frame, app: &App, area: Rect) {
    let container = Block::default().borders(Borders::ALL).title("Selected Scan");
    frame.render_widget(container, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(7), // Fields
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Spacer
            Constraint::Min(0),    // Hint
        ])
        .split(area);

    let Some(task) = app.selected_task() else {
        frame.render_widget(Paragraph::new("Nothing selected."), chunks[0]);
        return;
    };

    let finished = task
        .completed_at
        .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    let fields = vec![
        Line::from(vec![Span::raw("Target:    "), Span::styled(task.target.clone(), Style::new().bold())]),
        Line::from(format!("Scan #:    {}", task.id)),
        Line::from(format!("Mode:      {}", task.mode.label())),
        Line::from(format!("Intensity: {}", task.intensity)),
        Line::from(vec![
            Span::raw("Status:    "),
            Span::styled(task.status.kind().to_string(), status_style(&task.status)),
        ]),
        Line::from(format!("Created:   {}", task.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"))),
        Line::from(format!("Finished:  {finished}")),
    ];
    frame.render_widget(Paragraph::new(fields), chunks[0]);

    let gauge = Gauge::default()
        .percent(task.progress().get() as u16)
        .label(task.progress().to_string())
        .gauge_style(status_style(&task.status));
    frame.render_widget(gauge, chunks[1]);

    let hint = match task.status.kind() {
        StatusKind::Completed => "Press Enter to browse findings or 'e' to export a report.",
        StatusKind::Running => "Press 's' to stop this scan.",
        StatusKind::Pending => "Waiting for the scanner to pick this up.",
        StatusKind::Error => "This scan stopped before completing.",
    };
    frame.render_widget(
        Paragraph::new(hint).style(Style::new().fg(Color::DarkGray)).wrap(Wrap { trim: true }),
        chunks[3],
    );
}
