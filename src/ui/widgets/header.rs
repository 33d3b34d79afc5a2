// src/ui/widgets/header.rs

use crate::app::{App, SPINNER_CHARS};
use chrono::Local;
use ratatui::{
    prelude::*,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Renders the dashboard header: per-status task counters and the time of the last refresh.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let stats = app.registry.stats();

    let mut spans = vec![
        Span::styled("Total ", Style::new().bold()),
        Span::raw(stats.total.to_string()),
        Span::raw("   "),
        Span::styled("Pending ", Style::new().fg(Color::Gray)),
        Span::raw(stats.pending.to_string()),
        Span::raw("   "),
        Span::styled("Running ", Style::new().fg(Color::Cyan)),
        Span::raw(stats.running.to_string()),
        Span::raw("   "),
        Span::styled("Completed ", Style::new().fg(Color::Green)),
        Span::raw(stats.completed.to_string()),
        Span::raw("   "),
        Span::styled("Failed ", Style::new().fg(Color::Red)),
        Span::raw(stats.error.to_string()),
    ];

    spans.push(Span::raw("   "));
    if app.refreshing {
        spans.push(Span::styled(
            format!("{} refreshing", SPINNER_CHARS[app.spinner_frame]),
            Style::new().fg(Color::Cyan),
        ));
    } else if let Some(at) = app.registry.refreshed_at() {
        spans.push(Span::styled(
            format!("updated {}", at.with_timezone(&Local).format("%H:%M:%S")),
            Style::new().fg(Color::DarkGray),
        ));
    }

    let block = Block::default().borders(Borders::ALL).title("VulnScout");
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
