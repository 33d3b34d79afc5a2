// src/ui/widgets/summary.rs

use crate::app::{App, DetailState};
use crate::core::analysis::{self, Priority, RiskLevel};
use crate::ui::severity_style;
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

/// Renders the summary of a completed scan.
///
/// Shows the overall risk score with a gauge, the number of findings per
/// severity, and remediation advice grouped by vulnerability type. Nothing is
/// drawn inside the panel until the result has loaded.
///
/// # Arguments
/// * `frame` - The `Frame` used for rendering the UI.
/// * `app` - The application state; the summary reads the open detail view.
/// * `area` - The `Rect` defining the drawable area for this widget.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let summary_container = Block::default().borders(Borders::ALL).title("Summary");
    frame.render_widget(summary_container, area);

    let Some(DetailState::Ready(result)) = app.detail.as_ref().map(|d| &d.state) else {
        return;
    };

    let summary_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Risk score
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Spacer
            Constraint::Length(5), // Distribution
            Constraint::Length(1), // Spacer
            Constraint::Min(0),    // Recommendations
        ])
        .split(area);

    // --- Risk Score ---
    let score = analysis::risk_score(&result.vulnerabilities);
    let level = RiskLevel::from_score(score);
    let level_style = match level {
        RiskLevel::Critical => Style::default().fg(Color::Red).bold(),
        RiskLevel::High => Style::default().fg(Color::LightRed),
        RiskLevel::Medium => Style::default().fg(Color::Yellow),
        RiskLevel::Low => Style::default().fg(Color::Cyan),
        RiskLevel::None => Style::default().fg(Color::Green),
    };
    let score_text = Text::from(vec![
        Line::from("Risk Score".bold()),
        Line::from(format!("{score:.1}/10 ({level})")).style(level_style),
    ]);
    frame.render_widget(Paragraph::new(score_text).alignment(Alignment::Center), summary_chunks[0]);

    let gauge = Gauge::default()
        .ratio((score / 10.0).clamp(0.0, 1.0))
        .label("")
        .gauge_style(level_style);
    frame.render_widget(gauge, summary_chunks[1]);

    // --- Severity Distribution ---
    let total = result.vulnerabilities.len().max(1);
    let bar_room = summary_chunks[3].width.saturating_sub(16) as usize;
    let distribution: Vec<Line> = analysis::severity_distribution(result)
        .into_iter()
        .map(|(severity, count)| {
            let bar = "█".repeat(count * bar_room / total);
            Line::from(vec![
                Span::styled(format!("{:<9}", severity.to_string().to_uppercase()), severity_style(severity)),
                Span::raw(format!("{count:>3} ")),
                Span::styled(bar, severity_style(severity)),
            ])
        })
        .collect();
    frame.render_widget(
        Paragraph::new(distribution).block(Block::default().title("FINDINGS".bold())),
        summary_chunks[3],
    );

    // --- Recommendations ---
    let mut rec_lines = Vec::new();
    for rec in analysis::recommendations(result) {
        let priority_style = match rec.priority {
            Priority::High => Style::default().fg(Color::Red).bold(),
            Priority::Medium => Style::default().fg(Color::Yellow),
        };
        rec_lines.push(Line::from(vec![
            Span::styled(format!("[{}] ", rec.priority), priority_style),
            Span::styled(rec.vulnerability_type.clone(), Style::new().bold()),
        ]));
        rec_lines.push(Line::from(format!(
            "  {} host(s), {} high/critical",
            rec.affected_hosts, rec.critical_instances
        )));
        rec_lines.push(Line::from(format!("  {}", rec.recommendation)));
    }
    if rec_lines.is_empty() {
        rec_lines.push(Line::from(Span::styled("✓ Nothing to remediate.", Style::default().fg(Color::Green))));
    }
    frame.render_widget(
        Paragraph::new(rec_lines)
            .block(Block::default().title("RECOMMENDATIONS".bold()))
            .wrap(Wrap { trim: false }),
        summary_chunks[5],
    );
}
