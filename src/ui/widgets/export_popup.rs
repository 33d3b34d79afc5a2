// src/ui/widgets/export_popup.rs

use crate::app::{App, SPINNER_CHARS};
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Renders the report format chooser on top of the existing UI.
///
/// `Clear` wipes the popup area first so the view underneath does not bleed through.
pub fn render_export_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(popup) = &app.export_popup else {
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("Export report for scan #{}", popup.task_id),
            Style::new().bold().fg(Color::Yellow),
        )),
        Line::from(""),
    ];
    match popup.exporting {
        Some(format) => lines.push(Line::from(vec![
            Span::styled(format!("{} ", SPINNER_CHARS[app.spinner_frame]), Style::default().fg(Color::Cyan)),
            Span::raw(format!("Rendering {} report...", format.extension().to_uppercase())),
        ])),
        None => {
            lines.push(Line::from("P".bold().yellow() + Span::raw(" PDF document")));
            lines.push(Line::from("H".bold().yellow() + Span::raw(" HTML page")));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from("Esc".bold() + Span::raw(" to close")));

    let block = Block::default()
        .title("Export")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let popup_area = centered_rect(40, 30, area);
    let widget = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    frame.render_widget(Clear, popup_area);
    frame.render_widget(widget, popup_area);
}

/// Helper function to create a centered rectangle for a popup.
///
/// # Arguments
/// * `percent_x` - The desired width of the popup as a percentage of the parent area.
/// * `percent_y` - The desired height of the popup as a percentage of the parent area.
/// * `r` - The parent `Rect` to center the new area within.
///
/// # Returns
/// A new `Rect` that is centered within `r`.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
