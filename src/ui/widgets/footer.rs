// src/ui/widgets/footer.rs

use crate::app::{App, StatusMessage, View};
use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

fn key_hints(pairs: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (key, action)) in pairs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(format!("[{key}]"), Style::new().bold().fg(Color::Yellow)));
        spans.push(Span::raw(format!(" {action}")));
    }
    Line::from(spans)
}

/// Renders the footer: key hints for the active view and the last status message.
pub fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let hints = if app.export_popup.is_some() {
        key_hints(&[("P", "PDF"), ("H", "HTML"), ("Esc", "Close")])
    } else {
        match app.view {
            View::Tasks => key_hints(&[
                ("↑↓", "Select"),
                ("Enter", "Findings"),
                ("N", "New Scan"),
                ("S", "Stop"),
                ("R", "Refresh"),
                ("E", "Export"),
                ("L", "Logs"),
                ("Q", "Quit"),
            ]),
            View::Submit if app.form.submitting => Line::from("Submitting..."),
            View::Submit => key_hints(&[
                ("Enter", "Submit"),
                ("Tab", "Mode"),
                ("←→", "Intensity"),
                ("Esc", "Cancel"),
            ]),
            View::Detail => key_hints(&[
                ("↑↓", "Scroll"),
                ("F", "Filter"),
                ("R", "Reload"),
                ("E", "Export"),
                ("Esc", "Back"),
            ]),
        }
    };

    let status = match &app.status {
        Some(StatusMessage::Info(msg)) => Line::from(Span::styled(msg.clone(), Style::new().fg(Color::Green))),
        Some(StatusMessage::Error(msg)) => Line::from(Span::styled(msg.clone(), Style::new().fg(Color::Red))),
        None => Line::from(""),
    };

    let footer = Paragraph::new(vec![hints, status]).alignment(Alignment::Center);
    frame.render_widget(footer, area);
}
