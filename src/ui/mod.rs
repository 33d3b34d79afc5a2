// src/ui/mod.rs

use crate::app::{App, View};
use ratatui::prelude::*;

mod layout;
mod widgets;

pub fn render(app: &mut App, frame: &mut Frame) {
    let layout = layout::create_layout(frame.area(), app.show_logs);

    widgets::header::render_header(frame, app, layout.header);

    match app.view {
        View::Tasks => {
            widgets::task_list::render_task_list(frame, app, layout.main);
            widgets::task_list::render_task_panel(frame, app, layout.side);
        }
        View::Submit => {
            widgets::task_list::render_task_list(frame, app, layout.main);
            widgets::submit_form::render_submit_form(frame, app, layout.side);
        }
        View::Detail => {
            widgets::detail_view::render_detail_view(frame, app, layout.main);
            widgets::summary::render_summary(frame, app, layout.side);
        }
    }

    if app.show_logs {
        widgets::log_view::render_log_view(frame, app, layout.log_panel);
    }
    widgets::footer::render_footer(frame, app, layout.footer);

    if app.export_popup.is_some() {
        widgets::export_popup::render_export_popup(frame, app, frame.area());
    }
}

/// Colour used for a severity everywhere in the UI.
fn severity_style(severity: crate::core::models::Severity) -> Style {
    use crate::core::models::Severity;
    match severity {
        Severity::Critical => Style::default().fg(Color::Red).bold(),
        Severity::High => Style::default().fg(Color::LightRed),
        Severity::Medium => Style::default().fg(Color::Yellow),
        Severity::Low => Style::default().fg(Color::Cyan),
    }
}
