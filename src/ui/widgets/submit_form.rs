// src/ui/widgets/submit_form.rs

use crate::app::{App, SPINNER_CHARS};
use crate::core::models::{Intensity, ScanMode};
use ratatui::{
    prelude::*,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use strum::IntoEnumIterator;

/// One line listing every option, with the current one highlighted.
fn choice_line<T: IntoEnumIterator + PartialEq + Copy>(label: &'static str, current: T, name: impl Fn(T) -> String) -> Line<'static> {
    let mut spans = vec![Span::raw(label)];
    for option in T::iter() {
        let style = if option == current {
            Style::new().bold().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::new().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", name(option)), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

/// Renders the new scan form: target input, mode and intensity pickers.
pub fn render_submit_form(frame: &mut Frame, app: &App, area: Rect) {
    let container = Block::default()
        .borders(Borders::ALL)
        .title("New Scan")
        .border_style(Style::new().fg(Color::Yellow));
    frame.render_widget(container, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Target
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Mode
            Constraint::Length(1), // Intensity
            Constraint::Length(1), // Spacer
            Constraint::Min(0),    // Help
        ])
        .split(area);

    let input_block = Block::default().borders(Borders::ALL).title("Target (host, IP or URL)");
    let input_paragraph = Paragraph::new(app.form.input.as_str())
        .block(input_block)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(input_paragraph, chunks[0]);

    frame.render_widget(
        Paragraph::new(choice_line("Mode:      ", app.form.mode, |m: ScanMode| m.label().to_string())),
        chunks[2],
    );
    frame.render_widget(
        Paragraph::new(choice_line("Intensity: ", app.form.intensity, |i: Intensity| i.to_string())),
        chunks[3],
    );

    let help = if app.form.submitting {
        Text::from(Line::from(vec![
            Span::styled(format!("{} ", SPINNER_CHARS[app.spinner_frame]), Style::new().fg(Color::Cyan)),
            Span::raw("Submitting..."),
        ]))
    } else {
        Text::from(vec![
            Line::from("Only scan systems you own or are authorized to test.".italic()),
            Line::from(""),
            Line::from("Tab cycles the mode, ← → the intensity."),
        ])
    };
    frame.render_widget(Paragraph::new(help).wrap(Wrap { trim: true }), chunks[5]);

    if !app.form.submitting {
        frame.set_cursor_position((
            chunks[0].x + app.form.input.chars().count() as u16 + 1,
            chunks[0].y + 1,
        ));
    }
}
