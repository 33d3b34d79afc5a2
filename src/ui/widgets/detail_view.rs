// src/ui/widgets/detail_view.rs

use crate::app::{App, DetailState, SPINNER_CHARS};
use crate::core::analysis;
use crate::core::models::{ScanResult, Vulnerability};
use crate::ui::severity_style;
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

pub fn render_detail_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(detail) = app.detail.as_mut() else {
        return;
    };

    let filter = detail
        .filter
        .map(|s| s.to_string())
        .unwrap_or_else(|| "all".to_string());
    let main_block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Scan #{} Findings [{}] (↑ ↓ navigate, f filter)", detail.task_id, filter));

    let result = match &detail.state {
        DetailState::Ready(result) => result,
        DetailState::Loading => {
            let content = Paragraph::new(Line::from(vec![
                Span::styled(format!("{} ", SPINNER_CHARS[app.spinner_frame]), Style::default().fg(Color::Cyan)),
                Span::raw("Fetching results..."),
            ]))
            .alignment(Alignment::Center);
            frame.render_widget(content.block(main_block), area);
            return;
        }
        DetailState::NotReady(message) => {
            let content = Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(content.block(main_block), area);
            return;
        }
        DetailState::Failed(message) => {
            let content = Paragraph::new(vec![
                Line::from("Could not load results".red().bold()),
                Line::from(""),
                Line::from(message.as_str()),
                Line::from(""),
                Line::from("Press 'r' to try again."),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
            frame.render_widget(content.block(main_block), area);
            return;
        }
    };

    let inner_area = main_block.inner(area);
    frame.render_widget(main_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(inventory_height(result)),
            Constraint::Percentage(40),
            Constraint::Min(0),
        ])
        .split(inner_area);

    render_inventory(frame, result, chunks[0]);

    let findings = analysis::sorted_vulnerabilities(result, detail.filter);
    let items: Vec<ListItem> = findings
        .iter()
        .map(|v| {
            let location = match (&v.host, v.port) {
                (Some(host), Some(port)) => format!(" {host}:{port}"),
                (Some(host), None) => format!(" {host}"),
                _ => String::new(),
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("[{:<8}] ", v.severity.to_string().to_uppercase()), severity_style(v.severity)),
                Span::styled(format!("{:>4.1} ", v.cvss_score), Style::default().fg(Color::DarkGray)),
                Span::raw(v.title.clone()),
                Span::styled(location, Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let findings_list = List::new(items)
        .block(Block::default().borders(Borders::TOP).title(format!("Vulnerabilities ({})", findings.len())))
        .highlight_style(Style::new().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
    frame.render_stateful_widget(findings_list, chunks[1], &mut detail.list_state);

    let detail_block = Block::default().borders(Borders::TOP).title("Details");
    let selected = detail.list_state.selected().and_then(|i| findings.get(i));
    let Some(vuln) = selected else {
        let placeholder = if result.vulnerabilities.is_empty() {
            Text::from(vec![
                Line::from(""),
                Line::from("✓ NO VULNERABILITIES FOUND".bold().fg(Color::Green)),
            ])
        } else {
            Text::from("No findings match this filter.")
        };
        frame.render_widget(Paragraph::new(placeholder).alignment(Alignment::Center).block(detail_block), chunks[2]);
        return;
    };

    let mut text = vec![
        Line::from(Span::styled(vuln.title.clone(), severity_style(vuln.severity))),
        Line::from(format!("ID: {}   CVSS: {:.1}", vuln.id, vuln.cvss_score)),
        Line::from(affected(result, vuln)),
        Line::from(""),
        Line::from("WHAT IT IS:".yellow().bold()),
        Line::from(vuln.description.clone()),
    ];
    if !vuln.proof.is_empty() {
        text.push(Line::from(""));
        text.push(Line::from("EVIDENCE:".yellow().bold()));
        text.push(Line::from(vuln.proof.clone()));
    }
    let fix = if vuln.recommendation.trim().is_empty() {
        analysis::DEFAULT_RECOMMENDATION
    } else {
        vuln.recommendation.as_str()
    };
    text.push(Line::from(""));
    text.push(Line::from("HOW TO FIX:".yellow().bold()));
    text.push(Line::from(fix.to_string()));

    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }).block(detail_block), chunks[2]);
}

fn affected(result: &ScanResult, vuln: &Vulnerability) -> String {
    let Some(ip) = vuln.host.as_deref() else {
        return "Affects: whole target".to_string();
    };
    let host = match result.host(ip).and_then(|h| h.hostname.as_deref()) {
        Some(name) => format!("{ip} ({name})"),
        None => ip.to_string(),
    };
    match vuln.port {
        Some(port) => format!("Affects: {host} port {port}"),
        None => format!("Affects: {host}"),
    }
}

fn inventory_height(result: &ScanResult) -> u16 {
    (result.hosts.len().max(result.ports.len()).min(5) as u16) + 2
}

/// Hosts on the left, open ports on the right.
fn render_inventory(frame: &mut Frame, result: &ScanResult, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let hosts: Vec<Line> = result
        .hosts
        .iter()
        .map(|h| {
            let name = h.hostname.as_deref().unwrap_or("-");
            Line::from(format!("{:<15} {} ({})", h.ip, name, h.os_or_unknown()))
        })
        .collect();
    frame.render_widget(
        Paragraph::new(hosts).block(Block::default().title(Span::styled(format!("Hosts ({})", result.hosts.len()), Style::new().bold()))),
        halves[0],
    );

    let ports: Vec<Line> = result
        .ports
        .iter()
        .map(|p| Line::from(format!("{:>5}/{:<4} {:<10} {}", p.number, p.protocol, p.service, p.state)))
        .collect();
    frame.render_widget(
        Paragraph::new(ports).block(Block::default().title(Span::styled(format!("Ports ({})", result.ports.len()), Style::new().bold()))),
        halves[1],
    );
}
