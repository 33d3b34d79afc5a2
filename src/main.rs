// src/main.rs

use color_eyre::eyre::{Result, WrapErr};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{error, info};

mod app;
mod config;
mod core;
mod logging;
mod ui;

use app::{App, AppEvent, Command, ExportError, ExportedReport};
use config::AppConfig;
use core::backend::http::HttpBackend;
use core::report::ReportArtifact;
use core::service::ScanService;

type Service = ScanService<HttpBackend>;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Everything that can fail on bad input happens before raw mode.
    let config = AppConfig::from_env().wrap_err("invalid configuration")?;
    logging::initialize_logging()?;
    info!(api_url = %config.api_url, poll_secs = config.poll_interval.as_secs(), "Starting VulnScout.");
    let service = ScanService::new(HttpBackend::new(&config)?);

    // --- Setup ---
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let result = run(&mut terminal, service, &config).await;

    // --- Restore Terminal ---
    stdout().execute(LeaveAlternateScreen)?;
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;

    if let Err(e) = &result {
        error!(error = %e, "Exiting after an unrecoverable error.");
    }
    result
}

async fn run<T: ratatui::backend::Backend>(terminal: &mut Terminal<T>, service: Service, config: &AppConfig) -> Result<()> {
    let mut app = App::new(config.poll_interval);
    let (tx, mut rx) = mpsc::channel(32);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if let Some(command) = app.on_tick(Instant::now()) {
            dispatch(command, &service, config, &tx);
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(command) = app.handle_key(key) {
                        dispatch(command, &service, config, &tx);
                    }
                }
            }
        }

        while let Ok(response) = rx.try_recv() {
            if let Some(command) = app.apply(response) {
                dispatch(command, &service, config, &tx);
            }
        }
    }

    info!("Shutting down.");
    Ok(())
}

/// Spawns the request behind `command`; its response comes back over `tx`.
fn dispatch(command: Command, service: &Service, config: &AppConfig, tx: &mpsc::Sender<AppEvent>) {
    let service = service.clone();
    let tx = tx.clone();
    let export_dir = config.export_dir.clone();

    tokio::spawn(async move {
        let event = match command {
            Command::Refresh { seq } => AppEvent::Refreshed { seq, outcome: service.list_tasks().await },
            Command::Submit { target, mode, intensity } => {
                AppEvent::Submitted(service.submit(&target, mode, intensity).await)
            }
            Command::Stop { ticket, known } => {
                let outcome = service.stop_task(&ticket.target, known.as_ref()).await;
                AppEvent::Stopped { ticket, outcome }
            }
            Command::FetchResult { ticket } => {
                let outcome = service.fetch_result(&ticket.target).await;
                AppEvent::ResultFetched { ticket, outcome }
            }
            Command::Export { ticket, format } => {
                let outcome = match service.export_report(&ticket.target, format).await {
                    Ok(artifact) => save_report(&artifact, export_dir).await,
                    Err(e) => Err(ExportError::Backend(e)),
                };
                AppEvent::Exported { ticket, outcome }
            }
        };
        // The receiver only goes away when the app is quitting.
        let _ = tx.send(event).await;
    });
}

async fn save_report(artifact: &ReportArtifact, dir: PathBuf) -> Result<ExportedReport, ExportError> {
    let path = artifact.deliver(&dir).await.inspect_err(|e| {
        error!(path = %dir.display(), error = %e, "Failed to write report.");
    })?;
    Ok(ExportedReport { format: artifact.format(), path, title: artifact.title() })
}
