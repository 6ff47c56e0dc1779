mod api;
mod app_service;
mod app_state;
mod commands;
mod config;
mod hierarchy;
mod session;
mod storage;
mod ui;
mod wizard;

use anyhow::Context;
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::api::{CollegeApi, LocalBackend, RemoteBackend};
use crate::app_service::AppService;
use crate::app_state::{App, AppEvent};
use crate::commands::AppCommand;
use crate::config::{AppConfig, BackendKind};
use crate::session::{build_http_client, AutoAuthSession, CollegeSession};
use crate::ui::draw;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let ts = Local::now().format("%Y%m%d-%H%M%S").to_string();
    let log_dir = std::path::PathBuf::from("logs");
    std::fs::create_dir_all(&log_dir).context("create logs directory")?;
    let log_path = log_dir.join(format!("app-{}.log", ts));
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("create log file {}", log_path.display()))?;
    // 终端归 TUI 所有，日志写文件
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter_level(log::LevelFilter::Warn)
        .filter_module("campusdesk", log::LevelFilter::Info)
        .filter_module("sqlx", log::LevelFilter::Error)
        .filter_module("sea_orm", log::LevelFilter::Error)
        .init();

    let (config, mut session_info) = AppConfig::load();
    let api = build_backend(&config, &mut session_info).await?;

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<AppCommand>();
    let (evt_tx, evt_rx) = mpsc::unbounded_channel::<AppEvent>();

    // 单后台任务：持有 API 与向导
    tokio::spawn(AppService::new(api, evt_tx).run(cmd_rx));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session_info, config.nav_layout, cmd_tx, evt_rx);
    let res = match app.evt_rx.take() {
        Some(rx) => run_app_loop(&mut terminal, &mut app, rx).await,
        None => Ok(()),
    };

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res.context("terminal loop failed")
}

async fn build_backend(
    config: &AppConfig,
    info: &mut Vec<String>,
) -> anyhow::Result<Arc<dyn CollegeApi>> {
    match config.backend {
        BackendKind::Local => {
            let db = storage::establish_connection(&config.database_url)
                .await
                .with_context(|| format!("connect {}", config.database_url))?;
            info.push("✓ Database ready".to_string());
            if config.seed {
                match storage::seed::seed_if_empty(&db).await {
                    Ok(true) => info.push("✓ Seeded predefined programs and trades".to_string()),
                    Ok(false) => {}
                    Err(e) => info.push(format!("✗ Seeding failed: {}", e)),
                }
            }
            tokio::fs::create_dir_all(&config.media_root)
                .await
                .with_context(|| format!("create media root {}", config.media_root.display()))?;
            Ok(Arc::new(LocalBackend::new(
                Arc::new(db),
                config.media_root.clone(),
            )))
        }
        BackendKind::Remote => {
            let client = build_http_client(config.proxy.as_deref())?;
            let mut auth = AutoAuthSession::new(client, config.api_url.clone())
                .with_tokens(config.access_token.clone(), config.refresh_token.clone());
            if let Some((email, password)) = config.credentials() {
                auth = auth.with_credentials(email, password);
            }
            let backend = RemoteBackend::new(CollegeSession::new(auth));
            if config.credentials().is_some() {
                match backend.ensure_login().await {
                    Ok(()) => info.push("✓ Logged in".to_string()),
                    Err(e) => info.push(format!("✗ Login failed: {}", e)),
                }
            }
            Ok(Arc::new(backend))
        }
    }
}

async fn run_app_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut evt_rx: mpsc::UnboundedReceiver<AppEvent>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        while let Ok(event) = evt_rx.try_recv() {
            app.apply_event(event);
        }

        app.tick(Instant::now());

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.handle_key_event(key.code) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse, Instant::now()),
                _ => {}
            }
        }
    }
}
