// services/bank-dash/src/main.rs
//
// Blood bank console
// Terminal front end for donors, donations, requests, stock and screenings
//
// Run with: cargo run --bin bank-dash -- --demo

use std::fs::OpenOptions;
use std::io::stdout;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bank_dash::config::DashConfig;
use bank_dash::loader::{AppEvent, Loader};
use bank_dash::state::Page;
use bank_dash::{load_config, mock, ui, App};
use svckit::{BankApi, HttpBankApi, MemoryBankApi};

#[derive(Parser, Debug)]
#[command(name = "bank-dash")]
#[command(about = "Terminal console for blood bank donors, donations, requests and stock")]
#[command(version = "0.1.0")]
struct Args {
    /// Run against built-in sample data (no backend required)
    #[arg(long, short)]
    demo: bool,

    /// Optional settings file (yaml/toml/json)
    #[arg(short, long)]
    config: Option<String>,

    /// Backend base URL, overrides the settings file
    #[arg(long)]
    api_url: Option<String>,

    /// Refresh period of the active page in seconds
    #[arg(long)]
    poll_secs: Option<u64>,

    /// Page to open first
    #[arg(long, default_value = "dashboard")]
    page: String,
}

fn init_tracing(config: &DashConfig) -> Result<()> {
    // stdout belongs to the terminal UI, so logs go to a file
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.observability.log_file)
        .with_context(|| format!("opening log file {}", config.observability.log_file))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.observability.log_level.clone().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(url) = args.api_url {
        config.api.base_url = url;
        config.api.validate()?;
    }
    if let Some(secs) = args.poll_secs {
        config.dashboard.poll_interval_secs = secs;
    }
    let first_page: Page = args.page.parse()?;

    init_tracing(&config)?;

    let api: Arc<dyn BankApi> = if args.demo {
        info!("Starting in DEMO mode with sample data");
        Arc::new(MemoryBankApi::new(mock::demo_store()))
    } else {
        info!("Starting against {}", config.api.base_url);
        Arc::new(HttpBankApi::new(&config.api)?)
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let (tx, rx) = mpsc::unbounded_channel();
    let loader = Loader::new(api, tx, runtime.handle().clone());
    let mut app = App::new(loader, config.dashboard.clone());

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    app.enter_page(first_page);
    let result = run_app(&mut terminal, &mut app, rx, config.dashboard.tick_rate());

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    drop(app);
    runtime.shutdown_timeout(Duration::from_secs(1));
    info!("Console closed");

    result
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut rx: UnboundedReceiver<AppEvent>,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        // responses are applied in arrival order
        while let Ok(event) = rx.try_recv() {
            app.apply(event);
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick(Instant::now());
            last_tick = Instant::now();
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
