// services/tui-dash/src/main.rs
//
// Terminal dashboard for the restaurant sales forecast backend
//
// Run with: cargo run --bin forecast-dash -- --demo
// Batch:    cargo run --bin forecast-dash -- --headless --file data/sales.csv

use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use svckit::config::{load_config, DashConfig};
use svckit::export::Exporter;
use svckit::{ApiClient, ForecastBackend, RetryPolicy, Session};

mod app;
mod components;
mod exports;
mod headless;
mod mock;
mod state;

use app::App;
use mock::DemoBackend;

#[derive(Parser, Debug)]
#[command(name = "forecast-dash")]
#[command(about = "Terminal dashboard for restaurant sales forecasts")]
#[command(version)]
struct Args {
    /// Config file (YAML, extension optional)
    #[arg(long, short, default_value = "config/forecast-dash")]
    config: String,

    /// Run against an in-process demo backend (no server required)
    #[arg(long, short)]
    demo: bool,

    /// Forecast backend base URL, overrides the config file
    #[arg(long, env = "FORECAST_DASH_API_URL")]
    api_url: Option<String>,

    /// Directory for exported files, overrides the config file
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Upload FILE, load every page, write every export and exit
    #[arg(long, requires = "file")]
    headless: bool,

    /// Sales CSV for headless mode
    #[arg(long)]
    file: Option<PathBuf>,

    /// Refresh interval in milliseconds
    #[arg(long, default_value = "100")]
    refresh_ms: u64,
}

fn init_tracing(config: &DashConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    if to_file {
        // The terminal belongs to the UI.
        let file = File::create(&config.observability.log_file)
            .with_context(|| format!("cannot open log file {}", config.observability.log_file.display()))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(url) = &args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(dir) = &args.export_dir {
        config.export.directory = dir.clone();
    }

    init_tracing(&config, !args.headless)?;

    let backend: Arc<dyn ForecastBackend> = if args.demo {
        Arc::new(DemoBackend::default())
    } else {
        Arc::new(ApiClient::new(&config.api)?)
    };
    info!("Using backend {}", backend.name());

    let session = Session::shared();
    let policy = RetryPolicy::from_config(&config.retry);
    let exporter = Exporter::new(&config.export);

    if args.headless {
        let Some(file) = args.file.as_deref() else {
            bail!("--headless needs --file");
        };
        let shutdown = CancellationToken::new();
        let ctrl_c = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling");
                ctrl_c.cancel();
            }
        });

        let summary = headless::run(backend, session, policy, exporter, file, shutdown).await?;
        for path in &summary.exported {
            println!("{}", path.display());
        }
        if !summary.failed_pages.is_empty() {
            bail!("failed to load: {:?}", summary.failed_pages);
        }
        return Ok(());
    }

    let mode = if args.demo { "DEMO" } else { "LIVE" };
    let mut app = App::new(backend, session, policy, exporter, mode);
    app.state.add_log(
        "INFO",
        &match mode {
            "DEMO" => "Dashboard started in DEMO mode".to_string(),
            _ => format!("Dashboard started - backend {}", config.api.base_url),
        },
    );

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // The UI loop blocks on terminal input while controllers run on the runtime.
    let tick_rate = Duration::from_millis(args.refresh_ms);
    let result = tokio::task::block_in_place(|| run_app(&mut terminal, &mut app, tick_rate));
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, tick_rate: Duration) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
        if app.should_quit() {
            return Ok(());
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }
}
