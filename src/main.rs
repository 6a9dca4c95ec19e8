use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use sinkwatch::app::{write_export, App};
use sinkwatch::events;
use sinkwatch::ui::{self, Theme};
use sinkwatch::{
    project, FileFetcher, HttpFetcher, Settings, StatusFetcher, StatusPoller, StatusStore,
};

#[derive(Parser, Debug)]
#[command(name = "sinkwatch")]
#[command(about = "Terminal dashboard for Ignition gateway Kafka sink status")]
struct Args {
    /// Gateway base URL (e.g., http://localhost:8088)
    #[arg(short, long, conflicts_with = "file")]
    url: Option<String>,

    /// Read status snapshots from a JSON file instead of a gateway
    #[arg(short, long, conflicts_with = "url")]
    file: Option<PathBuf>,

    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Poll interval in milliseconds
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Request timeout in milliseconds
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Write logs to this file (logs are discarded otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Fetch once, export the projected view to a JSON file, and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(url) = &args.url {
        settings.gateway.url = url.clone();
    }
    if let Some(interval) = args.interval {
        settings.poll.interval_ms = interval;
    }
    if let Some(timeout) = args.timeout {
        settings.gateway.timeout_ms = timeout;
    }
    if let Some(log_file) = &args.log_file {
        settings.log.file = Some(log_file.clone());
    }
    settings.validate()?;

    init_logging(&settings, args.verbose)?;

    let fetcher: Arc<dyn StatusFetcher> = match &args.file {
        Some(path) => Arc::new(FileFetcher::new(path)),
        None => Arc::new(
            HttpFetcher::builder()
                .base_url(&settings.gateway.url)
                .status_path(&settings.gateway.status_path)
                .timeout(settings.request_timeout())
                .build()?,
        ),
    };
    info!(source = fetcher.description(), "starting");

    let rt = tokio::runtime::Runtime::new()?;

    // Handle export mode (non-interactive)
    if let Some(export_path) = args.export {
        let status = rt.block_on(fetcher.fetch())?;
        let projection = project(Some(&status), None);
        write_export(&export_path, fetcher.description(), &projection)?;
        println!("Exported status view to: {}", export_path.display());
        return Ok(());
    }

    // The poller runs on the runtime while the TUI owns the main thread
    let _guard = rt.enter();
    let (store, reader) = StatusStore::new(fetcher.description());
    let handle = StatusPoller::new(fetcher).interval(settings.poll_interval()).start(store);

    let mut app = App::new(reader, Theme::auto_detect());
    if args.file.is_none() {
        app = app.with_gateway_url(&settings.gateway.url);
    }

    let result = run_tui(&mut app);

    let counters = handle.counters();
    handle.cancel();
    info!(
        issued = counters.issued,
        skipped = counters.skipped,
        succeeded = counters.succeeded,
        failed = counters.failed,
        "stopped polling"
    );

    result
}

/// Initializes the tracing subscriber.
///
/// The level comes from settings, raised by each `-v`. `RUST_LOG` is
/// honored on top. Without a log file nothing is written, since the
/// terminal belongs to the TUI.
fn init_logging(settings: &Settings, verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => settings.log_level()?,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(format!("sinkwatch={}", level).parse()?);

    match &settings.log.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(io::sink)
                .init();
        }
    }
    Ok(())
}

/// Run the TUI until the user quits.
fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal. Panics on runtime workers (a
    // failing fetch) are recovered by the poller and must leave the TUI alone.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        if is_main_thread() {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        }
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn is_main_thread() -> bool {
    std::thread::current().name() == Some("main")
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.refresh();

        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                // Terminal will redraw on next iteration
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    Ok(())
}
