use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing_subscriber::EnvFilter;

mod app;
mod duration;
mod events;
mod feed;
mod replay;
mod select;
mod ui;

use app::{App, View};
use feed::DataFeed;
use padwatch_monitor::{
    list_ports, LinkState, MonitorConfig, SerialMonitor, DEFAULT_BAUD, DEFAULT_MARKER,
};
use replay::ReplayFeed;

/// How often the TUI polls the buffer and redraws.
const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "padwatch")]
#[command(about = "Live diagnostic monitor for the pad controller's serial debug stream")]
struct Args {
    /// Serial port to monitor (prompts interactively when omitted)
    port: Option<String>,

    /// List available serial ports and exit
    #[arg(long, conflicts_with_all = ["port", "console", "replay"])]
    list_ports: bool,

    /// Baud rate of the serial link
    #[arg(short, long, default_value_t = DEFAULT_BAUD)]
    baud: u32,

    /// Buffer retention window (e.g. "10s", "2500ms")
    #[arg(long, default_value = "10s", value_parser = parse_duration_arg)]
    retention: Duration,

    /// Initial chart time window
    #[arg(short, long, default_value = "4s", value_parser = parse_duration_arg)]
    window: Duration,

    /// Serial read timeout
    #[arg(long, default_value = "1s", value_parser = parse_duration_arg)]
    read_timeout: Duration,

    /// Sentinel glyph marking debug frames
    #[arg(long, default_value_t = DEFAULT_MARKER)]
    marker: char,

    /// Plain console logging instead of the TUI
    #[arg(long)]
    console: bool,

    /// Replay a captured frame log instead of opening a port
    #[arg(long, conflicts_with_all = ["port", "console"])]
    replay: Option<PathBuf>,
}

fn parse_duration_arg(s: &str) -> std::result::Result<Duration, String> {
    duration::parse_duration(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if args.list_ports {
        return print_ports();
    }

    if let Some(ref path) = args.replay {
        let feed = ReplayFeed::new(path, args.retention, args.marker)?;
        return run_tui(Box::new(feed), args.window);
    }

    let port = match args.port {
        Some(port) => port,
        None => match select::prompt_for_port()? {
            Some(port) => port,
            None => {
                println!("No port selected.");
                return Ok(());
            }
        },
    };

    let mut config = MonitorConfig::new(port);
    config.baud_rate = args.baud;
    config.read_timeout = args.read_timeout;
    config.retention = args.retention;
    config.marker = args.marker;

    let mut monitor = SerialMonitor::new(config)?;
    println!("Connecting to {} ...", monitor.port());
    if !monitor.start() {
        bail!(
            "failed to connect: {}",
            monitor.error_message().unwrap_or_else(|| "no response".into())
        );
    }

    if args.console {
        run_console(monitor)
    } else {
        run_tui(Box::new(monitor), args.window)
    }
}

/// Print the port listing and exit.
fn print_ports() -> Result<()> {
    let ports = list_ports()?;
    if ports.is_empty() {
        println!("No serial ports found.");
        return Ok(());
    }
    println!("Available serial ports:");
    for port in &ports {
        println!("  {}", port.label());
    }
    Ok(())
}

/// Headless console mode: block for new data and print every new entry.
fn run_console(monitor: SerialMonitor) -> Result<()> {
    println!("Connected! Monitoring for frames... press Ctrl+C to stop.\n");

    let started = Instant::now();
    let mut last_seen: Option<Instant> = None;

    loop {
        let entries = monitor.wait_for_update(Duration::from_secs(1));
        for entry in &entries {
            if last_seen.map_or(true, |seen| entry.timestamp > seen) {
                println!("{}", app::format_entry(started, entry));
            }
        }
        if let Some(last) = entries.last() {
            last_seen = Some(last.timestamp);
        }

        if monitor.state() == LinkState::Failed {
            bail!(
                "link lost: {}",
                monitor.error_message().unwrap_or_else(|| "unknown error".into())
            );
        }
    }
}

/// Run the TUI against the given data feed.
fn run_tui(feed: Box<dyn DataFeed>, window: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let mut app = App::new(feed, window);
    app.refresh();

    let result = run_app(&mut terminal, &mut app);

    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(
                    0,
                    (area.height / 2).saturating_sub(2),
                    area.width,
                    5.min(area.height),
                );
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.view {
                View::Chart => ui::chart::render(frame, app, chunks[2]),
                View::Console => ui::console::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(50))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Pull new readings periodically
        if last_refresh.elapsed() >= REFRESH_INTERVAL {
            app.refresh();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}
