//! Application state and navigation logic.

use std::collections::VecDeque;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use padwatch_monitor::{LinkState, TimestampedReading};

use crate::feed::DataFeed;
use crate::ui::Theme;

/// Lines of console scrollback kept beyond the buffer's retention window.
const CONSOLE_SCROLLBACK: usize = 500;

/// Bounds for the chart window adjustable with `+`/`-`.
const MIN_WINDOW: Duration = Duration::from_secs(1);
const MAX_WINDOW: Duration = Duration::from_secs(60);

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Live chart of sensor levels over the time window.
    Chart,
    /// Scrolling log of decoded readings.
    Console,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Chart => View::Console,
            View::Console => View::Chart,
        }
    }
}

/// Which value the chart plots per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesMode {
    /// Sensitivity-scaled signal level.
    Sensor,
    /// Raw analog counts.
    Raw,
}

impl SeriesMode {
    pub fn toggle(self) -> Self {
        match self {
            SeriesMode::Sensor => SeriesMode::Raw,
            SeriesMode::Raw => SeriesMode::Sensor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SeriesMode::Sensor => "sensor level",
            SeriesMode::Raw => "raw counts",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub view: View,
    pub show_help: bool,
    pub paused: bool,
    pub series: SeriesMode,
    pub window: Duration,
    pub theme: Theme,

    feed: Box<dyn DataFeed>,
    /// Entries inside the chart window, refreshed each tick.
    pub entries: Vec<TimestampedReading>,
    /// Formatted console lines, newest last.
    pub console_log: VecDeque<String>,
    last_seen: Option<Instant>,
    started: Instant,

    // Temporary feedback shown in the status bar.
    status_message: Option<(String, Instant)>,
}

impl App {
    /// Create the app around a data feed with the given chart window.
    pub fn new(feed: Box<dyn DataFeed>, window: Duration) -> Self {
        Self {
            running: true,
            view: View::Chart,
            show_help: false,
            paused: false,
            series: SeriesMode::Sensor,
            window,
            theme: Theme::auto_detect(),
            feed,
            entries: Vec::new(),
            console_log: VecDeque::new(),
            last_seen: None,
            started: Instant::now(),
            status_message: None,
        }
    }

    /// Pull the latest data out of the feed's buffer.
    ///
    /// While paused the display freezes but the feed keeps collecting.
    pub fn refresh(&mut self) {
        if self.paused {
            return;
        }

        let buffer = self.feed.buffer();
        let snapshot = buffer.snapshot();

        for entry in &snapshot {
            if self.last_seen.map_or(true, |seen| entry.timestamp > seen) {
                self.console_log.push_back(format_entry(self.started, entry));
                while self.console_log.len() > CONSOLE_SCROLLBACK {
                    self.console_log.pop_front();
                }
            }
        }
        if let Some(last) = snapshot.last() {
            self.last_seen = Some(last.timestamp);
        }

        self.entries = buffer.snapshot_since(self.window);
    }

    /// The newest entry currently displayed.
    pub fn latest(&self) -> Option<&TimestampedReading> {
        self.entries.last()
    }

    /// Description of the data feed for the header bar.
    pub fn feed_description(&self) -> &str {
        self.feed.description()
    }

    /// Link state of the data feed.
    pub fn link_state(&self) -> LinkState {
        self.feed.state()
    }

    /// Last feed error, if any.
    pub fn feed_error(&self) -> Option<String> {
        self.feed.error_message()
    }

    /// Wind the feed down; called once when the app exits.
    pub fn shutdown(&mut self) {
        self.feed.stop();
    }

    /// Set a temporary status message shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, at)) if at.elapsed() < Duration::from_secs(3) => Some(msg),
            _ => None,
        }
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn next_view(&mut self) {
        self.view = self.view.next();
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn toggle_series(&mut self) {
        self.series = self.series.toggle();
    }

    /// Widen the chart window (capped at one minute).
    pub fn grow_window(&mut self) {
        self.window = (self.window + Duration::from_secs(1)).min(MAX_WINDOW);
    }

    /// Narrow the chart window (floored at one second).
    pub fn shrink_window(&mut self) {
        self.window = self.window.saturating_sub(Duration::from_secs(1)).max(MIN_WINDOW);
    }

    /// Drop the console scrollback.
    pub fn clear_console(&mut self) {
        self.console_log.clear();
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the currently displayed window to a JSON file.
    pub fn export_capture(&self, path: &Path) -> Result<()> {
        use std::io::Write;

        let now = Instant::now();
        let entries: Vec<serde_json::Value> = self
            .entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "age_secs": now.saturating_duration_since(e.timestamp).as_secs_f64(),
                    "reading": &e.reading,
                })
            })
            .collect();

        let export = serde_json::json!({
            "window_secs": self.window.as_secs_f64(),
            "entries": entries,
        });

        let json = serde_json::to_string_pretty(&export)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// Format one entry the way the console shows it, stamped with the offset
/// from monitor start.
pub fn format_entry(started: Instant, entry: &TimestampedReading) -> String {
    let offset = entry.timestamp.saturating_duration_since(started);
    format!("[+{:9.3}s] {}", offset.as_secs_f64(), entry.reading)
}
