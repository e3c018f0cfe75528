//! The serial monitor facade and its background ingestion loop.
//!
//! [`SerialMonitor`] owns one reader thread. The thread opens the port,
//! reads lines bounded by the serial timeout, parses each one, and pushes
//! successes into the shared [`ReadingBuffer`]. Malformed or partial frames
//! (normal around sender startup and shutdown) are dropped without ceremony.
//! The facade tracks the link state and is the only object consumers touch.

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use padwatch_types::{FrameParser, DEFAULT_MARKER};
use parking_lot::{Condvar, Mutex};

use crate::buffer::{ReadingBuffer, TimestampedReading, DEFAULT_RETENTION};
use crate::error::MonitorError;

/// Baud rate the controller firmware talks at.
pub const DEFAULT_BAUD: u32 = 115_200;

/// Serial read timeout. Also bounds how long the loop can take to notice a
/// stop request.
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// How long `start()` waits for the initial connect/fail signal.
const DEFAULT_CONNECT_WAIT: Duration = Duration::from_millis(500);

/// Longest line the ingestion loop will accumulate before discarding it.
const MAX_LINE: usize = 1024;

/// Settings for a [`SerialMonitor`].
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Serial device to monitor, e.g. `/dev/ttyACM0` or `COM3`.
    pub port: String,
    /// Baud rate, default [`DEFAULT_BAUD`].
    pub baud_rate: u32,
    /// Per-read serial timeout, default 1s.
    pub read_timeout: Duration,
    /// Buffer retention window, default [`DEFAULT_RETENTION`].
    pub retention: Duration,
    /// Sentinel glyph identifying debug frames, default `★`.
    pub marker: char,
    /// How long `start()` blocks waiting for the connect outcome.
    pub connect_wait: Duration,
}

impl MonitorConfig {
    /// Config for the given port with controller defaults everywhere else.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD,
            read_timeout: DEFAULT_READ_TIMEOUT,
            retention: DEFAULT_RETENTION,
            marker: DEFAULT_MARKER,
            connect_wait: DEFAULT_CONNECT_WAIT,
        }
    }

    fn validate(&self) -> Result<(), MonitorError> {
        if self.port.trim().is_empty() {
            return Err(MonitorError::Config("port name is empty".into()));
        }
        if self.baud_rate == 0 {
            return Err(MonitorError::Config("baud rate must be non-zero".into()));
        }
        if self.retention.is_zero() {
            return Err(MonitorError::Config("retention window must be non-zero".into()));
        }
        if self.read_timeout.is_zero() {
            return Err(MonitorError::Config("read timeout must be non-zero".into()));
        }
        Ok(())
    }
}

/// Lifecycle of the serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Monitor constructed, never started.
    Idle,
    /// Reader thread is opening the port.
    Connecting,
    /// Port is open and frames are being ingested.
    Connected,
    /// Stopped on request. Terminal until the next `start()`.
    Stopped,
    /// Connect or runtime I/O failure; see `error_message()`.
    Failed,
}

impl LinkState {
    /// Short label for status displays.
    pub fn label(&self) -> &'static str {
        match self {
            LinkState::Idle => "idle",
            LinkState::Connecting => "connecting",
            LinkState::Connected => "connected",
            LinkState::Stopped => "stopped",
            LinkState::Failed => "failed",
        }
    }
}

/// State shared between the facade and the reader thread.
#[derive(Debug)]
struct Shared {
    state: Mutex<LinkState>,
    state_changed: Condvar,
    error: Mutex<Option<String>>,
    stop: AtomicBool,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: Mutex::new(LinkState::Idle),
            state_changed: Condvar::new(),
            error: Mutex::new(None),
            stop: AtomicBool::new(false),
        }
    }

    fn state(&self) -> LinkState {
        *self.state.lock()
    }

    fn set_state(&self, next: LinkState) {
        *self.state.lock() = next;
        self.state_changed.notify_all();
    }

    fn fail(&self, message: String) {
        tracing::error!(%message, "serial monitor failed");
        *self.error.lock() = Some(message);
        self.set_state(LinkState::Failed);
    }
}

/// Lifecycle wrapper around the ingestion loop and the reading buffer.
///
/// `start()` spawns the reader thread and reports whether the link came up;
/// `stop()` (also run on drop) winds it down and releases the port. All
/// data access delegates to the internal [`ReadingBuffer`].
#[derive(Debug)]
pub struct SerialMonitor {
    config: MonitorConfig,
    parser: FrameParser,
    buffer: Arc<ReadingBuffer>,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl SerialMonitor {
    /// Build a monitor for the configured port.
    ///
    /// Only configuration misuse fails here; connect failures are reported
    /// through [`SerialMonitor::start`] and [`SerialMonitor::error_message`].
    pub fn new(config: MonitorConfig) -> Result<Self, MonitorError> {
        config.validate()?;
        Ok(Self {
            parser: FrameParser::new(config.marker),
            buffer: Arc::new(ReadingBuffer::new(config.retention)),
            shared: Arc::new(Shared::new()),
            worker: None,
            config,
        })
    }

    /// Spawn the ingestion thread and wait (bounded by `connect_wait`) for
    /// the initial connect/fail outcome. Returns whether the link came up.
    ///
    /// Calling `start()` while the monitor is already running is a no-op
    /// that returns `true`.
    pub fn start(&mut self) -> bool {
        if self.worker.as_ref().is_some_and(|w| !w.is_finished()) {
            tracing::warn!(port = %self.config.port, "monitor already running");
            return true;
        }

        self.shared.stop.store(false, Ordering::Relaxed);
        *self.shared.error.lock() = None;
        self.shared.set_state(LinkState::Connecting);

        let config = self.config.clone();
        let parser = self.parser.clone();
        let buffer = Arc::clone(&self.buffer);
        let shared = Arc::clone(&self.shared);

        let spawned = thread::Builder::new()
            .name("padwatch-ingest".into())
            .spawn(move || read_loop(config, parser, buffer, shared));
        match spawned {
            Ok(handle) => self.worker = Some(handle),
            Err(e) => {
                self.shared.fail(format!("failed to spawn ingest thread: {e}"));
                return false;
            }
        }

        let deadline = Instant::now() + self.config.connect_wait;
        let mut state = self.shared.state.lock();
        while *state == LinkState::Connecting {
            if self.shared.state_changed.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        *state == LinkState::Connected
    }

    /// Request cancellation, join the reader thread, and discard buffered
    /// readings. Idempotent.
    ///
    /// The reader polls the stop flag at least once per read timeout, so
    /// the join is bounded by roughly one timeout interval.
    pub fn stop(&mut self) {
        self.shared.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                tracing::error!(port = %self.config.port, "ingest thread panicked");
            }
        }
        if self.shared.state() != LinkState::Failed {
            self.shared.set_state(LinkState::Stopped);
        }
        self.buffer.clear();
    }

    /// Current link state.
    pub fn state(&self) -> LinkState {
        self.shared.state()
    }

    /// Whether the serial link is currently up.
    pub fn is_connected(&self) -> bool {
        self.state() == LinkState::Connected
    }

    /// The last connect or I/O error, if the monitor failed.
    pub fn error_message(&self) -> Option<String> {
        self.shared.error.lock().clone()
    }

    /// The port this monitor was built for.
    pub fn port(&self) -> &str {
        &self.config.port
    }

    /// Shared handle to the reading buffer, for readers that poll directly.
    pub fn buffer(&self) -> Arc<ReadingBuffer> {
        Arc::clone(&self.buffer)
    }

    /// See [`ReadingBuffer::snapshot`].
    pub fn snapshot(&self) -> Vec<TimestampedReading> {
        self.buffer.snapshot()
    }

    /// See [`ReadingBuffer::snapshot_since`].
    pub fn snapshot_since(&self, window: Duration) -> Vec<TimestampedReading> {
        self.buffer.snapshot_since(window)
    }

    /// See [`ReadingBuffer::wait_for_update`].
    pub fn wait_for_update(&self, timeout: Duration) -> Vec<TimestampedReading> {
        self.buffer.wait_for_update(timeout)
    }

    /// See [`ReadingBuffer::latest`].
    pub fn latest(&self) -> Option<TimestampedReading> {
        self.buffer.latest()
    }
}

impl Drop for SerialMonitor {
    /// Stopping on drop guarantees the port is released even when the
    /// consumer unwinds early.
    fn drop(&mut self) {
        self.stop();
    }
}

/// How the ingestion loop ended.
enum Outcome {
    Stopped,
    Failed(String),
}

fn read_loop(
    config: MonitorConfig,
    parser: FrameParser,
    buffer: Arc<ReadingBuffer>,
    shared: Arc<Shared>,
) {
    let opened = serialport::new(config.port.as_str(), config.baud_rate)
        .timeout(config.read_timeout)
        .open();
    let mut port = match opened {
        Ok(port) => port,
        Err(e) => {
            shared.fail(format!("failed to open {}: {e}", config.port));
            return;
        }
    };

    shared.set_state(LinkState::Connected);
    tracing::info!(port = %config.port, baud = config.baud_rate, "serial link up");

    let outcome = pump(&mut port, &parser, &buffer, &shared);

    // The handle is dropped here on every exit path, releasing the device.
    drop(port);

    match outcome {
        Outcome::Stopped => {
            tracing::info!(port = %config.port, "serial link closed");
            shared.set_state(LinkState::Stopped);
        }
        Outcome::Failed(message) => shared.fail(message),
    }
}

/// Core read loop, generic over the byte source so tests can drive it with
/// an in-memory reader.
fn pump(
    reader: &mut dyn Read,
    parser: &FrameParser,
    buffer: &ReadingBuffer,
    shared: &Shared,
) -> Outcome {
    let mut chunk = [0u8; 256];
    let mut pending: Vec<u8> = Vec::with_capacity(MAX_LINE);
    let mut overflowed = false;

    loop {
        if shared.stop.load(Ordering::Relaxed) {
            return Outcome::Stopped;
        }

        match reader.read(&mut chunk) {
            Ok(0) => return Outcome::Failed("serial device disconnected".into()),
            Ok(n) => {
                for &byte in &chunk[..n] {
                    if byte == b'\n' {
                        if overflowed {
                            overflowed = false;
                        } else {
                            handle_line(parser, buffer, &pending);
                        }
                        pending.clear();
                    } else if pending.len() >= MAX_LINE {
                        // A babbling device with no newlines must not grow
                        // memory; drop the rest of this line.
                        pending.clear();
                        overflowed = true;
                    } else if !overflowed {
                        pending.push(byte);
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                // Empty read; loop back around and re-check the stop flag.
            }
            Err(e) => return Outcome::Failed(format!("read error: {e}")),
        }
    }
}

/// Decode and parse one complete line, storing the reading on success.
fn handle_line(parser: &FrameParser, buffer: &ReadingBuffer, bytes: &[u8]) {
    // Undecodable byte sequences are expected around sender startup; the
    // whole line is dropped.
    let Ok(text) = std::str::from_utf8(bytes) else {
        return;
    };
    let line = text.trim();
    if line.is_empty() {
        return;
    }
    match parser.parse(line) {
        Ok(reading) => buffer.push(reading),
        Err(err) => tracing::trace!(%err, "dropped unparseable line"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const FRAME: &str = "★ RAW: 193, 187, 193, 196 | SENSOR: 1.0000, 4.2000, 1.0000, 3.3000 | KEYS: 1, 1, 1, 1 | THRESH: 0.00";

    fn fixtures() -> (FrameParser, ReadingBuffer, Shared) {
        (
            FrameParser::default(),
            ReadingBuffer::new(DEFAULT_RETENTION),
            Shared::new(),
        )
    }

    #[test]
    fn config_defaults_match_the_controller() {
        let config = MonitorConfig::new("COM3");
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.read_timeout, Duration::from_secs(1));
        assert_eq!(config.retention, Duration::from_secs(10));
        assert_eq!(config.marker, '★');
    }

    #[test]
    fn empty_port_is_rejected_at_construction() {
        let result = SerialMonitor::new(MonitorConfig::new("  "));
        assert!(matches!(result, Err(MonitorError::Config(_))));
    }

    #[test]
    fn zero_baud_is_rejected_at_construction() {
        let mut config = MonitorConfig::new("COM3");
        config.baud_rate = 0;
        assert!(matches!(SerialMonitor::new(config), Err(MonitorError::Config(_))));
    }

    #[test]
    fn start_on_missing_device_reports_failure() {
        let mut config = MonitorConfig::new("/dev/padwatch-no-such-device");
        config.connect_wait = Duration::from_secs(2);
        let mut monitor = SerialMonitor::new(config).unwrap();

        assert!(!monitor.start());
        assert_eq!(monitor.state(), LinkState::Failed);
        assert!(!monitor.is_connected());
        let message = monitor.error_message().expect("error should be recorded");
        assert!(message.contains("failed to open"), "got: {message}");

        // stop() after failure is a safe no-op, twice over.
        monitor.stop();
        monitor.stop();
        assert_eq!(monitor.state(), LinkState::Failed);
    }

    #[test]
    fn pump_ingests_good_lines_and_skips_noise() {
        let (parser, buffer, shared) = fixtures();
        let mut wire = Vec::new();
        wire.extend_from_slice(FRAME.as_bytes());
        wire.extend_from_slice(b"\r\n");
        wire.extend_from_slice(b"bootloader chatter\n");
        wire.extend_from_slice(&[0xff, 0xfe, b'\n']); // undecodable line
        wire.extend_from_slice(b"\n"); // blank line
        wire.extend_from_slice(FRAME.as_bytes());
        wire.extend_from_slice(b"\n");

        let outcome = pump(&mut Cursor::new(wire), &parser, &buffer, &shared);

        // EOF on the reader looks like the device going away.
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.latest().unwrap().reading.raw, [193, 187, 193, 196]);
    }

    #[test]
    fn pump_honors_stop_flag_before_reading() {
        let (parser, buffer, shared) = fixtures();
        shared.stop.store(true, Ordering::Relaxed);

        let mut wire = Cursor::new(format!("{FRAME}\n").into_bytes());
        let outcome = pump(&mut wire, &parser, &buffer, &shared);

        assert!(matches!(outcome, Outcome::Stopped));
        assert!(buffer.is_empty());
    }

    #[test]
    fn pump_drops_oversized_lines() {
        let (parser, buffer, shared) = fixtures();
        let mut wire = Vec::new();
        wire.extend_from_slice(&vec![b'x'; MAX_LINE * 2]);
        wire.push(b'\n');
        wire.extend_from_slice(FRAME.as_bytes());
        wire.push(b'\n');

        let _ = pump(&mut Cursor::new(wire), &parser, &buffer, &shared);

        // Only the frame after the oversized line survives.
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn handle_line_ignores_partial_frames() {
        let (parser, buffer, _) = fixtures();
        handle_line(&parser, &buffer, b"\xe2 RAW: 1, 2"); // truncated mid-frame
        handle_line(&parser, &buffer, b"RAW: 1, 2, 3 | SENSOR: 1, 2, 3, 4 | KEYS: 1, 1, 1, 1 | THRESH: 1");
        assert!(buffer.is_empty());
    }

    #[test]
    fn dropping_a_running_monitor_is_clean() {
        let mut config = MonitorConfig::new("/dev/padwatch-no-such-device");
        config.connect_wait = Duration::from_millis(100);
        let mut monitor = SerialMonitor::new(config).unwrap();
        let _ = monitor.start();
        drop(monitor); // must not hang or panic
    }
}
