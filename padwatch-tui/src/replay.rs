//! File replay feed.
//!
//! Replays a captured frame log through the real parser into a
//! [`ReadingBuffer`], paced to roughly the rate the controller emits at,
//! so the TUI can be exercised without hardware attached.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use padwatch_monitor::{FrameParser, LinkState, ReadingBuffer};

use crate::feed::DataFeed;

/// Delay between replayed lines (~100 frames/s, the firmware's debug rate).
const PACE: Duration = Duration::from_millis(10);

/// A [`DataFeed`] backed by a captured frame log on disk.
pub struct ReplayFeed {
    buffer: Arc<ReadingBuffer>,
    description: String,
    finished: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ReplayFeed {
    /// Open `path` and start replaying its lines in the background.
    ///
    /// An unreadable file fails here, before any UI comes up; unparseable
    /// lines inside the file are skipped the same way the live loop skips
    /// them.
    pub fn new(path: &Path, retention: Duration, marker: char) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open replay file {}", path.display()))?;

        let buffer = Arc::new(ReadingBuffer::new(retention));
        let finished = Arc::new(AtomicBool::new(false));
        let stop = Arc::new(AtomicBool::new(false));
        let parser = FrameParser::new(marker);

        let worker = {
            let buffer = Arc::clone(&buffer);
            let finished = Arc::clone(&finished);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                for line in BufReader::new(file).lines() {
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                    let Ok(line) = line else { break };
                    match parser.parse(&line) {
                        Ok(reading) => buffer.push(reading),
                        Err(err) => tracing::trace!(%err, "skipped replay line"),
                    }
                    thread::sleep(PACE);
                }
                finished.store(true, Ordering::Relaxed);
            })
        };

        Ok(Self {
            buffer,
            description: format!("replay: {}", path.display()),
            finished,
            stop,
            worker: Some(worker),
        })
    }
}

impl DataFeed for ReplayFeed {
    fn buffer(&self) -> Arc<ReadingBuffer> {
        Arc::clone(&self.buffer)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn state(&self) -> LinkState {
        if self.finished.load(Ordering::Relaxed) {
            LinkState::Stopped
        } else {
            LinkState::Connected
        }
    }

    fn error_message(&self) -> Option<String> {
        None
    }

    fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for ReplayFeed {
    fn drop(&mut self) {
        DataFeed::stop(self);
    }
}
