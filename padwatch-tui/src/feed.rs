//! Data feed abstraction: where the app's readings come from.
//!
//! The TUI renders off a [`ReadingBuffer`] regardless of whether the
//! readings arrive from live hardware or a replayed capture file; this
//! trait is the seam between the two.

use std::sync::Arc;

use padwatch_monitor::{LinkState, ReadingBuffer, SerialMonitor};

/// Source of readings consumed by the app.
pub trait DataFeed: Send {
    /// Shared handle to the buffer the feed writes into.
    fn buffer(&self) -> Arc<ReadingBuffer>;

    /// Human-readable description for the header bar.
    fn description(&self) -> &str;

    /// Current link state of the feed.
    fn state(&self) -> LinkState;

    /// Last error, if the feed failed.
    fn error_message(&self) -> Option<String>;

    /// Wind the feed down; called when the app exits.
    fn stop(&mut self);
}

impl DataFeed for SerialMonitor {
    fn buffer(&self) -> Arc<ReadingBuffer> {
        SerialMonitor::buffer(self)
    }

    fn description(&self) -> &str {
        self.port()
    }

    fn state(&self) -> LinkState {
        SerialMonitor::state(self)
    }

    fn error_message(&self) -> Option<String> {
        SerialMonitor::error_message(self)
    }

    fn stop(&mut self) {
        SerialMonitor::stop(self);
    }
}
