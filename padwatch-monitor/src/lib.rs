//! # padwatch-monitor
//!
//! Background serial ingestion for the padwatch diagnostic monitor.
//!
//! This crate owns the concurrent core of padwatch: a [`SerialMonitor`]
//! facade that runs a reader thread against the controller's serial link,
//! parses every debug frame it sees, and stores the results in a
//! time-windowed, thread-safe [`ReadingBuffer`]. Consumers (the console
//! logger, the chart view) only ever talk to the facade:
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use padwatch_monitor::{MonitorConfig, SerialMonitor};
//!
//! # fn main() -> Result<(), padwatch_monitor::MonitorError> {
//! let mut monitor = SerialMonitor::new(MonitorConfig::new("/dev/ttyACM0"))?;
//!
//! if monitor.start() {
//!     // Blocks until the next frame arrives (or one second passes).
//!     for entry in monitor.wait_for_update(Duration::from_secs(1)) {
//!         println!("{}", entry.reading);
//!     }
//! } else {
//!     eprintln!("connect failed: {:?}", monitor.error_message());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Dropping the monitor stops the reader thread and releases the port, so a
//! consumer that unwinds early never leaks the connection.
//!
//! ## Concurrency model
//!
//! Exactly one writer (the ingestion thread) appends to the buffer; any
//! number of readers take snapshots or block in
//! [`ReadingBuffer::wait_for_update`]. A single mutex-plus-condvar pair
//! guards the data, and every append wakes every waiter.

mod buffer;
mod error;
mod monitor;
mod ports;

pub use buffer::{ReadingBuffer, TimestampedReading, DEFAULT_RETENTION};
pub use error::MonitorError;
pub use monitor::{LinkState, MonitorConfig, SerialMonitor, DEFAULT_BAUD};
pub use ports::{list_ports, PortInfo};

// Re-export the frame types for convenience.
pub use padwatch_types::{FrameParser, ParseError, Reading, CHANNELS, DEFAULT_MARKER};
