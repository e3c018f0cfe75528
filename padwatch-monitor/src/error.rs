//! Error types for the monitor crate.

use thiserror::Error;

/// Errors surfaced by the monitor crate's fallible entry points.
///
/// Operational failures during monitoring (connect refused, device
/// unplugged) deliberately do not go through this type - they are reported
/// through the facade's status fields instead, so readers keep working off
/// point-in-time state.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Port enumeration or access failed at the OS level.
    #[error("serial port error: {0}")]
    Port(#[from] serialport::Error),

    /// The monitor was constructed with unusable settings.
    #[error("invalid monitor configuration: {0}")]
    Config(String),
}
