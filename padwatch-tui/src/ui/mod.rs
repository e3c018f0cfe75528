//! Terminal rendering.
//!
//! - [`theme`]: colors and styles, with terminal background auto-detection
//! - [`common`]: header bar, tab bar, status bar, help overlay
//! - [`chart`]: the windowed multi-channel chart view
//! - [`console`]: the scrolling reading log view

pub mod chart;
pub mod common;
pub mod console;
pub mod theme;

pub use theme::Theme;
