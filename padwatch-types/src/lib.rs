//! # padwatch-types
//!
//! Core types for the padwatch diagnostic monitor: the debug frame grammar
//! spoken by the pad controller and the structured [`Reading`] it decodes to.
//!
//! The controller emits newline-terminated text frames over its serial link.
//! A frame of interest carries a sentinel glyph (`★` by default) and four
//! labeled groups:
//!
//! ```text
//! ★ RAW: 193, 187, 193, 196 | SENSOR: 1.0000, 4.2000, 1.0000, 3.3000 | KEYS: 1, 1, 1, 1 | THRESH: 0.00
//! ```
//!
//! [`FrameParser`] turns such a line into a [`Reading`]; anything that does
//! not match the grammar comes back as a [`ParseError`] value, never a panic
//! and never a partially filled reading.
//!
//! ## Features
//!
//! - `serde`: serialization support for [`Reading`] via serde derives
//!
//! ## Example
//!
//! ```rust
//! use padwatch_types::FrameParser;
//!
//! let parser = FrameParser::default();
//! let line = "★ RAW: 10, 20, 30, 40 | SENSOR: 0.5, 1.5, 2.5, 3.5 | KEYS: 1, 0, 0, 1 | THRESH: 1.25";
//!
//! let reading = parser.parse(line).unwrap();
//! assert_eq!(reading.raw, [10, 20, 30, 40]);
//! assert_eq!(reading.active_keys(), vec![0, 3]);
//! ```

mod parse;
mod reading;

pub use parse::{FrameParser, ParseError};
pub use reading::{Reading, CHANNELS, DEFAULT_MARKER};
