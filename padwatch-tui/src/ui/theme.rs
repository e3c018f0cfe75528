//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use padwatch_monitor::{LinkState, CHANNELS};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic selection based on the
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for a healthy/connected link.
    pub good: Color,
    /// Color for transitional states (connecting, stopped).
    pub warning: Color,
    /// Color for a failed link.
    pub bad: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for titles and emphasized labels.
    pub header: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
    /// One trace color per pad channel.
    pub channels: [Color; CHANNELS],
    /// Color of the threshold trace.
    pub threshold: Color,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            good: Color::Green,
            warning: Color::Yellow,
            bad: Color::Red,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
            channels: [Color::Red, Color::Green, Color::Blue, Color::Yellow],
            threshold: Color::Magenta,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            good: Color::Green,
            warning: Color::Yellow,
            bad: Color::Red,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
            channels: [Color::Red, Color::Green, Color::Blue, Color::LightYellow],
            threshold: Color::Magenta,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get the style for a link state
    pub fn link_style(&self, state: LinkState) -> Style {
        match state {
            LinkState::Connected => Style::default().fg(self.good),
            LinkState::Idle | LinkState::Connecting | LinkState::Stopped => {
                Style::default().fg(self.warning)
            }
            LinkState::Failed => Style::default().fg(self.bad).add_modifier(Modifier::BOLD),
        }
    }

    /// Trace style for a pad channel.
    pub fn channel_style(&self, channel: usize) -> Style {
        Style::default().fg(self.channels[channel % CHANNELS])
    }
}
