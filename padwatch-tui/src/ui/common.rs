//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help
//! overlay.

use padwatch_monitor::LinkState;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::duration::format_duration;

/// Render the header bar with link status and the latest reading.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.link_state();

    let mut spans = vec![
        Span::styled(" ● ", app.theme.link_style(state)),
        Span::styled("PADWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::raw(app.feed_description().to_string()),
        Span::raw(" │ "),
        Span::styled(state.label(), app.theme.link_style(state)),
        Span::raw(" │ "),
        Span::raw(format!("{} frames", app.entries.len())),
    ];

    if let Some(entry) = app.latest() {
        let keys: String = entry
            .reading
            .keys
            .iter()
            .map(|&pressed| if pressed { 'X' } else { '·' })
            .collect();
        spans.push(Span::raw(" │ keys ["));
        spans.push(Span::styled(keys, Style::default().fg(app.theme.highlight)));
        spans.push(Span::raw(format!("] thresh {:.2}", entry.reading.threshold)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Chart "), Line::from(" 2:Console ")];

    let selected = match app.view {
        View::Chart => 0,
        View::Console => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows temporary messages first, then feed errors, then the usual
/// window/pause indicators and controls for the current view.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.status_message() {
        let paragraph =
            Paragraph::new(format!(" {msg} ")).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if app.link_state() == LinkState::Failed {
        let error = app.feed_error().unwrap_or_else(|| "link failed".into());
        let paragraph = Paragraph::new(format!(" Error: {error} | q:quit "))
            .style(Style::default().fg(app.theme.bad));
        frame.render_widget(paragraph, area);
        return;
    }

    let paused = if app.paused { "PAUSED | " } else { "" };
    let controls = match app.view {
        View::Chart => "m:series +/-:window p:pause Tab:switch ?:help q:quit",
        View::Console => "c:clear p:pause Tab:switch ?:help q:quit",
    };
    let status = format!(
        " {}window {} | {} | {}",
        paused,
        format_duration(app.window),
        app.series.label(),
        controls,
    );

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Views",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Tab ←/→     Switch views"),
        Line::from("  1           Chart view"),
        Line::from("  2           Console view"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Chart",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  m           Toggle sensor/raw series"),
        Line::from("  +/-         Grow/shrink time window"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  p/space     Pause display"),
        Line::from("  c           Clear console scrollback"),
        Line::from("  e           Export window to JSON"),
        Line::from("  q/Esc       Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 22u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
