//! The scrolling reading log view.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;

/// Render the console view: the tail of the scrollback that fits the area.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" console ({} lines) ", app.console_log.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if app.console_log.is_empty() {
        let placeholder = Paragraph::new(Line::from(" waiting for frames... "))
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    // Follow the tail: show the newest lines that fit inside the borders.
    let visible = area.height.saturating_sub(2) as usize;
    let skip = app.console_log.len().saturating_sub(visible);

    let items: Vec<ListItem> = app
        .console_log
        .iter()
        .skip(skip)
        .map(|line| ListItem::new(line.as_str()))
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
