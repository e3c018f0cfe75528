//! The windowed multi-channel chart view.
//!
//! One trace per pad channel plus the threshold trace, plotted against
//! seconds-ago over the app's time window, with a per-channel gauge strip
//! underneath.

use std::time::Instant;

use padwatch_monitor::{TimestampedReading, CHANNELS};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::{App, SeriesMode};

/// Render the chart view into `area`.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Min(8), Constraint::Length(3)]).split(area);
    render_chart(frame, app, chunks[0]);
    render_gauges(frame, app, chunks[1]);
}

fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let now = Instant::now();
    let window_secs = app.window.as_secs_f64();

    let series = channel_series(&app.entries, app.series, now);
    let threshold = threshold_series(&app.entries, now);

    let mut datasets: Vec<Dataset> = series
        .iter()
        .enumerate()
        .map(|(i, points)| {
            Dataset::default()
                .name(format!("ch{i}"))
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(app.theme.channel_style(i))
                .data(points)
        })
        .collect();
    datasets.push(
        Dataset::default()
            .name("thresh")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.threshold))
            .data(&threshold),
    );

    let (y_min, y_max) = y_bounds(&series, &threshold);

    let x_labels = vec![
        Span::raw(format!("-{window_secs:.0}s")),
        Span::raw(format!("-{:.0}s", window_secs / 2.0)),
        Span::raw("now".to_string()),
    ];
    let y_labels = vec![
        Span::raw(format!("{y_min:.1}")),
        Span::raw(format!("{:.1}", (y_min + y_max) / 2.0)),
        Span::raw(format!("{y_max:.1}")),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(format!(" {} ", app.series.label()))
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .x_axis(
            Axis::default()
                .title("seconds ago")
                .style(Style::default().fg(app.theme.border))
                .bounds([-window_secs, 0.0])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([y_min, y_max])
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}

/// One (seconds-ago, value) series per channel.
fn channel_series(
    entries: &[TimestampedReading],
    mode: SeriesMode,
    now: Instant,
) -> Vec<Vec<(f64, f64)>> {
    (0..CHANNELS)
        .map(|ch| {
            entries
                .iter()
                .map(|e| {
                    let age = now.saturating_duration_since(e.timestamp).as_secs_f64();
                    let value = match mode {
                        SeriesMode::Sensor => e.reading.sensor[ch],
                        SeriesMode::Raw => e.reading.raw[ch] as f64,
                    };
                    (-age, value)
                })
                .collect()
        })
        .collect()
}

fn threshold_series(entries: &[TimestampedReading], now: Instant) -> Vec<(f64, f64)> {
    entries
        .iter()
        .map(|e| {
            let age = now.saturating_duration_since(e.timestamp).as_secs_f64();
            (-age, e.reading.threshold)
        })
        .collect()
}

/// Y bounds covering every plotted point with a little headroom.
fn y_bounds(series: &[Vec<(f64, f64)>], threshold: &[(f64, f64)]) -> (f64, f64) {
    let values = series
        .iter()
        .flatten()
        .chain(threshold.iter())
        .map(|&(_, y)| y);

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for value in values {
        min = min.min(value);
        max = max.max(value);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }

    let pad = ((max - min) * 0.1).max(0.1);
    ((min - pad).min(0.0), max + pad)
}

/// Per-channel gauge strip: raw count and key state at the latest reading.
fn render_gauges(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" channels ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let line = match app.latest() {
        Some(entry) => {
            let mut spans = Vec::with_capacity(CHANNELS * 2);
            for ch in 0..CHANNELS {
                let mut style = app.theme.channel_style(ch);
                if entry.reading.keys[ch] {
                    style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
                }
                spans.push(Span::styled(
                    format!(" ch{ch} {:4} {}", entry.reading.raw[ch], key_glyph(entry, ch)),
                    style,
                ));
                spans.push(Span::raw("  "));
            }
            Line::from(spans)
        }
        None => Line::from(Span::styled(
            " waiting for frames... ",
            Style::default().add_modifier(Modifier::DIM),
        )),
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn key_glyph(entry: &TimestampedReading, channel: usize) -> char {
    if entry.reading.keys[channel] {
        '▮'
    } else {
        '▯'
    }
}
