//! Parsing and formatting of duration flags like `10s`, `250ms` or bare `4`.

use std::time::Duration;

use anyhow::{bail, Result};

/// Parse a human duration string. A bare number means seconds.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        bail!("empty duration");
    }

    let (number, unit) = match s.find(|c: char| c.is_ascii_alphabetic() || c == 'µ') {
        Some(idx) => (&s[..idx], &s[idx..]),
        None => (s, "s"),
    };

    let value: f64 = number.trim().parse()?;
    if value < 0.0 {
        bail!("negative duration: {s}");
    }

    let secs = match unit {
        "s" | "sec" | "secs" => value,
        "ms" => value / 1_000.0,
        "us" | "µs" => value / 1_000_000.0,
        "m" | "min" => value * 60.0,
        _ => bail!("unknown duration unit `{unit}`"),
    };

    Ok(Duration::from_secs_f64(secs))
}

/// Format a duration the way the status bar shows it.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs >= 1.0 {
        if (secs - secs.round()).abs() < 1e-9 {
            format!("{}s", secs.round() as u64)
        } else {
            format!("{secs:.1}s")
        }
    } else {
        format!("{}ms", d.as_millis())
    }
}
