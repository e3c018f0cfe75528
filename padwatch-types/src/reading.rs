//! Structured sensor readings decoded from controller debug frames.

use std::fmt;

/// Number of pad channels the controller reports in every frame.
pub const CHANNELS: usize = 4;

/// Default sentinel glyph marking a debug frame on the wire.
///
/// Firmware revisions may use a different glyph; the parser takes the
/// marker as a parameter rather than assuming this one.
pub const DEFAULT_MARKER: char = '★';

/// One decoded debug frame from the controller.
///
/// A frame carries the raw analog count of each channel, the signal level
/// after sensitivity scaling, the pressed/released state per channel, and
/// the adaptive trigger threshold in effect when the frame was emitted.
/// The fixed-size arrays encode the exactly-four-channels invariant in the
/// type: a `Reading` cannot exist with a short or long group.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    /// Raw analog counts per channel (nominally 0-1023).
    pub raw: [i32; CHANNELS],
    /// Signal level per channel after sensitivity scaling.
    pub sensor: [f64; CHANNELS],
    /// Pressed state per channel.
    pub keys: [bool; CHANNELS],
    /// Adaptive trigger threshold.
    pub threshold: f64,
}

impl Reading {
    /// Indices of the channels currently pressed.
    pub fn active_keys(&self) -> Vec<usize> {
        self.keys
            .iter()
            .enumerate()
            .filter(|(_, &pressed)| pressed)
            .map(|(i, _)| i)
            .collect()
    }

    /// Index and value of the loudest channel.
    pub fn peak_sensor(&self) -> (usize, f64) {
        let mut peak = 0;
        for i in 1..CHANNELS {
            if self.sensor[i] > self.sensor[peak] {
                peak = i;
            }
        }
        (peak, self.sensor[peak])
    }

    /// Render this reading back into the wire frame grammar.
    ///
    /// The result parses back to an equal reading within the printed
    /// precision; replay files and capture exports rely on that.
    pub fn to_frame_line(&self, marker: char) -> String {
        let raw = join(self.raw.iter().map(|v| v.to_string()));
        let sensor = join(self.sensor.iter().map(|v| format!("{v:.4}")));
        let keys = join(self.keys.iter().map(|&k| if k { "1" } else { "0" }.to_string()));
        format!(
            "{marker} RAW: {raw} | SENSOR: {sensor} | KEYS: {keys} | THRESH: {:.2}",
            self.threshold
        )
    }
}

fn join(parts: impl Iterator<Item = String>) -> String {
    parts.collect::<Vec<_>>().join(", ")
}

impl fmt::Display for Reading {
    /// Human-readable one-liner used by the console presenters.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = join(self.raw.iter().map(|v| format!("{v:3}")));
        let sensor = join(self.sensor.iter().map(|v| format!("{v:6.2}")));
        let keys: String = self.keys.iter().map(|&k| if k { 'X' } else { ' ' }).collect();
        write!(
            f,
            "RAW:[{raw}] SENSOR:[{sensor}] KEYS:[{keys}] THRESH:{:6.2}",
            self.threshold
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Reading {
        Reading {
            raw: [193, 187, 193, 196],
            sensor: [1.0, 4.2, 1.0, 3.3],
            keys: [true, false, false, true],
            threshold: 0.75,
        }
    }

    #[test]
    fn active_keys_returns_pressed_indices() {
        assert_eq!(sample().active_keys(), vec![0, 3]);
    }

    #[test]
    fn active_keys_empty_when_nothing_pressed() {
        let mut reading = sample();
        reading.keys = [false; CHANNELS];
        assert!(reading.active_keys().is_empty());
    }

    #[test]
    fn peak_sensor_finds_loudest_channel() {
        let (idx, value) = sample().peak_sensor();
        assert_eq!(idx, 1);
        assert!((value - 4.2).abs() < f64::EPSILON);
    }

    #[test]
    fn peak_sensor_prefers_first_on_tie() {
        let mut reading = sample();
        reading.sensor = [2.0, 2.0, 2.0, 2.0];
        assert_eq!(reading.peak_sensor().0, 0);
    }

    #[test]
    fn display_marks_pressed_keys() {
        let text = sample().to_string();
        assert!(text.contains("KEYS:[X  X]"), "got: {text}");
        assert!(text.contains("RAW:[193, 187, 193, 196]"));
    }

    #[test]
    fn frame_line_carries_all_groups() {
        let line = sample().to_frame_line(DEFAULT_MARKER);
        assert!(line.starts_with('★'));
        assert!(line.contains("RAW: 193, 187, 193, 196"));
        assert!(line.contains("SENSOR: 1.0000, 4.2000, 1.0000, 3.3000"));
        assert!(line.contains("KEYS: 1, 0, 0, 1"));
        assert!(line.contains("THRESH: 0.75"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip() {
        let reading = sample();
        let json = serde_json::to_string(&reading).unwrap();
        let parsed: Reading = serde_json::from_str(&json).unwrap();
        assert_eq!(reading, parsed);
    }
}
