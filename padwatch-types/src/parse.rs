//! Frame grammar parser.
//!
//! Debug frames arrive as text lines shaped like
//! `★ RAW: a,b,c,d | SENSOR: ... | KEYS: ... | THRESH: t`. The parser
//! strips the sentinel glyph, locates the payload inside the line (leading
//! and trailing noise is ignored) and decodes it into a [`Reading`].
//! Malformed input is an ordinary `Err` value: the parser has no side
//! effects, never panics, and never yields a partially filled reading.

use std::str::FromStr;

use thiserror::Error;

use crate::{Reading, CHANNELS, DEFAULT_MARKER};

/// Reasons a line failed to decode into a [`Reading`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line contains no `RAW:` payload at all.
    #[error("no frame payload in line")]
    NoPayload,
    /// A labeled group is absent or out of order.
    #[error("missing {0} group")]
    MissingGroup(&'static str),
    /// A numeric group does not hold exactly [`CHANNELS`] values.
    #[error("{group} group has {found} values, expected {expected}", expected = CHANNELS)]
    FieldCount { group: &'static str, found: usize },
    /// A token failed to parse as the expected kind of value.
    #[error("invalid {group} token `{token}`")]
    InvalidToken { group: &'static str, token: String },
}

/// Parser for controller debug frames.
///
/// The sentinel marker identifying debug frames varies between firmware
/// revisions, so it is a constructor parameter rather than a constant.
#[derive(Debug, Clone)]
pub struct FrameParser {
    marker: char,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

impl FrameParser {
    /// Create a parser recognizing the given sentinel glyph.
    pub fn new(marker: char) -> Self {
        Self { marker }
    }

    /// The sentinel glyph this parser strips.
    pub fn marker(&self) -> char {
        self.marker
    }

    /// Decode one line into a [`Reading`].
    ///
    /// The marker may appear anywhere in the line (or not at all - the
    /// grammar alone decides whether the line is a frame). Text outside the
    /// matched payload is ignored.
    pub fn parse(&self, line: &str) -> Result<Reading, ParseError> {
        let marker = self.marker;
        let cleaned: String = line.chars().filter(|&c| c != marker).collect();

        let start = cleaned.find("RAW:").ok_or(ParseError::NoPayload)?;
        let mut groups = cleaned[start..].split('|');

        let raw = fixed_group::<i32>(groups.next(), "RAW")?;
        let sensor = fixed_group::<f64>(groups.next(), "SENSOR")?;
        let keys = key_group(groups.next())?;
        let threshold = threshold_value(groups.next())?;

        Ok(Reading { raw, sensor, keys, threshold })
    }
}

/// Strip the `LABEL:` prefix from a group body, or report the group missing.
fn group_body<'a>(part: Option<&'a str>, label: &'static str) -> Result<&'a str, ParseError> {
    part.map(str::trim)
        .and_then(|p| p.strip_prefix(label))
        .and_then(|p| p.strip_prefix(':'))
        .ok_or(ParseError::MissingGroup(label))
}

fn fixed_group<T: FromStr>(
    part: Option<&str>,
    label: &'static str,
) -> Result<[T; CHANNELS], ParseError> {
    let body = group_body(part, label)?;
    let mut values = Vec::with_capacity(CHANNELS);
    for token in body.split(',') {
        let token = token.trim();
        values.push(token.parse::<T>().map_err(|_| ParseError::InvalidToken {
            group: label,
            token: token.to_string(),
        })?);
    }
    values
        .try_into()
        .map_err(|v: Vec<T>| ParseError::FieldCount { group: label, found: v.len() })
}

fn key_group(part: Option<&str>) -> Result<[bool; CHANNELS], ParseError> {
    let body = group_body(part, "KEYS")?;
    let mut states = Vec::with_capacity(CHANNELS);
    for token in body.split(',') {
        let token = token.trim();
        states.push(match token {
            "0" => false,
            "1" => true,
            _ => {
                return Err(ParseError::InvalidToken {
                    group: "KEYS",
                    token: token.to_string(),
                })
            }
        });
    }
    states
        .try_into()
        .map_err(|v: Vec<bool>| ParseError::FieldCount { group: "KEYS", found: v.len() })
}

/// The threshold group ends the frame, so anything after the leading number
/// (sender line-noise, partial next frame) is ignored.
fn threshold_value(part: Option<&str>) -> Result<f64, ParseError> {
    let body = group_body(part, "THRESH")?.trim_start();
    let end = body
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+')))
        .unwrap_or(body.len());
    let token = &body[..end];
    if token.is_empty() {
        return Err(ParseError::InvalidToken {
            group: "THRESH",
            token: body.trim_end().to_string(),
        });
    }
    token.parse::<f64>().map_err(|_| ParseError::InvalidToken {
        group: "THRESH",
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: &str = "★ RAW: 193, 187, 193, 196 | SENSOR: 1.0000, 4.2000, 1.0000, 3.3000 | KEYS: 1, 1, 1, 1 | THRESH: 0.00";

    fn parser() -> FrameParser {
        FrameParser::default()
    }

    #[test]
    fn parses_reference_frame() {
        let reading = parser().parse(FRAME).unwrap();
        assert_eq!(reading.raw, [193, 187, 193, 196]);
        assert_eq!(reading.sensor, [1.0, 4.2, 1.0, 3.3]);
        assert_eq!(reading.keys, [true, true, true, true]);
        assert_eq!(reading.threshold, 0.0);
    }

    #[test]
    fn parse_is_deterministic() {
        assert_eq!(parser().parse(FRAME).unwrap(), parser().parse(FRAME).unwrap());
    }

    #[test]
    fn garbage_line_is_rejected() {
        assert_eq!(parser().parse("garbage no markers here"), Err(ParseError::NoPayload));
    }

    #[test]
    fn empty_line_is_rejected() {
        assert_eq!(parser().parse(""), Err(ParseError::NoPayload));
    }

    #[test]
    fn marker_is_optional() {
        let line = FRAME.trim_start_matches(['★', ' ']);
        assert!(parser().parse(line).is_ok());
    }

    #[test]
    fn marker_anywhere_in_line_is_stripped() {
        let line = "RAW: 1, 2, 3, 4 | SENSOR: 1.0, 2.0, 3.0, 4.0 | KEYS: 0★, 1, 0, 1 | THRESH: 2.5";
        let reading = parser().parse(line).unwrap();
        assert_eq!(reading.keys, [false, true, false, true]);
    }

    #[test]
    fn custom_marker_is_honored() {
        let custom = FrameParser::new('#');
        let line = "# RAW: 1, 2, 3, 4 | SENSOR: 1.0, 2.0, 3.0, 4.0 | KEYS: 0, 0, 0, 0 | THRESH: 1.0";
        assert!(custom.parse(line).is_ok());
    }

    #[test]
    fn surrounding_noise_is_ignored() {
        let line = format!("[boot] noise before {FRAME} trailing junk");
        let reading = parser().parse(&line).unwrap();
        assert_eq!(reading.raw, [193, 187, 193, 196]);
        assert_eq!(reading.threshold, 0.0);
    }

    #[test]
    fn three_values_in_group_is_rejected() {
        let line = "★ RAW: 1, 2, 3 | SENSOR: 1.0, 2.0, 3.0, 4.0 | KEYS: 1, 1, 1, 1 | THRESH: 0.5";
        assert_eq!(
            parser().parse(line),
            Err(ParseError::FieldCount { group: "RAW", found: 3 })
        );
    }

    #[test]
    fn five_values_in_group_is_rejected() {
        let line =
            "★ RAW: 1, 2, 3, 4 | SENSOR: 1.0, 2.0, 3.0, 4.0, 5.0 | KEYS: 1, 1, 1, 1 | THRESH: 0.5";
        assert_eq!(
            parser().parse(line),
            Err(ParseError::FieldCount { group: "SENSOR", found: 5 })
        );
    }

    #[test]
    fn short_key_group_is_rejected() {
        let line = "★ RAW: 1, 2, 3, 4 | SENSOR: 1.0, 2.0, 3.0, 4.0 | KEYS: 1, 0 | THRESH: 0.5";
        assert_eq!(
            parser().parse(line),
            Err(ParseError::FieldCount { group: "KEYS", found: 2 })
        );
    }

    #[test]
    fn non_numeric_token_is_rejected() {
        let line = "★ RAW: 1, two, 3, 4 | SENSOR: 1.0, 2.0, 3.0, 4.0 | KEYS: 1, 1, 1, 1 | THRESH: 0.5";
        assert_eq!(
            parser().parse(line),
            Err(ParseError::InvalidToken { group: "RAW", token: "two".into() })
        );
    }

    #[test]
    fn float_in_raw_group_is_rejected() {
        let line =
            "★ RAW: 1.5, 2, 3, 4 | SENSOR: 1.0, 2.0, 3.0, 4.0 | KEYS: 1, 1, 1, 1 | THRESH: 0.5";
        assert!(matches!(
            parser().parse(line),
            Err(ParseError::InvalidToken { group: "RAW", .. })
        ));
    }

    #[test]
    fn key_token_other_than_binary_is_rejected() {
        let line = "★ RAW: 1, 2, 3, 4 | SENSOR: 1.0, 2.0, 3.0, 4.0 | KEYS: 1, 2, 1, 1 | THRESH: 0.5";
        assert_eq!(
            parser().parse(line),
            Err(ParseError::InvalidToken { group: "KEYS", token: "2".into() })
        );
    }

    #[test]
    fn missing_group_is_rejected() {
        let line = "★ RAW: 1, 2, 3, 4 | SENSOR: 1.0, 2.0, 3.0, 4.0 | THRESH: 0.5";
        assert_eq!(parser().parse(line), Err(ParseError::MissingGroup("KEYS")));
    }

    #[test]
    fn groups_out_of_order_are_rejected() {
        let line = "★ RAW: 1, 2, 3, 4 | KEYS: 1, 1, 1, 1 | SENSOR: 1.0, 2.0, 3.0, 4.0 | THRESH: 0.5";
        assert_eq!(parser().parse(line), Err(ParseError::MissingGroup("SENSOR")));
    }

    #[test]
    fn bad_threshold_is_rejected() {
        let line = "★ RAW: 1, 2, 3, 4 | SENSOR: 1.0, 2.0, 3.0, 4.0 | KEYS: 1, 1, 1, 1 | THRESH: x";
        assert!(matches!(
            parser().parse(line),
            Err(ParseError::InvalidToken { group: "THRESH", .. })
        ));
    }

    #[test]
    fn trailing_text_after_threshold_is_ignored() {
        let line =
            "★ RAW: 1, 2, 3, 4 | SENSOR: 1.0, 2.0, 3.0, 4.0 | KEYS: 1, 1, 1, 1 | THRESH: 12.50 tail";
        assert_eq!(parser().parse(line).unwrap().threshold, 12.5);
    }

    #[test]
    fn whitespace_is_tolerated() {
        let line = "★RAW:1,2,3,4|SENSOR:  1.0 ,2.0,3.0,  4.0 |KEYS: 0,1 , 0,1|THRESH:3.25";
        let reading = parser().parse(line).unwrap();
        assert_eq!(reading.raw, [1, 2, 3, 4]);
        assert_eq!(reading.keys, [false, true, false, true]);
        assert_eq!(reading.threshold, 3.25);
    }

    #[test]
    fn rendered_frame_roundtrips() {
        let original = parser().parse(FRAME).unwrap();
        let rendered = original.to_frame_line(DEFAULT_MARKER);
        let reparsed = parser().parse(&rendered).unwrap();
        assert_eq!(original.raw, reparsed.raw);
        assert_eq!(original.keys, reparsed.keys);
        for i in 0..CHANNELS {
            assert!((original.sensor[i] - reparsed.sensor[i]).abs() < 1e-4);
        }
        assert!((original.threshold - reparsed.threshold).abs() < 1e-2);
    }
}
