//! Normalized line-range specifiers.
//!
//! Scanners emit the matched-lines field in several shapes: the string
//! `"all"`, a single line (`"10"` or the bare number `10`), or comma-separated
//! ranges (`"10-12,40"`). Everything is normalized into one tagged
//! representation at load time; malformed input is tolerated and degrades to
//! `Unbounded` rather than failing the load.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An inclusive line range. A single line is a range with `start == end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl LineRange {
    pub fn new(start: u32, end: u32) -> Self {
        LineRange { start, end }
    }

    pub fn contains(&self, line: u32) -> bool {
        self.start <= line && line <= self.end
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Normalized matched-lines specifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineSpec {
    /// Whole file (`"all"`, or anything that could not be parsed).
    Unbounded,
    /// Exactly one line.
    Single(u32),
    /// One or more explicit ranges.
    Ranges(Vec<LineRange>),
}

impl LineSpec {
    /// Parse the scanner's string form. Never fails: unparseable input is
    /// `Unbounded`, which downstream treats like a whole-file match.
    pub fn parse(raw: &str) -> LineSpec {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return LineSpec::Unbounded;
        }

        if let Ok(line) = trimmed.parse::<u32>() {
            return LineSpec::Single(line);
        }

        let mut ranges = Vec::new();
        for segment in trimmed.split(',') {
            match parse_segment(segment.trim()) {
                Some(range) => ranges.push(range),
                None => return LineSpec::Unbounded,
            }
        }
        match ranges.as_slice() {
            [] => LineSpec::Unbounded,
            [only] if only.start == only.end => LineSpec::Single(only.start),
            _ => LineSpec::Ranges(ranges),
        }
    }

    /// Concrete ranges, one per deep-link anchor. `Unbounded` has none.
    pub fn concrete_ranges(&self) -> Vec<LineRange> {
        match self {
            LineSpec::Unbounded => Vec::new(),
            LineSpec::Single(line) => vec![LineRange::new(*line, *line)],
            LineSpec::Ranges(ranges) => ranges.clone(),
        }
    }

    pub fn contains_line(&self, line: u32) -> bool {
        match self {
            LineSpec::Unbounded => true,
            LineSpec::Single(single) => *single == line,
            LineSpec::Ranges(ranges) => ranges.iter().any(|r| r.contains(line)),
        }
    }

    /// Canonical string form, also used for serialization.
    pub fn canonical(&self) -> String {
        match self {
            LineSpec::Unbounded => "all".to_string(),
            LineSpec::Single(line) => line.to_string(),
            LineSpec::Ranges(ranges) => ranges
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

fn parse_segment(segment: &str) -> Option<LineRange> {
    if segment.is_empty() {
        return None;
    }
    match segment.split_once('-') {
        Some((start, end)) => {
            let start: u32 = start.trim().parse().ok()?;
            let end: u32 = end.trim().parse().ok()?;
            Some(LineRange::new(start, end))
        }
        None => {
            let line: u32 = segment.parse().ok()?;
            Some(LineRange::new(line, line))
        }
    }
}

impl fmt::Display for LineSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl Serialize for LineSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical())
    }
}

impl<'de> Deserialize<'de> for LineSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LineSpecVisitor)
    }
}

struct LineSpecVisitor;

impl<'de> Visitor<'de> for LineSpecVisitor {
    type Value = LineSpec;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a line specifier string or number")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<LineSpec, E> {
        Ok(LineSpec::parse(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<LineSpec, E> {
        Ok(u32::try_from(value)
            .map(LineSpec::Single)
            .unwrap_or(LineSpec::Unbounded))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<LineSpec, E> {
        Ok(u32::try_from(value)
            .map(LineSpec::Single)
            .unwrap_or(LineSpec::Unbounded))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<LineSpec, E> {
        if value.fract() == 0.0 && value >= 0.0 && value <= f64::from(u32::MAX) {
            Ok(LineSpec::Single(value as u32))
        } else {
            Ok(LineSpec::Unbounded)
        }
    }
}
