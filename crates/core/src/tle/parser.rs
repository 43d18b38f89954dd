//! Streaming three-line TLE parser.
//!
//! Source text is a loose sequence of `name / "1 ..." / "2 ..."` groups with
//! optional blank lines between them. Malformed groups are dropped and never
//! surface as errors; scanning resumes at the next usable name line.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::OrbitalElementRecord;

static CATALOG_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^1\s+(\d+)").unwrap());

/// Position inside the current three-line block.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ParserState {
    /// Waiting for any non-blank line to act as the name.
    Name,
    /// Name seen, waiting for `"1 ..."`.
    Line1,
    /// Holding line 1, waiting for `"2 ..."`.
    Line2 { line1: String },
}

/// Lazy iterator of [`OrbitalElementRecord`]s over a sequence of lines.
///
/// Consuming the iterator consumes the underlying lines; it cannot be restarted.
pub struct ElementParser<I> {
    lines: I,
    state: ParserState,
}

impl<I, S> ElementParser<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            state: ParserState::Name,
        }
    }

    /// Advance the state machine by one non-blank line, returning a record
    /// when the line completes a block.
    fn step(&mut self, line: &str) -> Option<OrbitalElementRecord> {
        match std::mem::replace(&mut self.state, ParserState::Name) {
            ParserState::Name => {
                self.state = ParserState::Line1;
                None
            }
            ParserState::Line1 => {
                if line.starts_with("1 ") {
                    self.state = ParserState::Line2 {
                        line1: line.to_string(),
                    };
                } else {
                    // The offending line becomes the name of a fresh block.
                    self.state = ParserState::Line1;
                }
                None
            }
            ParserState::Line2 { line1 } => {
                if !line.starts_with("2 ") {
                    return None;
                }
                let catalog_id = extract_catalog_id(&line1)?;
                Some(OrbitalElementRecord {
                    catalog_id,
                    captured_at: Utc::now(),
                    line1,
                    line2: line.to_string(),
                })
            }
        }
    }
}

impl<I, S> Iterator for ElementParser<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = OrbitalElementRecord;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(raw) = self.lines.next() {
            let line = raw.as_ref().trim();
            if line.is_empty() {
                continue;
            }
            if let Some(record) = self.step(line) {
                return Some(record);
            }
        }
        None
    }
}

/// Parse a whole text body into records.
pub fn parse_elements(text: &str) -> ElementParser<std::str::Lines<'_>> {
    ElementParser::new(text.lines())
}

/// Extract the catalog number from TLE line 1 with leading zeros removed.
///
/// `"1 25544U 98067A ..."` yields `"25544"`, `"1 00005U"` yields `"5"`.
pub fn extract_catalog_id(line1: &str) -> Option<String> {
    let digits = CATALOG_ID_RE.captures(line1)?.get(1)?.as_str();
    digits.parse::<u64>().ok().map(|id| id.to_string())
}
