//! Structured parse cascade
//!
//! Strategies run in fixed priority order against the normalized reply and
//! the first `Matched` wins. `Declined` and `Errored` both move on to the
//! next strategy; only the final outcome is visible to callers.

use serde_json::{Map, Value};
use thiserror::Error;
use tja_common::Reading;
use tracing::debug;

use super::normalize::{normalize_candidate, normalize_response};
use super::pattern::{parse_pattern, parse_traffic};

/// Why a strategy could not even inspect its input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFault {
    #[error("malformed input: {0}")]
    Malformed(String),
}

/// Outcome of one strategy against one text blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAttempt {
    Matched(Reading),
    Declined,
    Errored(ParseFault),
}

impl ParseAttempt {
    pub fn into_reading(self) -> Option<Reading> {
        match self {
            ParseAttempt::Matched(reading) => Some(reading),
            _ => None,
        }
    }
}

/// Cascade strategies in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The whole reply is a `{Title, Date, Traffic}` object
    Direct,
    /// `[{"data": ...}, ...]`, only element 0 inspected
    EnvelopedArray,
    /// `{"data": ...}`
    EnvelopedObject,
    /// `title - date - amount` text
    Pattern,
}

impl Strategy {
    pub const ORDER: [Strategy; 4] = [
        Strategy::Direct,
        Strategy::EnvelopedArray,
        Strategy::EnvelopedObject,
        Strategy::Pattern,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Direct => "direct",
            Strategy::EnvelopedArray => "enveloped_array",
            Strategy::EnvelopedObject => "enveloped_object",
            Strategy::Pattern => "pattern",
        }
    }

    pub fn attempt(&self, text: &str) -> ParseAttempt {
        match self {
            Strategy::Direct => parse_direct(text),
            Strategy::EnvelopedArray => parse_enveloped_array(text),
            Strategy::EnvelopedObject => parse_enveloped_object(text),
            Strategy::Pattern => match parse_pattern(text) {
                Some(reading) => ParseAttempt::Matched(reading),
                None => ParseAttempt::Declined,
            },
        }
    }
}

/// Winning strategy and its reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeMatch {
    pub strategy: Strategy,
    pub reading: Reading,
}

/// Run the full cascade over a raw model reply
pub fn parse_response(text: &str) -> Option<CascadeMatch> {
    let normalized = normalize_response(text);

    for strategy in Strategy::ORDER {
        match strategy.attempt(&normalized) {
            ParseAttempt::Matched(reading) => {
                debug!(strategy = strategy.as_str(), title = %reading.title, "Parse strategy matched");
                return Some(CascadeMatch { strategy, reading });
            }
            ParseAttempt::Declined => {
                debug!(strategy = strategy.as_str(), "Parse strategy declined");
            }
            ParseAttempt::Errored(fault) => {
                debug!(strategy = strategy.as_str(), error = %fault, "Parse strategy could not read input");
            }
        }
    }

    None
}

/// Interpret the text as a single reading object
///
/// Field names match case-insensitively. Both title and date must be
/// non-empty after trimming; traffic defaults to 0.
pub fn parse_direct(text: &str) -> ParseAttempt {
    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(e) => return ParseAttempt::Errored(ParseFault::Malformed(e.to_string())),
    };

    let Some(object) = value.as_object() else {
        return ParseAttempt::Declined;
    };

    let title = field(object, "title").and_then(text_value).unwrap_or_default();
    let date = field(object, "date").and_then(text_value).unwrap_or_default();
    let traffic = field(object, "traffic").map(traffic_value).unwrap_or(0);

    let reading = Reading::new(title.trim(), date.trim(), traffic);
    if reading.is_valid() {
        ParseAttempt::Matched(reading)
    } else {
        ParseAttempt::Declined
    }
}

/// Interpret the text as `[{"data": ...}, ...]`
pub fn parse_enveloped_array(text: &str) -> ParseAttempt {
    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(e) => return ParseAttempt::Errored(ParseFault::Malformed(e.to_string())),
    };

    let data = value
        .as_array()
        .and_then(|items| items.first())
        .and_then(Value::as_object)
        .and_then(|first| first.get("data"));

    match data {
        Some(data) => parse_candidate(&candidate_text(data)),
        None => ParseAttempt::Declined,
    }
}

/// Interpret the text as `{"data": ...}`
pub fn parse_enveloped_object(text: &str) -> ParseAttempt {
    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(e) => return ParseAttempt::Errored(ParseFault::Malformed(e.to_string())),
    };

    match value.as_object().and_then(|object| object.get("data")) {
        Some(data) => parse_candidate(&candidate_text(data)),
        None => ParseAttempt::Declined,
    }
}

/// Parse text pulled out of an envelope
///
/// Quote-normalized direct parse first, then the pattern over the raw
/// candidate.
pub fn parse_candidate(candidate: &str) -> ParseAttempt {
    match parse_direct(&normalize_candidate(candidate)) {
        ParseAttempt::Matched(reading) => return ParseAttempt::Matched(reading),
        ParseAttempt::Declined => {}
        ParseAttempt::Errored(fault) => {
            debug!(error = %fault, "Envelope payload is not JSON, trying pattern");
        }
    }

    match parse_pattern(candidate) {
        Some(reading) => ParseAttempt::Matched(reading),
        None => ParseAttempt::Declined,
    }
}

fn field<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn traffic_value(value: &Value) -> i32 {
    match value {
        Value::Number(n) => {
            if let Some(int) = n.as_i64() {
                i32::try_from(int).unwrap_or(0)
            } else {
                n.as_f64()
                    .map(f64::trunc)
                    .filter(|f| *f >= f64::from(i32::MIN) && *f <= f64::from(i32::MAX))
                    .map(|f| f as i32)
                    .unwrap_or(0)
            }
        }
        Value::String(s) => parse_traffic(s),
        _ => 0,
    }
}

fn candidate_text(data: &Value) -> String {
    match data {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
