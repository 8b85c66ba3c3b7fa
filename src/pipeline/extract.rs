//! Tolerant recovery of JSON values from raw model text.
//!
//! Model output cannot be trusted to be valid JSON: it may be wrapped in
//! markdown code fences, surrounded by prose, or truncated mid-array.
//! Recovery runs in order: fence strip, bracket scan, parse, truncation
//! repair (arrays), quoted-token salvage (arrays), whole-text parse.
//! Callers absorb [`RecoveryFailure`] with a typed default; it never reaches
//! the end user.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// Shape the caller expects from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedShape {
    Object,
    Array,
}

/// Extraction could not produce a usable value.
///
/// Internal to the pipelines: every caller substitutes its own default
/// (default judgment, identity filter, fallback ranking) instead of
/// propagating this.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecoveryFailure {
    #[error("no JSON candidate found in model response")]
    NoCandidate,

    #[error("candidate would not parse: {0}")]
    Unparseable(String),
}

/// Recover a JSON value of the expected shape from `raw`.
pub fn extract_json(raw: &str, shape: ExpectedShape) -> Result<Value, RecoveryFailure> {
    let clean = strip_fences(raw);

    let candidate = match shape {
        ExpectedShape::Object => bracket_span(clean, '{', '}'),
        ExpectedShape::Array => bracket_span(clean, '[', ']'),
    };

    let Some(candidate) = candidate else {
        // No bracket at all: last resort, the cleaned text may itself parse.
        return serde_json::from_str(clean).map_err(|_| RecoveryFailure::NoCandidate);
    };

    let first_attempt = match serde_json::from_str(candidate) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if shape == ExpectedShape::Array {
        if !candidate.trim_end().ends_with(']') {
            let repaired = repair_truncated_array(candidate);
            if let Ok(value) = serde_json::from_str(&repaired) {
                return Ok(value);
            }
        }

        // Structural parse failed for good; salvage whatever quoted tokens
        // are present rather than failing outright.
        let tokens = salvage_quoted(candidate);
        if !tokens.is_empty() {
            tracing::debug!(
                tokens = tokens.len(),
                "salvaged quoted tokens from unparseable array"
            );
            return Ok(Value::Array(tokens.into_iter().map(Value::String).collect()));
        }
    }

    Err(RecoveryFailure::Unparseable(first_attempt.to_string()))
}

/// Strip leading/trailing markdown code fences, case-insensitively.
fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = strip_prefix_ci(text, "```json") {
        text = rest.trim_start();
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest.trim_start();
    }

    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }

    text
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

/// Substring from the first `open` to the last `close`. When the closing
/// bracket is missing entirely (truncated output) the span runs to the end
/// of the text so the repair step has something to work with.
fn bracket_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    match text.rfind(close) {
        Some(end) if end > start => Some(&text[start..=end]),
        _ => Some(&text[start..]),
    }
}

/// Close a truncated array: cut back to the last quote and append the
/// missing bracket, or just append it if no quote exists.
fn repair_truncated_array(candidate: &str) -> String {
    match candidate.rfind('"') {
        Some(idx) => format!("{}]", &candidate[..=idx]),
        None => format!("{candidate}]"),
    }
}

static QUOTED_TOKEN: OnceLock<Regex> = OnceLock::new();

/// Best-effort salvage: every complete quoted token in the candidate.
fn salvage_quoted(candidate: &str) -> Vec<String> {
    let re = QUOTED_TOKEN.get_or_init(|| Regex::new(r#""([^"]+)""#).expect("valid regex"));
    re.captures_iter(candidate)
        .map(|cap| cap[1].to_string())
        .collect()
}
