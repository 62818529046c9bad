//! Verdict parser: extracts a structured record from raw evaluator text.
//!
//! The evaluator is instructed to reply with a bare JSON object, but the
//! model is treated as unreliable with respect to format: replies may wrap
//! the object in markdown fences or surround it with prose. The parser
//! locates the first well-formed JSON object and deserializes it; field
//! semantics are the validator's job.

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::verdict::CandidateVerdict;

/// Errors from verdict extraction.
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("No JSON object found in evaluator response")]
    NoJsonObject,

    #[error("JSON object is truncated or has unbalanced braces")]
    UnbalancedBraces,

    #[error("JSON deserialization failed: {0}")]
    Json(String),
}

/// Extract the first well-formed JSON object from raw evaluator output.
///
/// Tolerates leading/trailing prose, surrounding whitespace, and markdown
/// code fences (```json or bare ```). Pure and idempotent: the same input
/// always yields the same candidate record.
pub fn extract_verdict(raw: &str) -> Result<CandidateVerdict, ParseError> {
    let trimmed = raw.trim();

    // A fenced block, when present, is the evaluator's intended payload.
    let search_space = fenced_block(trimmed).unwrap_or(trimmed);

    let mut saw_balanced = false;
    let mut first_json_error: Option<String> = None;

    let mut offset = 0;
    while let Some(open) = search_space[offset..].find('{') {
        let start = offset + open;
        match balanced_object(&search_space[start..]) {
            Some(candidate) => {
                saw_balanced = true;
                match serde_json::from_str::<Value>(candidate) {
                    Ok(Value::Object(fields)) => {
                        return Ok(CandidateVerdict::new(fields));
                    }
                    Ok(_) => unreachable!("balanced scan starts at an object opener"),
                    Err(e) => {
                        first_json_error.get_or_insert_with(|| e.to_string());
                        // Not valid JSON; keep scanning from the next opener.
                        offset = start + 1;
                    }
                }
            }
            None => {
                // Unbalanced from here to end of input; no later opener can close.
                break;
            }
        }
    }

    if let Some(err) = first_json_error {
        return Err(ParseError::Json(err));
    }
    if search_space.contains('{') && !saw_balanced {
        return Err(ParseError::UnbalancedBraces);
    }
    Err(ParseError::NoJsonObject)
}

/// Return the contents of the first markdown code fence, if any.
fn fenced_block(text: &str) -> Option<&str> {
    let re = Regex::new(r"(?s)```(?:[a-zA-Z]+)?\s*(.*?)```").expect("Invalid regex");
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Return the balanced `{...}` slice starting at the first byte of `text`,
/// honoring string literals and escapes. `None` if the object never closes.
fn balanced_object(text: &str) -> Option<&str> {
    debug_assert!(text.starts_with('{'));

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }

    None
}
