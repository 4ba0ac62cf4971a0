use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::{JsonRepairError, Result};

lazy_static! {
    static ref FENCED_BLOCK: Regex =
        Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)```").expect("fence pattern is valid");
}

/// Picks the JSON payload out of model output.
///
/// Prefers the last fenced code block; otherwise takes the span from the first
/// opening brace or bracket to the last closing one. Returns `None` when the
/// text has no object or array at all.
pub fn extract_json_block(text: &str) -> Option<&str> {
    candidates(text).into_iter().next()
}

/// Every plausible payload, most specific first. The open-ended span covers
/// output that was cut off before its closing delimiters.
fn candidates(text: &str) -> Vec<&str> {
    let mut found = Vec::new();

    if let Some(block) = FENCED_BLOCK
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|block| block.as_str().trim())
        .filter(|block| block.starts_with('{') || block.starts_with('['))
        .last()
    {
        found.push(block);
    }

    if let Some(start) = text.find(['{', '[']) {
        if let Some(end) = text.rfind(['}', ']']).filter(|end| *end > start) {
            found.push(text[start..=end].trim());
        }
        found.push(text[start..].trim().trim_end_matches('`').trim_end());
    }

    found.dedup();
    found
}

/// Appends whatever closing quotes, brackets and braces a truncated document
/// is missing, dropping a dangling trailing comma first.
pub fn close_unbalanced(text: &str) -> String {
    let mut closers = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => closers.push('}'),
            '[' => closers.push(']'),
            '}' | ']' => {
                closers.pop();
            }
            _ => {}
        }
    }

    let mut repaired = text.to_string();
    if in_string {
        repaired.push('"');
    }
    let trimmed_len = repaired.trim_end().trim_end_matches(',').len();
    repaired.truncate(trimmed_len);
    repaired.extend(closers.into_iter().rev());
    repaired
}

/// Repairs and deserializes JSON written by a language model.
///
/// Tries, in order: each extracted payload as strict JSON, as JSON5 (single
/// quotes, trailing commas, unquoted keys, comments), and as JSON5 after
/// closing unbalanced delimiters.
pub fn json_repair<T>(text: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let mut last_error = JsonRepairError::NotFound;

    for payload in candidates(text) {
        match serde_json::from_str::<T>(payload) {
            Ok(value) => return Ok(value),
            // Well formed, wrong shape: lenient parsing cannot help.
            Err(error) if error.is_data() => {
                last_error = JsonRepairError::Json(error);
                continue;
            }
            Err(_) => {}
        }

        if let Ok(value) = serde_json5::from_str::<T>(payload) {
            return Ok(value);
        }

        match serde_json5::from_str::<T>(&close_unbalanced(payload)) {
            Ok(value) => return Ok(value),
            Err(error) => last_error = JsonRepairError::Unrepairable(error.to_string()),
        }
    }

    Err(last_error)
}
