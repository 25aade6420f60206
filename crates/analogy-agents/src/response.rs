//! Parsing of free-form reasoning output into JSON payloads
//!
//! Models wrap JSON in Markdown fences, prepend prose, or use typographic
//! quotes. Parsing strips fences, extracts the first balanced `{...}` block,
//! normalises quotes and then deserializes with `serde_json`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[A-Za-z]*").expect("fence pattern is a valid regex"));

/// Why a response could not be parsed
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    /// Nothing but whitespace
    #[error("empty response")]
    Empty,

    /// No `{` in the response
    #[error("no JSON object found in response")]
    NoJsonObject,

    /// JSON did not match the expected shape
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Remove Markdown code fences (```` ```json ```` and ```` ``` ````)
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    FENCE.replace_all(text, "").trim().to_string()
}

/// First balanced `{...}` block, aware of JSON strings and escapes
///
/// An unterminated block yields everything from the first `{`.
#[must_use]
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for (offset, c) in text[start..].char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match c {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    Some(&text[start..])
}

/// Replace typographic quotes and non-breaking spaces
#[must_use]
pub fn normalize_quotes(text: &str) -> String {
    text.replace(&['\u{2018}', '\u{2019}'][..], "'")
        .replace(&['\u{201c}', '\u{201d}'][..], "\"")
        .replace('\u{00a0}', " ")
}

/// Parse a reasoning response into `T`
///
/// # Errors
/// - `ResponseError::Empty` for blank input
/// - `ResponseError::NoJsonObject` when no object is present
/// - `ResponseError::Json` when the object does not match `T`
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T, ResponseError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(ResponseError::Empty);
    }
    let object = extract_json_object(&cleaned).ok_or(ResponseError::NoJsonObject)?;
    let normalized = normalize_quotes(object);
    Ok(serde_json::from_str(&normalized)?)
}

/// Deserialize a string field that models sometimes emit as a number
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
