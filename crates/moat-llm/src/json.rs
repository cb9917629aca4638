//! Tolerant JSON recovery for LLM output
//!
//! LLMs wrap JSON in markdown, add prose, leave trailing commas, emit several
//! objects without an enclosing array, or stop mid-token. Recovery is an
//! ordered list of strategies tried in sequence; the first that yields a
//! value wins. No strategy panics and no error escapes as anything but a
//! [`ParseError`].

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Failure of one strategy (or of the whole cascade)
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{strategy}: {message}")]
pub struct ParseError {
    /// Strategy that failed ("extract" or "cascade" for the outer steps)
    pub strategy: &'static str,
    /// What went wrong
    pub message: String,
}

impl ParseError {
    fn new(strategy: &'static str, message: impl Into<String>) -> Self {
        Self {
            strategy,
            message: message.into(),
        }
    }
}

/// A recovered value and the strategy that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    /// Recovered JSON value
    pub value: Value,
    /// Name of the winning strategy
    pub strategy: &'static str,
}

/// A parse strategy
pub type Strategy = fn(&str) -> Result<Value, ParseError>;

/// Strategies in the order they are attempted
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("strict", strict),
    ("structural_repair", structural_repair),
    ("trailing_commas_and_merge", trailing_commas_and_merge),
    ("bracket_depth", bracket_depth),
];

/// Recover a JSON value from raw LLM output
pub fn parse_tolerant(response: &str) -> Result<Parsed, ParseError> {
    let candidate = extract_json(response)?;
    let mut failures = Vec::new();

    for (name, strategy) in STRATEGIES {
        match strategy(&candidate) {
            Ok(value) => {
                if *name != "strict" {
                    debug!("Recovered LLM JSON with '{}' after {} failed attempt(s)", name, failures.len());
                }
                return Ok(Parsed {
                    value,
                    strategy: *name,
                });
            }
            Err(e) => failures.push(e.to_string()),
        }
    }

    Err(ParseError::new("cascade", failures.join("; ")))
}

/// Isolate the JSON part of a response: strip markdown fences and any prose
/// before the first bracket or after the last closing bracket
pub fn extract_json(response: &str) -> Result<String, ParseError> {
    let mut text = response.trim();

    if let Some(fence) = text.find("```") {
        let after_fence = &text[fence + 3..];
        // Skip the language tag line (```json)
        let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(after_fence.len());
        let body = &after_fence[body_start..];
        text = match body.find("```") {
            Some(end) => &body[..end],
            None => body,
        };
    }

    let start = text
        .find(['[', '{'])
        .ok_or_else(|| ParseError::new("extract", "no JSON object or array in response"))?;
    let mut json = &text[start..];

    if let Some(last_close) = json.rfind([']', '}']) {
        let tail = &json[last_close + 1..];
        if !tail.contains(['"', '{', '[', ':']) {
            json = &json[..=last_close];
        }
    }

    Ok(json.trim().to_string())
}

/// Plain `serde_json` parse
pub fn strict(text: &str) -> Result<Value, ParseError> {
    serde_json::from_str(text).map_err(|e| ParseError::new("strict", e.to_string()))
}

/// Close an unterminated string and any unclosed brackets, dropping a
/// dangling key or separator at the cut point
pub fn structural_repair(text: &str) -> Result<Value, ParseError> {
    let scan = scan_structure(text).map_err(|m| ParseError::new("structural_repair", m))?;
    if scan.open.is_empty() && !scan.in_string {
        return Err(ParseError::new("structural_repair", "structure is balanced; nothing to repair"));
    }

    let mut repaired = text.to_string();
    if scan.in_string {
        if scan.escape_pending {
            repaired.pop();
        }
        repaired.push('"');
    }
    trim_dangling(&mut repaired);

    let closed = close_brackets(&repaired, &scan.open);
    if let Ok(value) = serde_json::from_str(&closed) {
        return Ok(value);
    }

    // Cut inside an object key or after a lone value: drop the last string token
    if strip_trailing_string(&mut repaired) {
        trim_dangling(&mut repaired);
        let closed = close_brackets(&repaired, &scan.open);
        if let Ok(value) = serde_json::from_str(&closed) {
            return Ok(value);
        }
    }

    Err(ParseError::new("structural_repair", "repaired text still does not parse"))
}

/// Remove trailing commas before closers and join adjacent top-level
/// objects into one array
pub fn trailing_commas_and_merge(text: &str) -> Result<Value, ParseError> {
    let cleaned = rewrite_outside_strings(text);
    if let Ok(value) = serde_json::from_str(&cleaned) {
        return Ok(value);
    }
    let wrapped = format!("[{}]", cleaned);
    serde_json::from_str(&wrapped)
        .map_err(|e| ParseError::new("trailing_commas_and_merge", e.to_string()))
}

/// Walk the text tracking brace depth and parse every complete top-level
/// object on its own, skipping the ones that do not parse
pub fn bracket_depth(text: &str) -> Result<Value, ParseError> {
    let mut objects = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escape = false;

    for (idx, c) in text.char_indices() {
        if in_string {
            if escape {
                escape = false;
            } else if c == '\\' {
                escape = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(idx);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(begin) = start.take() {
                        let slice = &text[begin..=idx];
                        let parsed = serde_json::from_str::<Value>(slice)
                            .or_else(|_| serde_json::from_str::<Value>(&rewrite_outside_strings(slice)));
                        if let Ok(value) = parsed {
                            objects.push(value);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    if objects.is_empty() {
        return Err(ParseError::new("bracket_depth", "no complete object could be parsed"));
    }
    Ok(Value::Array(objects))
}

struct StructureScan {
    open: Vec<char>,
    in_string: bool,
    escape_pending: bool,
}

fn scan_structure(text: &str) -> Result<StructureScan, String> {
    let mut open = Vec::new();
    let mut in_string = false;
    let mut escape = false;

    for c in text.chars() {
        if in_string {
            if escape {
                escape = false;
            } else if c == '\\' {
                escape = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => open.push('}'),
            '[' => open.push(']'),
            '}' | ']' => {
                if open.last() == Some(&c) {
                    open.pop();
                } else {
                    return Err(format!("mismatched '{}'", c));
                }
            }
            _ => {}
        }
    }

    Ok(StructureScan {
        open,
        in_string,
        escape_pending: escape,
    })
}

fn close_brackets(text: &str, open: &[char]) -> String {
    let mut closed = text.to_string();
    closed.extend(open.iter().rev());
    closed
}

/// Drop trailing whitespace, commas and `"key":` fragments
fn trim_dangling(text: &mut String) {
    loop {
        let len = text.trim_end().len();
        text.truncate(len);
        if text.ends_with(',') {
            text.pop();
            continue;
        }
        if text.ends_with(':') {
            text.pop();
            let len = text.trim_end().len();
            text.truncate(len);
            strip_trailing_string(text);
            continue;
        }
        break;
    }
}

/// Remove a complete string token at the end of `text`
fn strip_trailing_string(text: &mut String) -> bool {
    if !text.ends_with('"') {
        return false;
    }
    let bytes = text.as_bytes();
    let mut idx = bytes.len() - 1;
    while idx > 0 {
        idx -= 1;
        if bytes[idx] == b'"' {
            let mut backslashes = 0;
            let mut j = idx;
            while j > 0 && bytes[j - 1] == b'\\' {
                backslashes += 1;
                j -= 1;
            }
            if backslashes % 2 == 0 {
                text.truncate(idx);
                return true;
            }
        }
    }
    false
}

/// Outside string literals: drop `,` before `}`/`]` and insert `,` between
/// `}` and `{`
fn rewrite_outside_strings(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);
    let mut in_string = false;
    let mut escape = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escape {
                escape = false;
            } else if c == '\\' {
                escape = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        let next_significant = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' if matches!(next_significant, Some('}') | Some(']') | None) => {}
            '}' if next_significant == Some(&'{') => {
                out.push('}');
                out.push(',');
            }
            _ => out.push(c),
        }
    }
    out
}
