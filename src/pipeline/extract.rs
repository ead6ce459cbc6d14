//! Recovery of JSON objects from free-form model output.

use serde_json::Value;

use super::StageResult;
use crate::error::ParseError;

/// Return the first JSON object found in `text`.
///
/// The whole (fence-stripped) text is tried first. Failing that, every `{`
/// is tried as a candidate start, leftmost first: the scan follows brace
/// depth to the matching `}` and the enclosed slice must parse as an object.
/// The first candidate that does wins.
pub fn extract_json_object(text: &str) -> Result<StageResult, ParseError> {
    let cleaned = strip_code_fence(text);

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&cleaned) {
        return Ok(map);
    }

    let bytes = cleaned.as_bytes();
    let mut search_from = 0;
    while let Some(offset) = cleaned[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(map) = parse_balanced_candidate(&cleaned, bytes, start) {
            return Ok(map);
        }
        search_from = start + 1;
    }

    Err(ParseError {
        text: text.to_string(),
    })
}

/// Remove a surrounding ``` / ```json fence.
fn strip_code_fence(text: &str) -> String {
    let cleaned = text.trim().replace("```json", "```");
    if cleaned.starts_with("```") {
        cleaned.trim_matches('`').trim().to_string()
    } else {
        cleaned
    }
}

/// Braces are ASCII, so byte offsets always land on char boundaries.
fn parse_balanced_candidate(
    cleaned: &str,
    bytes: &[u8],
    start: usize,
) -> Option<serde_json::Map<String, Value>> {
    let mut depth: usize = 0;
    for (idx, &byte) in bytes.iter().enumerate().skip(start) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return match serde_json::from_str::<Value>(&cleaned[start..=idx]) {
                        Ok(Value::Object(map)) => Some(map),
                        _ => None,
                    };
                }
            }
            _ => {}
        }
    }
    None
}
