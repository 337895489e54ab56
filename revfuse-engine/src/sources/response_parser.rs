//! LLM Response Parser
//!
//! Turns free-form model text into findings. The model is asked for a JSON
//! array, but replies come wrapped in markdown fences, as a single object, or
//! as prose; each shape is handled without failing the call.

use crate::types::{Issue, Tool};
use serde_json::{Map, Value};
use tracing::warn;

/// Message used for findings that arrive without one
pub const DEFAULT_MESSAGE: &str = "Code quality issue";

/// Message for the fallback finding built from unstructured text
pub const UNSTRUCTURED_MESSAGE: &str = "LLM analysis (unstructured)";

/// Characters of unstructured text kept as explanation
const UNSTRUCTURED_EXPLANATION_CHARS: usize = 500;

/// Locate the JSON payload in a model reply
///
/// Prefers a ```` ```json ```` fence, then any fence, then the whole text.
/// An unterminated fence runs to the end of the text.
pub fn extract_json_text(response: &str) -> &str {
    fenced(response, "```json")
        .or_else(|| fenced(response, "```"))
        .unwrap_or_else(|| response.trim())
}

fn fenced<'a>(response: &'a str, marker: &str) -> Option<&'a str> {
    let start = response.find(marker)? + marker.len();
    let rest = &response[start..];
    let end = rest.find("```").unwrap_or(rest.len());
    Some(rest[..end].trim())
}

/// Apply LLM-origin defaults to one raw finding object
fn normalize(mut object: Map<String, Value>) -> Result<Issue, serde_json::Error> {
    let missing = |o: &Map<String, Value>, key: &str| o.get(key).map_or(true, Value::is_null);

    if missing(&object, "severity") {
        object.insert("severity".to_string(), Value::from("medium"));
    }
    if missing(&object, "line") {
        object.insert("line".to_string(), Value::from(0));
    }
    if missing(&object, "message") {
        object.insert("message".to_string(), Value::from(DEFAULT_MESSAGE));
    }

    let mut issue: Issue = serde_json::from_value(Value::Object(object))?;
    issue.tool = Some(Tool::Llm);
    Ok(issue)
}

fn unstructured(response: &str) -> Issue {
    let explanation: String = response.chars().take(UNSTRUCTURED_EXPLANATION_CHARS).collect();
    Issue::new("llm_analysis", "medium", 0, UNSTRUCTURED_MESSAGE)
        .with_tool(Tool::Llm)
        .with_explanation(explanation)
}

/// Parse a model reply into LLM findings
///
/// Never fails: unparsable non-empty text becomes a single unstructured
/// finding, empty text yields no findings, and non-object array elements
/// are skipped.
pub fn parse_response(response: &str) -> Vec<Issue> {
    let json_text = extract_json_text(response);

    let objects = match serde_json::from_str::<Value>(json_text) {
        Ok(Value::Array(items)) => items,
        Ok(object @ Value::Object(_)) => vec![object],
        Ok(other) => {
            warn!("Unexpected JSON shape in LLM response: {}", other);
            return Vec::new();
        }
        Err(e) => {
            warn!("Could not parse LLM response as JSON: {}", e);
            if response.trim().is_empty() {
                return Vec::new();
            }
            return vec![unstructured(response)];
        }
    };

    objects
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(object) => match normalize(object) {
                Ok(issue) => Some(issue),
                Err(e) => {
                    warn!("Skipping malformed LLM finding: {}", e);
                    None
                }
            },
            other => {
                warn!("Skipping non-object LLM finding: {}", other);
                None
            }
        })
        .collect()
}
