//! Parsing of untrusted text-generation output.
//!
//! The model is instructed to reply with one JSON object of either shape:
//!
//! ```text
//! {"type":"recommendations","items":[{"title":..,"category":..,"reason":..}]}
//! {"type":"answer","heading":..,"text":..}
//! ```
//!
//! but may wrap it in prose. [`extract_payload`] takes the span from the
//! first `{` to the last `}` and parses it; [`classify_payload`] turns the
//! value into a [`ModelResponse`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `type` value of a recommendations envelope.
pub const RECOMMENDATIONS_TYPE: &str = "recommendations";

/// `type` value of an answer envelope.
pub const ANSWER_TYPE: &str = "answer";

/// Errors fatal to a single generation request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    /// No `{...}` span, or the span is not valid JSON.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The payload's `type` is missing or not one of the known kinds.
    #[error("Unrecognized response type: {0}")]
    UnrecognizedResponseType(String),
}

/// A single suggested title, before catalog resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    pub title: String,
    /// Category as emitted by the model; informational only.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub reason: String,
}

/// A classified model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelResponse {
    /// Picks in the order the model returned them.
    Recommendations(Vec<Pick>),
    Answer { heading: String, text: String },
}

/// Locate the first `{` through the last `}` in `raw` and parse that span.
pub fn extract_payload(raw: &str) -> Result<Value, ResponseError> {
    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return Err(ResponseError::MalformedResponse(
            "no JSON object in response".into(),
        ));
    };
    if end < start {
        return Err(ResponseError::MalformedResponse(
            "no JSON object in response".into(),
        ));
    }

    serde_json::from_str(&raw[start..=end])
        .map_err(|e| ResponseError::MalformedResponse(e.to_string()))
}

/// Dispatch on the payload's `type` field.
///
/// Missing `items` means no picks; missing `heading` / `text` default to
/// empty strings. Items without a non-blank string `title` are dropped.
pub fn classify_payload(payload: &Value) -> Result<ModelResponse, ResponseError> {
    let kind = payload.get("type").and_then(Value::as_str);

    match kind {
        Some(RECOMMENDATIONS_TYPE) => {
            let picks = match payload.get("items") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items.iter().filter_map(parse_pick).collect(),
                Some(_) => {
                    return Err(ResponseError::MalformedResponse(
                        "items is not an array".into(),
                    ))
                }
            };
            Ok(ModelResponse::Recommendations(picks))
        }
        Some(ANSWER_TYPE) => Ok(ModelResponse::Answer {
            heading: string_field(payload, "heading"),
            text: string_field(payload, "text"),
        }),
        Some(other) => Err(ResponseError::UnrecognizedResponseType(other.to_string())),
        None => Err(ResponseError::UnrecognizedResponseType(
            payload
                .get("type")
                .map_or_else(|| "<missing>".to_string(), Value::to_string),
        )),
    }
}

/// [`extract_payload`] followed by [`classify_payload`].
pub fn parse_response(raw: &str) -> Result<ModelResponse, ResponseError> {
    classify_payload(&extract_payload(raw)?)
}

fn parse_pick(item: &Value) -> Option<Pick> {
    let title = item.get("title")?.as_str()?.trim();
    if title.is_empty() {
        return None;
    }
    Some(Pick {
        title: title.to_string(),
        category: string_field(item, "category"),
        reason: string_field(item, "reason"),
    })
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
