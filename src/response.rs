//! Interpretation of a chat completion response.
//!
//! Extraction never fails: an unexpected shape is reported as "no assistant
//! text" and the full JSON is printed for inspection.

use reqwest::StatusCode;
use serde_json::Value;
use std::io::Write;
use tracing::{debug, warn};

use crate::error::CheckError;
use crate::providers::azure_openai::RawResponse;

pub const RESPONSE_START_MARKER: &str = "=== Model response ===";
pub const RESPONSE_END_MARKER: &str = "=== End ===";

/// Assistant text found in a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantText {
    Text(String),
    /// Content delivered as a list of chunks.
    Parts(Vec<String>),
}

impl AssistantText {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null | Value::Bool(false) => None,
            Value::String(text) if text.is_empty() => None,
            Value::String(text) => Some(Self::Text(text.clone())),
            Value::Array(parts) if parts.is_empty() => None,
            Value::Array(parts) => Some(Self::Parts(parts.iter().map(render_part).collect())),
            Value::Object(map) if map.is_empty() => None,
            Value::Number(number) if number.as_f64() == Some(0.0) => None,
            other => Some(Self::Text(other.to_string())),
        }
    }

    fn lines(&self) -> Vec<&str> {
        match self {
            Self::Text(text) => vec![text.as_str()],
            Self::Parts(parts) => parts.iter().map(String::as_str).collect(),
        }
    }
}

fn render_part(part: &Value) -> String {
    match part {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// `message.content` of the first choice, falling back to its `text`.
fn from_first_choice(choices: &[Value]) -> Option<&Value> {
    let choice = choices.first()?.as_object()?;
    let content = choice
        .get("message")
        .and_then(Value::as_object)
        .and_then(|message| message.get("content"))
        .filter(|content| !content.is_null());
    content
        .or_else(|| choice.get("text"))
        .filter(|text| !text.is_null())
}

/// Top-level `message.content`.
fn from_message(json: &Value) -> Option<&Value> {
    json.get("message")?
        .as_object()?
        .get("content")
        .filter(|content| !content.is_null())
}

pub fn extract_assistant_text(json: &Value) -> Option<AssistantText> {
    let object = json.as_object()?;

    // A `choices` field that has no length, or that cannot be indexed by
    // position, aborts extraction instead of falling through to `message`.
    let from_choices = match object.get("choices") {
        None | Some(Value::String(_)) => None,
        Some(Value::Array(choices)) => from_first_choice(choices),
        Some(Value::Object(map)) if map.is_empty() => None,
        Some(_) => return None,
    };

    from_choices
        .or_else(|| from_message(json))
        .and_then(AssistantText::from_value)
}

/// Prints the report for `response` and maps it to the check outcome.
pub fn interpret(response: &RawResponse, verbose: bool, out: &mut impl Write) -> Result<(), CheckError> {
    let status = response.status;
    writeln!(out, "HTTP status: {}", status.as_u16())?;

    let json: Value = match serde_json::from_str(&response.body) {
        Ok(json) => json,
        Err(err) => {
            warn!(status = %status, error = %err, "response body is not JSON");
            writeln!(out, "Non-JSON response:")?;
            writeln!(out, "{}", response.body)?;
            return Err(CheckError::NonJson {
                status: status.as_u16(),
            });
        }
    };

    if verbose {
        writeln!(out, "Full JSON response:")?;
        writeln!(out, "{}", pretty(&json))?;
    }

    match extract_assistant_text(&json) {
        Some(text) => {
            writeln!(out, "\n{RESPONSE_START_MARKER}")?;
            for line in text.lines() {
                writeln!(out, "{line}")?;
            }
            writeln!(out, "{RESPONSE_END_MARKER}\n")?;

            if status == StatusCode::OK {
                debug!(status = %status, "assistant text received");
                Ok(())
            } else {
                Err(CheckError::UnexpectedStatus {
                    status: status.as_u16(),
                })
            }
        }
        None => {
            writeln!(
                out,
                "No assistant message found in response; full response below:"
            )?;
            writeln!(out, "{}", pretty(&json))?;
            Err(CheckError::NoAssistantText {
                status: status.as_u16(),
            })
        }
    }
}

fn pretty(json: &Value) -> String {
    serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string())
}
