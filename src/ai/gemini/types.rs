//! Gemini `generateContent` payload types.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON pointer to the generated text in a `generateContent` reply.
pub const RESULT_TEXT_POINTER: &str = "/candidates/0/content/parts/0/text";

/// Outbound `generateContent` request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

/// Gemini content container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Part {
    pub text: String,
}

impl GenerateContentRequest {
    /// Single-turn request carrying `query` as its only text part.
    pub fn from_query(query: &str) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![Part {
                    text: query.to_string(),
                }],
            }],
        }
    }

    /// Text of the first part of the first content entry.
    pub fn query(&self) -> Option<&str> {
        self.contents
            .first()
            .and_then(|c| c.parts.first())
            .map(|p| p.text.as_str())
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a reply.
///
/// No default is substituted: a reply without that path, or with a non-string
/// value there, is a [`Error::ResponseShape`].
pub fn extract_text(response: &Value) -> Result<String> {
    match response.pointer(RESULT_TEXT_POINTER) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(Error::ResponseShape(format!(
            "expected a string at {}, found {}",
            RESULT_TEXT_POINTER, other
        ))),
        None => Err(Error::ResponseShape(format!(
            "missing {} in Gemini response",
            RESULT_TEXT_POINTER
        ))),
    }
}
