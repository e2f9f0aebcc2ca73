//! Request adapter: turns a loosely-typed inbound body into a Gemini query
//! and the Gemini reply back into a single string.

use crate::ai::gemini::{extract_text, GenerateContentRequest};
use crate::ai::GenerationService;
use crate::models::{ApiKey, RelayOptions};
use crate::{Error, Result};
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

/// Unrendered template marker some MCP hosts send verbatim.
pub const TEMPLATE_PLACEHOLDER: &str = "{{input}}";

/// Query used when the inbound body is [`TEMPLATE_PLACEHOLDER`].
pub const FALLBACK_QUERY: &str = "Hello, how can I help you?";

// Emit at info when verbose logging is on, debug otherwise.
macro_rules! relay_log {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

/// Inbound body after the first classification pass.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundRequest {
    Placeholder,
    Json(Value),
    PlainText(String),
}

impl InboundRequest {
    pub fn parse(raw: &str) -> Self {
        if raw == TEMPLATE_PLACEHOLDER {
            return InboundRequest::Placeholder;
        }

        match serde_json::from_str::<Value>(raw) {
            Ok(value) => InboundRequest::Json(value),
            Err(e) => {
                tracing::debug!("Body is not JSON, treating as plain text: {}", e);
                InboundRequest::PlainText(raw.to_string())
            }
        }
    }
}

/// One way of pulling a query out of a JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    /// Value of this key, when the document is an object holding it. A
    /// present `null` matches and renders as `"null"`.
    Field(&'static str),
    /// Like `Field`, but a `null` value counts as absent.
    RequiredField(&'static str),
    /// The whole document coerced to text.
    WholeValue,
}

/// Probe order for lenient mode.
pub const LENIENT_EXTRACTORS: &[Extractor] = &[
    Extractor::Field("query"),
    Extractor::Field("message"),
    Extractor::Field("text"),
    Extractor::Field("content"),
    Extractor::WholeValue,
];

/// Strict mode only accepts `query`.
pub const STRICT_EXTRACTORS: &[Extractor] = &[Extractor::RequiredField("query")];

impl Extractor {
    pub fn apply(&self, value: &Value) -> Option<String> {
        match self {
            Extractor::Field(key) => value
                .as_object()
                .and_then(|object| object.get(*key))
                .map(coerce_text),
            Extractor::RequiredField(key) => value
                .as_object()
                .and_then(|object| object.get(*key))
                .filter(|v| !v.is_null())
                .map(coerce_text),
            Extractor::WholeValue => Some(coerce_text(value)),
        }
    }
}

/// Text rendering of a JSON value: scalars print as themselves, containers
/// collapse to an empty string.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Resolve the query to send downstream.
pub fn normalize(raw: &str, options: &RelayOptions) -> Result<String> {
    match InboundRequest::parse(raw) {
        InboundRequest::Placeholder => {
            tracing::warn!("Received literal template string, using default query");
            Ok(FALLBACK_QUERY.to_string())
        }
        InboundRequest::Json(value) => {
            let extractors = if options.strict_input_schema {
                STRICT_EXTRACTORS
            } else {
                LENIENT_EXTRACTORS
            };

            extractors
                .iter()
                .find_map(|extractor| extractor.apply(&value))
                .ok_or_else(|| {
                    Error::InvalidRequest("request body must contain a \"query\" field".to_string())
                })
        }
        InboundRequest::PlainText(text) => {
            if options.strict_input_schema {
                Err(Error::Parse(
                    "request body must be a JSON object with a \"query\" field".to_string(),
                ))
            } else {
                Ok(text)
            }
        }
    }
}

/// Relays one inbound body to the generation service and back.
pub struct RequestAdapter {
    api_key: ApiKey,
    options: RelayOptions,
    service: Box<dyn GenerationService>,
}

impl RequestAdapter {
    pub fn new(api_key: ApiKey, options: RelayOptions, service: Box<dyn GenerationService>) -> Self {
        Self {
            api_key,
            options,
            service,
        }
    }

    pub fn options(&self) -> &RelayOptions {
        &self.options
    }

    pub async fn handle(&self, raw: &str) -> Result<String> {
        let span = tracing::info_span!("relay", request_id = %Uuid::new_v4());
        self.handle_inner(raw).instrument(span).await
    }

    async fn handle_inner(&self, raw: &str) -> Result<String> {
        let verbose = self.options.verbose_logging;
        relay_log!(verbose, "Received raw request: {}", raw);

        if self.api_key.is_empty() {
            tracing::error!("GEMINI_API_KEY is not set");
            return Err(Error::Configuration("GEMINI_API_KEY is not set".to_string()));
        }

        let query = normalize(raw, &self.options)?;
        if query.is_empty() {
            tracing::warn!("Resolved query is empty, forwarding anyway");
        }
        relay_log!(verbose, "Parsed query: {}", query);

        let payload = GenerateContentRequest::from_query(&query);
        relay_log!(verbose, "Sending request to {}", self.service.describe());

        let response = self.service.generate_content(&self.api_key, &payload).await?;
        relay_log!(verbose, "Received response from Gemini: {}", response);

        let result = extract_text(&response)?;
        relay_log!(verbose, "Final response to client: {}", result);
        Ok(result)
    }
}
