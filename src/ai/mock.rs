use super::{GenerateContentRequest, GenerationService};
use crate::models::ApiKey;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// In-memory [`GenerationService`] that records every request it receives.
///
/// Clones share state, so a test can keep one handle while the adapter owns
/// another.
#[derive(Clone)]
pub struct MockGenerationClient {
    responses: Arc<Mutex<Vec<Value>>>,
    failure: Arc<Mutex<Option<String>>>,
    requests: Arc<Mutex<Vec<GenerateContentRequest>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockGenerationClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Queue a raw JSON reply. Replies cycle once all have been used.
    pub fn with_response(self, response: Value) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    /// Convenience for a well-formed reply carrying `text`.
    pub fn with_text_response(self, text: &str) -> Self {
        self.with_response(candidate_reply(text))
    }

    /// Make every call fail with an upstream error.
    pub fn with_failure(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn requests(&self) -> Vec<GenerateContentRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_query(&self) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .and_then(|r| r.query().map(str::to_string))
    }
}

impl Default for MockGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

fn candidate_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {
                "parts": [{ "text": text }],
                "role": "model"
            }
        }]
    })
}

#[async_trait]
impl GenerationService for MockGenerationClient {
    fn describe(&self) -> String {
        "mock generation service".to_string()
    }

    async fn generate_content(
        &self,
        _api_key: &ApiKey,
        request: &GenerateContentRequest,
    ) -> Result<Value> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        self.requests.lock().unwrap().push(request.clone());

        if let Some(message) = self.failure.lock().unwrap().as_ref() {
            return Err(Error::Upstream(message.clone()));
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Default: echo the query back
            Ok(candidate_reply(&format!(
                "Echo: {}",
                request.query().unwrap_or_default()
            )))
        } else {
            let index = (*count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::extract_text;

    #[tokio::test]
    async fn test_mock_default_echoes_query() {
        let client = MockGenerationClient::new();
        let reply = client
            .generate_content(&ApiKey::new("k"), &GenerateContentRequest::from_query("hello"))
            .await
            .unwrap();

        assert_eq!(extract_text(&reply).unwrap(), "Echo: hello");
        assert_eq!(client.last_query().as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_mock_custom_responses_cycle() {
        let client = MockGenerationClient::new()
            .with_text_response("first")
            .with_text_response("second");
        let key = ApiKey::new("k");
        let request = GenerateContentRequest::from_query("q");

        let texts = [
            client.generate_content(&key, &request).await.unwrap(),
            client.generate_content(&key, &request).await.unwrap(),
            client.generate_content(&key, &request).await.unwrap(),
        ]
        .iter()
        .map(|r| extract_text(r).unwrap())
        .collect::<Vec<_>>();

        assert_eq!(texts, vec!["first", "second", "first"]);
        assert_eq!(client.get_call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_clones_share_call_count() {
        let client = MockGenerationClient::new().with_failure("unavailable");
        let handle = client.clone();

        let err = client
            .generate_content(&ApiKey::new("k"), &GenerateContentRequest::from_query("q"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Upstream(_)));
        assert_eq!(handle.get_call_count(), 1);
    }
}
