use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:8811/mcp";

/// Sends a query somewhere that can answer it.
#[async_trait]
pub trait QueryForwarder: Send + Sync {
    async fn forward(&self, query: &str) -> Result<String>;
}

/// Forwards queries to a running relay over HTTP.
pub struct HttpForwarder {
    client: Client,
    relay_url: String,
    timeout: Duration,
}

impl HttpForwarder {
    pub fn new(relay_url: String, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            relay_url,
            timeout,
        }
    }

    pub fn relay_url(&self) -> &str {
        &self.relay_url
    }
}

/// Pick the answer out of a relay reply: `response`, then `text`, then the
/// body as-is.
pub fn reply_text(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    ["response", "text"]
        .iter()
        .find_map(|key| {
            value
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl QueryForwarder for HttpForwarder {
    async fn forward(&self, query: &str) -> Result<String> {
        tracing::debug!("Forwarding query to {}", self.relay_url);

        let response = self
            .client
            .post(&self.relay_url)
            .timeout(self.timeout)
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Error calling relay: {}", e);
                Error::Upstream(format!("relay unreachable: {}", e))
            })?;

        let body = response.text().await?;
        Ok(reply_text(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_reply_text_prefers_response_field() {
        assert_eq!(reply_text(r#"{"response": "a", "text": "b"}"#), "a");
        assert_eq!(reply_text(r#"{"text": "b"}"#), "b");
        assert_eq!(reply_text(r#"{"response": ""}"#), r#"{"response": ""}"#);
        assert_eq!(reply_text("not json"), "not json");
        assert_eq!(reply_text(r#""bare""#), r#""bare""#);
    }

    #[tokio::test]
    async fn test_forward_posts_query_object() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mcp"))
            .and(body_json(json!({"query": "ping"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "pong"})))
            .expect(1)
            .mount(&server)
            .await;

        let forwarder =
            HttpForwarder::new(format!("{}/mcp", server.uri()), Duration::from_secs(5));

        assert_eq!(forwarder.forward("ping").await.unwrap(), "pong");
    }

    #[tokio::test]
    async fn test_forward_passes_error_body_through() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mcp"))
            .respond_with(ResponseTemplate::new(502).set_body_json(json!({
                "error": {"kind": "upstream_error", "message": "boom"}
            })))
            .mount(&server)
            .await;

        let forwarder =
            HttpForwarder::new(format!("{}/mcp", server.uri()), Duration::from_secs(5));

        let text = forwarder.forward("ping").await.unwrap();
        assert!(text.contains("upstream_error"));
    }

    #[tokio::test]
    async fn test_forward_unreachable_relay_is_error() {
        let forwarder =
            HttpForwarder::new("http://127.0.0.1:9/mcp".to_string(), Duration::from_secs(2));

        let err = forwarder.forward("ping").await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }
}
