use super::types::GenerateContentRequest;
use crate::ai::GenerationService;
use crate::models::{ApiKey, DEFAULT_BASE_URL};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Gemini REST client for the `generateContent` endpoint.
///
/// The API key is supplied per call and sent as the `key` query parameter.
pub struct GeminiClient {
    client: Client,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Construct a Gemini client.
    ///
    /// `model` should be the bare model ID (for example `gemini-1.5-flash`);
    /// a leading `models/` is stripped.
    pub fn new(model: String, timeout: Duration) -> Self {
        Self::new_with_client(model, timeout, Client::new())
    }

    pub fn new_with_client(model: String, timeout: Duration, client: Client) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Endpoint URL without the credential, safe to log.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    fn describe(&self) -> String {
        self.endpoint()
    }

    async fn generate_content(
        &self,
        api_key: &ApiKey,
        request: &GenerateContentRequest,
    ) -> Result<Value> {
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key.expose())])
            .timeout(self.timeout)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                // reqwest includes the URL in its message; drop it so the key stays out of logs.
                let e = e.without_url();
                tracing::error!("Failed to send request to Gemini: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.map_err(|e| e.without_url())?;
            tracing::error!("Gemini API error (status {}): {}", status, error_text);
            return Err(Error::Upstream(format!(
                "Gemini API error (status {}): {}",
                status, error_text
            )));
        }

        let body = response.text().await.map_err(|e| e.without_url())?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::ResponseShape(format!("Gemini response is not valid JSON: {}", e))
        })
    }
}
