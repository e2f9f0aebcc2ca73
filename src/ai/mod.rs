//! Downstream generation API integration
//!
//! Provides the Gemini `generateContent` client used by the relay, plus an
//! in-memory mock for tests and local harnesses.

pub mod gemini;
pub mod mock;

pub use gemini::{GeminiClient, GenerateContentRequest};
pub use mock::MockGenerationClient;

use crate::models::ApiKey;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Human-readable target used in log lines. Must not contain credentials.
    fn describe(&self) -> String;

    /// Send one `generateContent` request and return the raw JSON reply.
    async fn generate_content(
        &self,
        api_key: &ApiKey,
        request: &GenerateContentRequest,
    ) -> Result<Value>;
}
