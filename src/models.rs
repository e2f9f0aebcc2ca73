//! Data models and structures
//!
//! Defines the relay's configuration, the credential wrapper, and the reply
//! body returned to HTTP callers.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8811;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Gemini API key. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// Behaviour switches for the request adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayOptions {
    /// Only accept JSON bodies with a `query` field.
    pub strict_input_schema: bool,
    /// Log request/response content at info instead of debug.
    pub verbose_logging: bool,
}

/// Body returned by `POST /mcp`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayResponse {
    pub response: String,
}

impl RelayResponse {
    pub fn new(response: String) -> Self {
        Self { response }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: ApiKey,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub request_timeout: Duration,
    pub host: String,
    pub port: u16,
    pub options: RelayOptions,
}

impl Config {
    /// Load configuration from the process environment (and `.env` if present).
    ///
    /// Fails when `GEMINI_API_KEY` is missing or empty so a misconfigured
    /// relay never starts accepting requests.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = var("GEMINI_API_KEY")
            .map(ApiKey::new)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Configuration("GEMINI_API_KEY not set".to_string()))?;

        let timeout_secs = match var("GEMINI_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::Configuration(format!("GEMINI_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(Error::Configuration(
                "GEMINI_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        let port = match var("RELAY_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                Error::Configuration(format!("RELAY_PORT is not a valid port: {}", raw))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            gemini_api_key,
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: var("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout: Duration::from_secs(timeout_secs),
            host: var("RELAY_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            options: RelayOptions {
                strict_input_schema: parse_flag(&var, "RELAY_STRICT_INPUT")?,
                verbose_logging: parse_flag(&var, "RELAY_VERBOSE_LOGGING")?,
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag<F>(var: &F, name: &str) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = var(name) else {
        return Ok(false);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Configuration(format!(
            "{} must be a boolean, got: {}",
            name, raw
        ))),
    }
}
