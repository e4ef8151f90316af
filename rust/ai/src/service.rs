//! External decision-service contract.
//!
//! The service is an external collaborator: this crate only specifies the
//! request/response shapes and the timeout discipline. A timed-out call
//! is abandoned, never retried within a single decision; retries, if any,
//! belong to the service implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::AgentError;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    DeepSeek,
    Custom,
}

/// Configuration of one external model an agent may consult.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub id: String,
    pub name: String,
    pub provider: Provider,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Per-call timeout in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    JsonObject,
    Text,
}

/// What the agent sends to the external service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub response_format: ResponseFormat,
}

/// The untyped reply as it comes back, before any validation.
pub type RawDecision = serde_json::Value;

/// An external decision source. Implementations wrap whatever transport
/// the provider needs; the pipeline only sees JSON in, JSON out.
#[async_trait]
pub trait DecisionService: Send + Sync {
    async fn request(&self, request: &DecisionRequest) -> Result<RawDecision, AgentError>;
}

/// Invoke the service with a hard upper bound. On timeout the pending
/// call is dropped and [`AgentError::Timeout`] is returned immediately.
pub async fn request_with_timeout(
    service: &dyn DecisionService,
    request: &DecisionRequest,
    bound: Duration,
) -> Result<RawDecision, AgentError> {
    tokio::time::timeout(bound, service.request(request))
        .await
        .map_err(|_| AgentError::Timeout)?
}
