//! LLM provider abstraction layer
//!
//! The orchestration core talks to language models only through
//! [`ModelProvider`]. Providers are looked up per model id through a
//! [`ProviderRegistry`].

mod gateway;
mod ollama;
mod registry;
mod scripted;

pub use gateway::GatewayProvider;
pub use ollama::{list_models, ModelInfo, OllamaProvider};
pub use registry::ProviderRegistry;
pub use scripted::{RecordedCall, ScriptedProvider};

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Coarse reasoning-depth hint passed opaquely to the provider
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingMode {
    Low,
    #[default]
    Medium,
    High,
}

impl ThinkingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ThinkingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThinkingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!(
                "unknown thinking mode '{}' (expected low, medium or high)",
                other
            )),
        }
    }
}

/// Successful provider round-trip
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    /// Generated text, returned to callers unmodified
    pub content: String,
    /// Model id the provider actually used
    pub model: String,
}

/// Failure of a provider round-trip
///
/// Timeouts, auth failures, rate limits and unknown models are all collapsed
/// into this single kind at the provider boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{cause}")]
pub struct ProviderError {
    pub model: String,
    pub cause: String,
}

impl ProviderError {
    pub fn new(model: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            cause: cause.into(),
        }
    }

    /// No provider is registered for the model
    pub fn unavailable(model: &str) -> Self {
        Self::new(model, format!("Model {} not available", model))
    }

    /// The provider did not answer within the configured bound
    pub fn timed_out(model: &str, limit: Duration) -> Self {
        Self::new(model, format!("Model {} timed out after {:?}", model, limit))
    }
}

/// Trait for model backends
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Short provider name for logging
    fn name(&self) -> &str;

    /// Generate a response for the given conversation
    async fn generate(
        &self,
        messages: &[Message],
        model: &str,
        thinking_mode: ThinkingMode,
    ) -> Result<GenerationResponse, ProviderError>;
}

/// Family a model id belongs to, used as a routing fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelCategory {
    Gemini,
    OpenAi,
    Custom,
    General,
}

impl ModelCategory {
    /// Classify a model id by its name
    pub fn from_model(model: &str) -> Self {
        let model = model.to_ascii_lowercase();
        if model.contains("gemini") {
            Self::Gemini
        } else if model.contains("gpt") {
            Self::OpenAi
        } else if model.contains("ollama") || model.contains("custom") {
            Self::Custom
        } else {
            Self::General
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thinking_mode_parsing() {
        assert_eq!("HIGH".parse::<ThinkingMode>(), Ok(ThinkingMode::High));
        assert_eq!(" low ".parse::<ThinkingMode>(), Ok(ThinkingMode::Low));
        assert!("deep".parse::<ThinkingMode>().is_err());
        assert_eq!(ThinkingMode::default(), ThinkingMode::Medium);
    }

    #[test]
    fn test_thinking_mode_serde() {
        let mode: ThinkingMode = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(mode, ThinkingMode::High);
        assert_eq!(serde_json::to_string(&ThinkingMode::Low).unwrap(), "\"low\"");
    }

    #[test]
    fn test_model_category() {
        assert_eq!(ModelCategory::from_model("gemini-pro"), ModelCategory::Gemini);
        assert_eq!(ModelCategory::from_model("gpt-5"), ModelCategory::OpenAi);
        assert_eq!(ModelCategory::from_model("ollama"), ModelCategory::Custom);
        assert_eq!(ModelCategory::from_model("claude-haiku"), ModelCategory::General);
    }

    #[test]
    fn test_provider_error_messages() {
        assert_eq!(
            ProviderError::unavailable("gpt-5").to_string(),
            "Model gpt-5 not available"
        );
        assert_eq!(
            ProviderError::timed_out("ollama", Duration::from_secs(30)).to_string(),
            "Model ollama timed out after 30s"
        );
        assert_eq!(
            ProviderError::timed_out("ollama", Duration::from_millis(50)).to_string(),
            "Model ollama timed out after 50ms"
        );
    }
}
