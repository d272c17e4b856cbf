//! Model selection and provider dispatch

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::llm::{Message, ProviderError, ProviderRegistry, ThinkingMode};

/// Model used for agent types missing from the selection table
pub const FALLBACK_MODEL: &str = "gemini-flash";

/// Cost/quality trade-off applied on top of the base selection table
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ModelStrategy {
    #[default]
    Auto,
    CostOptimized,
    PerformanceOptimized,
    Balanced,
}

impl ModelStrategy {
    pub const ALL: [ModelStrategy; 4] = [
        Self::Auto,
        Self::CostOptimized,
        Self::PerformanceOptimized,
        Self::Balanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::CostOptimized => "cost_optimized",
            Self::PerformanceOptimized => "performance_optimized",
            Self::Balanced => "balanced",
        }
    }

    /// Parse a strategy name, treating anything unrecognized as `Auto`
    pub fn from_name_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown model strategy '{}', using auto", name);
            Self::Auto
        })
    }

    fn substitute<'a>(&self, model: &'a str) -> &'a str {
        match (self, model) {
            (Self::CostOptimized, "gemini-pro" | "claude-haiku") => "gemini-flash",
            (Self::PerformanceOptimized, "gemini-flash" | "ollama") => "gemini-pro",
            (Self::Balanced, "gemini-pro" | "ollama") => "gemini-flash",
            _ => model,
        }
    }
}

impl fmt::Display for ModelStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s.trim())
            .ok_or_else(|| format!("unknown model strategy '{}'", s))
    }
}

fn base_model(agent_type: &str) -> &'static str {
    match agent_type {
        "architecture" => "gemini-pro",
        "implementation" => "gemini-flash",
        "optimization" => "ollama",
        "content" => "claude-haiku",
        "procedural_puzzle" => "gemini-pro",
        "dynamic_difficulty" => "gemini-pro",
        "narrative" => "claude-haiku",
        "asset_optimization" => "ollama",
        "story_weaver" => "ollama",
        "psychology" => "ollama",
        "game_expert" => "gemini-pro",
        "pop_culture" => "ollama",
        "ux_ui" => "ollama",
        "creative_features" => "gemini-pro",
        _ => FALLBACK_MODEL,
    }
}

/// Pick the model id for an agent type under a strategy
pub fn select_model(agent_type: &str, strategy: ModelStrategy) -> String {
    let model = strategy.substitute(base_model(agent_type));
    tracing::debug!(agent_type, %strategy, model, "Selected model");
    model.to_string()
}

/// Sends prompts to whichever provider serves a model id
#[derive(Debug, Clone)]
pub struct ModelDispatcher {
    providers: ProviderRegistry,
    timeout: Option<Duration>,
}

impl ModelDispatcher {
    pub fn new(providers: ProviderRegistry) -> Self {
        Self {
            providers,
            timeout: None,
        }
    }

    /// Bound each provider round-trip; `None` waits indefinitely
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn is_available(&self, model: &str) -> bool {
        self.providers.is_available(model)
    }

    /// One provider round-trip, returning the generated text unmodified
    pub async fn generate(
        &self,
        messages: &[Message],
        model: &str,
        thinking_mode: ThinkingMode,
    ) -> Result<String, ProviderError> {
        let provider = self
            .providers
            .resolve(model)
            .ok_or_else(|| ProviderError::unavailable(model))?;

        tracing::debug!(
            model,
            provider = provider.name(),
            thinking = %thinking_mode,
            prompt_chars = messages.iter().map(|m| m.content.len()).sum::<usize>(),
            "Dispatching prompt"
        );

        let call = provider.generate(messages, model, thinking_mode);
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ProviderError::timed_out(model, limit))??,
            None => call.await?,
        };

        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedProvider;
    use std::sync::Arc;

    #[test]
    fn test_strategy_examples() {
        assert_eq!(select_model("architecture", ModelStrategy::Auto), "gemini-pro");
        assert_eq!(
            select_model("architecture", ModelStrategy::CostOptimized),
            "gemini-flash"
        );
        assert_eq!(
            select_model("implementation", ModelStrategy::PerformanceOptimized),
            "gemini-pro"
        );
        assert_eq!(select_model("content", ModelStrategy::Balanced), "claude-haiku");
        assert_eq!(select_model("optimization", ModelStrategy::Balanced), "gemini-flash");
        assert_eq!(select_model("content", ModelStrategy::CostOptimized), "gemini-flash");
    }

    #[test]
    fn test_unknown_agent_type_falls_back() {
        assert_eq!(select_model("wizard", ModelStrategy::Auto), "gemini-flash");
        assert_eq!(
            select_model("wizard", ModelStrategy::PerformanceOptimized),
            "gemini-pro"
        );
    }

    #[test]
    fn test_selection_is_deterministic() {
        for strategy in ModelStrategy::ALL {
            for agent in ["architecture", "narrative", "ux_ui", "unknown"] {
                assert_eq!(select_model(agent, strategy), select_model(agent, strategy));
            }
        }
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("balanced".parse::<ModelStrategy>(), Ok(ModelStrategy::Balanced));
        assert!("cheap".parse::<ModelStrategy>().is_err());
        assert_eq!(ModelStrategy::from_name_lenient("cheap"), ModelStrategy::Auto);
        assert_eq!(
            serde_json::to_string(&ModelStrategy::CostOptimized).unwrap(),
            "\"cost_optimized\""
        );
    }

    #[tokio::test]
    async fn test_generate_unavailable_model() {
        let dispatcher = ModelDispatcher::new(ProviderRegistry::new());
        let err = dispatcher
            .generate(&[Message::user("hi")], "gpt-5", ThinkingMode::Low)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Model gpt-5 not available");
    }

    #[tokio::test]
    async fn test_generate_times_out() {
        let provider = Arc::new(
            ScriptedProvider::new().delay_for_model("ollama", Duration::from_secs(5)),
        );
        let dispatcher = ModelDispatcher::new(ProviderRegistry::scripted(provider))
            .with_timeout(Some(Duration::from_millis(20)));

        let err = dispatcher
            .generate(&[Message::user("hi")], "ollama", ThinkingMode::Medium)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Model ollama timed out after 20ms");
    }
}
