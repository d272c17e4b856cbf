//! Model id to provider routing

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{GatewayProvider, ModelCategory, ModelProvider, OllamaProvider, ScriptedProvider};
use crate::config::StudioConfig;

/// Resolves a model id to the provider that serves it
///
/// Lookup order is exact model id, then model category, then the optional
/// fallback provider.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    by_model: HashMap<String, Arc<dyn ModelProvider>>,
    by_category: HashMap<ModelCategory, Arc<dyn ModelProvider>>,
    fallback: Option<Arc<dyn ModelProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route one exact model id to a provider
    pub fn register_model(
        &mut self,
        model: impl Into<String>,
        provider: Arc<dyn ModelProvider>,
    ) -> &mut Self {
        self.by_model.insert(model.into(), provider);
        self
    }

    /// Route every model of a category to a provider
    pub fn register_category(
        &mut self,
        category: ModelCategory,
        provider: Arc<dyn ModelProvider>,
    ) -> &mut Self {
        self.by_category.insert(category, provider);
        self
    }

    pub fn with_fallback(mut self, provider: Arc<dyn ModelProvider>) -> Self {
        self.fallback = Some(provider);
        self
    }

    pub fn resolve(&self, model: &str) -> Option<Arc<dyn ModelProvider>> {
        self.by_model
            .get(model)
            .or_else(|| self.by_category.get(&ModelCategory::from_model(model)))
            .or(self.fallback.as_ref())
            .cloned()
    }

    pub fn is_available(&self, model: &str) -> bool {
        self.resolve(model).is_some()
    }

    /// Serve every model id from one scripted provider
    pub fn scripted(provider: Arc<ScriptedProvider>) -> Self {
        Self::new().with_fallback(provider)
    }

    /// Build the registry from configuration
    ///
    /// Ollama always serves the custom category. The hosted gateway is only
    /// registered when its API key environment variable is set, so hosted ids
    /// stay unresolvable otherwise.
    pub fn from_config(config: &StudioConfig) -> Self {
        let mut registry = Self::new();

        let ollama: Arc<dyn ModelProvider> =
            Arc::new(OllamaProvider::new(&config.ollama.url, &config.ollama.model));
        registry
            .register_model("ollama", ollama.clone())
            .register_category(ModelCategory::Custom, ollama);

        match std::env::var(&config.gateway.api_key_env) {
            Ok(key) if !key.trim().is_empty() => {
                let gateway: Arc<dyn ModelProvider> = Arc::new(
                    GatewayProvider::new(&config.gateway.base_url, key)
                        .with_aliases(config.gateway.models.clone())
                        .with_reasoning_effort(config.gateway.send_reasoning_effort),
                );
                registry
                    .register_category(ModelCategory::Gemini, gateway.clone())
                    .register_category(ModelCategory::OpenAi, gateway.clone())
                    .register_category(ModelCategory::General, gateway);
            }
            _ => {
                tracing::debug!(
                    "{} not set; hosted models are unavailable",
                    config.gateway.api_key_env
                );
            }
        }

        registry
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut models: Vec<_> = self.by_model.keys().collect();
        models.sort();
        f.debug_struct("ProviderRegistry")
            .field("models", &models)
            .field("categories", &self.by_category.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.as_ref().map(|p| p.name().to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_order() {
        let exact = Arc::new(ScriptedProvider::new().named("exact"));
        let gemini = Arc::new(ScriptedProvider::new().named("gemini"));

        let mut registry = ProviderRegistry::new();
        registry
            .register_model("gemini-pro", exact)
            .register_category(ModelCategory::Gemini, gemini);

        assert_eq!(registry.resolve("gemini-pro").unwrap().name(), "exact");
        assert_eq!(registry.resolve("gemini-flash").unwrap().name(), "gemini");
        assert!(registry.resolve("gpt-5").is_none());
        assert!(!registry.is_available("claude-haiku"));
    }

    #[test]
    fn test_fallback() {
        let registry = ProviderRegistry::scripted(Arc::new(ScriptedProvider::new()));
        assert!(registry.is_available("anything"));
    }
}
