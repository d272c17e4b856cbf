//! Ollama provider

use async_trait::async_trait;
use ollama_rs::{
    generation::chat::{request::ChatMessageRequest, ChatMessage},
    Ollama,
};
use serde::{Deserialize, Serialize};

use super::{GenerationResponse, Message, ModelProvider, ProviderError, Role, ThinkingMode};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 11434;

/// Information about an available model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub size: u64,
    pub modified_at: String,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    models: Vec<ModelInfo>,
}

/// List models pulled into the local Ollama server
pub async fn list_models(ollama_url: &str) -> anyhow::Result<Vec<ModelInfo>> {
    let base = ollama_url.trim_end_matches('/');
    let api_url = format!("{}/api/tags", base);

    let response: OllamaTagsResponse = reqwest::Client::new()
        .get(&api_url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(response.models)
}

/// Provider backed by a local Ollama server
///
/// The logical model ids `ollama` and `custom` resolve to the configured local
/// model. Ids written as `ollama:<name>` address a specific local model.
pub struct OllamaProvider {
    client: Ollama,
    local_model: String,
}

impl OllamaProvider {
    pub fn new(url: &str, local_model: &str) -> Self {
        let (scheme, host, port) = match url::Url::parse(url) {
            Ok(parsed) => (
                parsed.scheme().to_string(),
                parsed.host_str().unwrap_or(DEFAULT_HOST).to_string(),
                parsed.port().unwrap_or(DEFAULT_PORT),
            ),
            Err(e) => {
                tracing::warn!("Invalid Ollama URL '{}' ({}), using localhost", url, e);
                ("http".to_string(), DEFAULT_HOST.to_string(), DEFAULT_PORT)
            }
        };

        Self {
            client: Ollama::new(format!("{}://{}", scheme, host), port),
            local_model: local_model.to_string(),
        }
    }

    fn resolve_model(&self, model: &str) -> String {
        match model {
            "ollama" | "custom" => self.local_model.clone(),
            other => other
                .strip_prefix("ollama:")
                .unwrap_or(other)
                .to_string(),
        }
    }
}

#[async_trait]
impl ModelProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(
        &self,
        messages: &[Message],
        model: &str,
        thinking_mode: ThinkingMode,
    ) -> Result<GenerationResponse, ProviderError> {
        let local_model = self.resolve_model(model);

        let chat_messages: Vec<ChatMessage> = messages
            .iter()
            .map(|m| match m.role {
                Role::System => ChatMessage::system(m.content.clone()),
                Role::User => ChatMessage::user(m.content.clone()),
                Role::Assistant => ChatMessage::assistant(m.content.clone()),
            })
            .collect();

        // Ollama chat has no reasoning budget knob; the hint is only logged.
        tracing::debug!(
            model = %local_model,
            thinking = %thinking_mode,
            messages = chat_messages.len(),
            "Sending chat request to Ollama"
        );

        let request = ChatMessageRequest::new(local_model.clone(), chat_messages);
        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| ProviderError::new(model, format!("Ollama request failed: {}", e)))?;

        Ok(GenerationResponse {
            content: response.message.content,
            model: local_model,
        })
    }
}
