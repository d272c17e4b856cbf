//! OpenAI-compatible chat completions gateway
//!
//! Hosted logical model ids (gemini-pro, gemini-flash, claude-haiku, gpt-5)
//! are sent to a single `/chat/completions` endpoint. The remote model name
//! comes from the configured alias map, falling back to the logical id.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GenerationResponse, Message, ModelProvider, ProviderError, ThinkingMode};

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct CompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionContent,
}

#[derive(Debug, Deserialize)]
struct CompletionContent {
    #[serde(default)]
    content: Option<String>,
}

/// Provider for hosted models behind an OpenAI-compatible API
pub struct GatewayProvider {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    aliases: HashMap<String, String>,
    send_reasoning_effort: bool,
}

impl GatewayProvider {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            aliases: HashMap::new(),
            send_reasoning_effort: true,
        }
    }

    /// Map logical model ids to the names the remote API expects
    pub fn with_aliases(mut self, aliases: HashMap<String, String>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Toggle forwarding of the thinking mode as `reasoning_effort`
    pub fn with_reasoning_effort(mut self, enabled: bool) -> Self {
        self.send_reasoning_effort = enabled;
        self
    }

    fn remote_model<'a>(&'a self, model: &'a str) -> &'a str {
        self.aliases.get(model).map(String::as_str).unwrap_or(model)
    }
}

#[async_trait]
impl ModelProvider for GatewayProvider {
    fn name(&self) -> &str {
        "gateway"
    }

    async fn generate(
        &self,
        messages: &[Message],
        model: &str,
        thinking_mode: ThinkingMode,
    ) -> Result<GenerationResponse, ProviderError> {
        let remote = self.remote_model(model);
        let request = CompletionRequest {
            model: remote,
            messages: messages
                .iter()
                .map(|m| CompletionMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            reasoning_effort: self.send_reasoning_effort.then(|| thinking_mode.as_str()),
        };

        let url = format!("{}/chat/completions", self.base_url);
        let started = Instant::now();
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::new(model, format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::new(
                model,
                format!("HTTP {}: {}", status, body),
            ));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(model, format!("Invalid response body: {}", e)))?;

        tracing::debug!(
            model = %model,
            remote = %remote,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Gateway completion received"
        );

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::new(model, "Response contained no choices"))?;

        Ok(GenerationResponse {
            content,
            model: body.model.unwrap_or_else(|| remote.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_lookup() {
        let mut aliases = HashMap::new();
        aliases.insert("gemini-pro".to_string(), "google/gemini-2.5-pro".to_string());
        let provider =
            GatewayProvider::new("https://gateway.test/v1/", "key").with_aliases(aliases);

        assert_eq!(provider.base_url, "https://gateway.test/v1");
        assert_eq!(provider.remote_model("gemini-pro"), "google/gemini-2.5-pro");
        assert_eq!(provider.remote_model("gpt-5"), "gpt-5");
    }

    #[test]
    fn test_request_serialization() {
        let request = CompletionRequest {
            model: "gpt-5",
            messages: vec![CompletionMessage {
                role: "user",
                content: "hello",
            }],
            reasoning_effort: None,
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["messages"][0]["role"], "user");
        assert!(json.get("reasoning_effort").is_none());
    }
}
