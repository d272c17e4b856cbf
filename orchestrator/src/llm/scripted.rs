//! Scripted provider for dry runs and tests
//!
//! Replies are chosen by the first matching rule. A rule matches when the
//! model id equals its model, or when the latest message contains its needle.
//! Without a matching rule the provider echoes the first prompt line.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{GenerationResponse, Message, ModelProvider, ProviderError, ThinkingMode};

#[derive(Debug, Clone)]
enum Matcher {
    Contains(String),
    Model(String),
}

impl Matcher {
    fn matches(&self, prompt: &str, model: &str) -> bool {
        match self {
            Self::Contains(needle) => prompt.contains(needle.as_str()),
            Self::Model(m) => m == model,
        }
    }
}

#[derive(Debug, Clone)]
enum Action {
    Reply(String),
    Fail(String),
}

#[derive(Debug, Clone)]
struct Rule {
    matcher: Matcher,
    action: Action,
}

#[derive(Debug, Clone)]
struct Delay {
    matcher: Matcher,
    duration: Duration,
}

/// One call received by a [`ScriptedProvider`]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub thinking_mode: ThinkingMode,
    /// Content of the latest message
    pub prompt: String,
    /// Number of messages sent, including replayed thread turns
    pub message_count: usize,
}

#[derive(Debug, Default)]
pub struct ScriptedProvider {
    name: String,
    rules: Vec<Rule>,
    delays: Vec<Delay>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            name: "scripted".to_string(),
            ..Default::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Reply with `text` when the prompt contains `needle`
    pub fn reply_when(mut self, needle: impl Into<String>, text: impl Into<String>) -> Self {
        self.rules.push(Rule {
            matcher: Matcher::Contains(needle.into()),
            action: Action::Reply(text.into()),
        });
        self
    }

    /// Reply with `text` for every call addressed to `model`
    pub fn reply_for_model(mut self, model: impl Into<String>, text: impl Into<String>) -> Self {
        self.rules.push(Rule {
            matcher: Matcher::Model(model.into()),
            action: Action::Reply(text.into()),
        });
        self
    }

    /// Fail with `cause` when the prompt contains `needle`
    pub fn fail_when(mut self, needle: impl Into<String>, cause: impl Into<String>) -> Self {
        self.rules.push(Rule {
            matcher: Matcher::Contains(needle.into()),
            action: Action::Fail(cause.into()),
        });
        self
    }

    /// Fail with `cause` for every call addressed to `model`
    pub fn fail_for_model(mut self, model: impl Into<String>, cause: impl Into<String>) -> Self {
        self.rules.push(Rule {
            matcher: Matcher::Model(model.into()),
            action: Action::Fail(cause.into()),
        });
        self
    }

    /// Sleep before answering when the prompt contains `needle`
    pub fn delay_when(mut self, needle: impl Into<String>, duration: Duration) -> Self {
        self.delays.push(Delay {
            matcher: Matcher::Contains(needle.into()),
            duration,
        });
        self
    }

    /// Sleep before answering every call addressed to `model`
    pub fn delay_for_model(mut self, model: impl Into<String>, duration: Duration) -> Self {
        self.delays.push(Delay {
            matcher: Matcher::Model(model.into()),
            duration,
        });
        self
    }

    /// Calls received so far, in arrival order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    fn echo(prompt: &str, model: &str, thinking_mode: ThinkingMode) -> String {
        let first_line = prompt
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("");
        format!("[dry-run:{}/{}] {}", model, thinking_mode, first_line)
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        messages: &[Message],
        model: &str,
        thinking_mode: ThinkingMode,
    ) -> Result<GenerationResponse, ProviderError> {
        let prompt = messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                model: model.to_string(),
                thinking_mode,
                prompt: prompt.to_string(),
                message_count: messages.len(),
            });
        }

        if let Some(delay) = self.delays.iter().find(|d| d.matcher.matches(prompt, model)) {
            tokio::time::sleep(delay.duration).await;
        }

        let content = match self.rules.iter().find(|r| r.matcher.matches(prompt, model)) {
            Some(Rule {
                action: Action::Fail(cause),
                ..
            }) => return Err(ProviderError::new(model, cause.clone())),
            Some(Rule {
                action: Action::Reply(text),
                ..
            }) => text.clone(),
            None => Self::echo(prompt, model, thinking_mode),
        };

        Ok(GenerationResponse {
            content,
            model: model.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_default() {
        let provider = ScriptedProvider::new();
        let response = provider
            .generate(
                &[Message::user("\nDesign a door puzzle\nmore")],
                "gemini-pro",
                ThinkingMode::High,
            )
            .await
            .unwrap();

        assert_eq!(response.content, "[dry-run:gemini-pro/high] Design a door puzzle");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_rules_first_match_wins() {
        let provider = ScriptedProvider::new()
            .fail_for_model("gpt-5", "rate limited")
            .reply_when("door", "a locked door");

        let err = provider
            .generate(&[Message::user("door")], "gpt-5", ThinkingMode::Low)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "rate limited");
        assert_eq!(err.model, "gpt-5");

        let ok = provider
            .generate(&[Message::user("door")], "gemini-pro", ThinkingMode::Low)
            .await
            .unwrap();
        assert_eq!(ok.content, "a locked door");

        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].model, "gemini-pro");
    }
}
