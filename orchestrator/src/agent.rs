//! Executable agents
//!
//! An agent turns an [`AgentRequest`] into text. Specialized agents fill their
//! prompt template and make one provider round-trip; the consensus agent fans
//! out to several models.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::config::default_consensus_models;
use crate::consensus::ConsensusCollector;
use crate::dispatch::ModelDispatcher;
use crate::error::OrchestratorError;
use crate::llm::{Message, ThinkingMode};
use crate::profile::{AgentProfile, AgentRegistry};
use crate::prompts::{self, PromptBuilder};
use crate::task::AgentRequest;
use crate::thread::ThreadLog;

#[async_trait]
pub trait Agent: Send + Sync {
    fn profile(&self) -> &AgentProfile;

    /// Run the agent once; no retries are attempted
    async fn execute(&self, request: &AgentRequest) -> Result<String, OrchestratorError>;

    /// Model the agent would use for this request
    fn model_for(&self, request: &AgentRequest) -> String {
        request
            .model
            .clone()
            .unwrap_or_else(|| self.profile().preferred_model.clone())
    }

    fn thinking_for(&self, request: &AgentRequest) -> ThinkingMode {
        request.thinking_mode.unwrap_or(self.profile().thinking_mode)
    }
}

/// Single-model agent backed by a prompt template
pub struct SpecializedAgent {
    profile: AgentProfile,
    build_prompt: PromptBuilder,
    dispatcher: Arc<ModelDispatcher>,
    threads: Option<Arc<dyn ThreadLog>>,
}

impl SpecializedAgent {
    pub fn new(
        profile: AgentProfile,
        build_prompt: PromptBuilder,
        dispatcher: Arc<ModelDispatcher>,
    ) -> Self {
        Self {
            profile,
            build_prompt,
            dispatcher,
            threads: None,
        }
    }

    /// Replay and record turns for requests carrying a continuation id
    pub fn with_threads(mut self, threads: Arc<dyn ThreadLog>) -> Self {
        self.threads = Some(threads);
        self
    }
}

#[async_trait]
impl Agent for SpecializedAgent {
    fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    async fn execute(&self, request: &AgentRequest) -> Result<String, OrchestratorError> {
        let prompt = (self.build_prompt)(request, &self.profile.name)?;
        let model = self.model_for(request);
        let thinking = self.thinking_for(request);

        let thread = match (&self.threads, &request.continuation_id) {
            (Some(log), Some(id)) => Some((log, id)),
            _ => None,
        };

        let mut messages = thread
            .map(|(log, id)| log.get_thread(id))
            .unwrap_or_default();
        messages.push(Message::user(prompt.clone()));

        let start = Instant::now();
        let text = self
            .dispatcher
            .generate(&messages, &model, thinking)
            .await
            .map_err(|source| OrchestratorError::AgentExecutionFailed {
                agent: self.profile.name.clone(),
                model: model.clone(),
                source,
            })?;

        tracing::debug!(
            agent = %self.profile.name,
            model = %model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Agent completed"
        );

        if let Some((log, id)) = thread {
            log.add_turn(id, Message::user(prompt));
            log.add_turn(id, Message::assistant(text.clone()));
        }

        Ok(text)
    }
}

/// Fans one prompt out to several models
pub struct ConsensusAgent {
    profile: AgentProfile,
    collector: ConsensusCollector,
    default_models: Vec<String>,
    default_thinking: ThinkingMode,
}

impl ConsensusAgent {
    pub fn new(profile: AgentProfile, dispatcher: Arc<ModelDispatcher>) -> Self {
        Self {
            default_thinking: profile.thinking_mode,
            profile,
            collector: ConsensusCollector::new(dispatcher),
            default_models: default_consensus_models(),
        }
    }

    /// Models used when the request names none
    pub fn with_default_models(mut self, models: Vec<String>) -> Self {
        self.default_models = models;
        self
    }

    /// Thinking depth used when the request carries no override
    pub fn with_default_thinking(mut self, thinking_mode: ThinkingMode) -> Self {
        self.default_thinking = thinking_mode;
        self
    }
}

#[async_trait]
impl Agent for ConsensusAgent {
    fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    fn model_for(&self, request: &AgentRequest) -> String {
        let models = request.string_list("models");
        if models.is_empty() {
            self.default_models.join(", ")
        } else {
            models.join(", ")
        }
    }

    fn thinking_for(&self, request: &AgentRequest) -> ThinkingMode {
        request.thinking_mode.unwrap_or(self.default_thinking)
    }

    async fn execute(&self, request: &AgentRequest) -> Result<String, OrchestratorError> {
        let prompt = request.require_str(&self.profile.name, "prompt")?;
        let files = request.string_list("files");
        let mut models = request.string_list("models");
        if models.is_empty() {
            models = self.default_models.clone();
        }

        Ok(self
            .collector
            .run(&prompt, &files, &models, self.thinking_for(request))
            .await)
    }
}

/// Construction options for an [`AgentSet`]
#[derive(Clone, Default)]
pub struct AgentSetOptions {
    pub threads: Option<Arc<dyn ThreadLog>>,
    /// Defaults to the built-in consensus model list
    pub consensus_models: Option<Vec<String>>,
    /// Defaults to the consensus profile's thinking depth
    pub consensus_thinking: Option<ThinkingMode>,
}

/// Executable agents for every profile in a registry
#[derive(Clone)]
pub struct AgentSet {
    registry: Arc<AgentRegistry>,
    agents: HashMap<String, Arc<dyn Agent>>,
    dispatcher: Arc<ModelDispatcher>,
}

impl AgentSet {
    pub fn new(registry: AgentRegistry, dispatcher: ModelDispatcher) -> Self {
        Self::with_options(registry, dispatcher, AgentSetOptions::default())
    }

    pub fn with_options(
        registry: AgentRegistry,
        dispatcher: ModelDispatcher,
        options: AgentSetOptions,
    ) -> Self {
        let dispatcher = Arc::new(dispatcher);
        let mut agents: HashMap<String, Arc<dyn Agent>> = HashMap::new();

        for profile in registry.iter() {
            let agent: Arc<dyn Agent> = if !profile.requires_model {
                let mut agent = ConsensusAgent::new(profile.clone(), dispatcher.clone());
                if let Some(models) = &options.consensus_models {
                    agent = agent.with_default_models(models.clone());
                }
                if let Some(thinking) = options.consensus_thinking {
                    agent = agent.with_default_thinking(thinking);
                }
                Arc::new(agent)
            } else if let Some(builder) = prompts::builder_for(&profile.name) {
                let mut agent = SpecializedAgent::new(profile.clone(), builder, dispatcher.clone());
                if let Some(threads) = &options.threads {
                    agent = agent.with_threads(threads.clone());
                }
                Arc::new(agent)
            } else {
                tracing::warn!(agent = %profile.name, "No prompt template for profile, skipping");
                continue;
            };
            agents.insert(profile.name.clone(), agent);
        }

        Self {
            registry: Arc::new(registry),
            agents,
            dispatcher,
        }
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Agent>, OrchestratorError> {
        self.agents
            .get(name)
            .cloned()
            .ok_or_else(|| OrchestratorError::UnknownAgent(name.to_string()))
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Arc<ModelDispatcher> {
        &self.dispatcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ProviderRegistry, ScriptedProvider};
    use crate::thread::InMemoryThreadLog;

    fn agents(provider: Arc<ScriptedProvider>) -> AgentSet {
        AgentSet::new(
            AgentRegistry::builtin(),
            ModelDispatcher::new(ProviderRegistry::scripted(provider)),
        )
    }

    #[tokio::test]
    async fn test_uses_profile_defaults() {
        let provider = Arc::new(ScriptedProvider::new().reply_when("Design the lobby", "A plan"));
        let agent = agents(provider.clone()).get("architecture").unwrap();

        let out = agent
            .execute(&AgentRequest::new().with("prompt", "Design the lobby"))
            .await
            .unwrap();

        assert_eq!(out, "A plan");
        let call = &provider.calls()[0];
        assert_eq!(call.model, "gemini-pro");
        assert_eq!(call.thinking_mode, ThinkingMode::High);
        assert_eq!(call.message_count, 1);
    }

    #[tokio::test]
    async fn test_overrides_and_failure_wrapping() {
        let provider = Arc::new(ScriptedProvider::new().fail_for_model("gpt-5", "quota exceeded"));
        let agent = agents(provider.clone()).get("content").unwrap();

        let request = AgentRequest::new()
            .with("prompt", "Write item flavor text")
            .with_model("gpt-5")
            .with_thinking(ThinkingMode::Low);
        let err = agent.execute(&request).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Agent content failed to execute with model gpt-5: quota exceeded"
        );
        assert_eq!(provider.calls()[0].thinking_mode, ThinkingMode::Low);
    }

    #[tokio::test]
    async fn test_missing_field_skips_provider() {
        let provider = Arc::new(ScriptedProvider::new());
        let agent = agents(provider.clone()).get("narrative").unwrap();

        let err = agent.execute(&AgentRequest::new()).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::MissingField { .. }));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_thread_replay() {
        let provider = Arc::new(ScriptedProvider::new());
        let log = Arc::new(InMemoryThreadLog::new());
        let thread_id = log.new_thread();
        let set = AgentSet::with_options(
            AgentRegistry::builtin(),
            ModelDispatcher::new(ProviderRegistry::scripted(provider.clone())),
            AgentSetOptions {
                threads: Some(log.clone()),
                ..Default::default()
            },
        );
        let agent = set.get("implementation").unwrap();

        for prompt in ["Add a pause menu", "Now add a settings tab"] {
            agent
                .execute(
                    &AgentRequest::new()
                        .with("prompt", prompt)
                        .with_continuation(thread_id.clone()),
                )
                .await
                .unwrap();
        }

        let calls = provider.calls();
        assert_eq!(calls[0].message_count, 1);
        assert_eq!(calls[1].message_count, 3);
        assert_eq!(log.get_thread(&thread_id).len(), 4);
    }

    #[test]
    fn test_unknown_agent() {
        let set = agents(Arc::new(ScriptedProvider::new()));
        assert!(matches!(
            set.get("wizard"),
            Err(OrchestratorError::UnknownAgent(_))
        ));
        assert_eq!(
            set.get("consensus").unwrap().model_for(&AgentRequest::new()),
            "gemini-pro, gpt-5, claude-haiku"
        );
    }

    #[tokio::test]
    async fn test_consensus_uses_configured_thinking() {
        let provider = Arc::new(ScriptedProvider::new());
        let set = AgentSet::with_options(
            AgentRegistry::builtin(),
            ModelDispatcher::new(ProviderRegistry::scripted(provider.clone())),
            AgentSetOptions {
                consensus_models: Some(vec!["gemini-pro".to_string()]),
                consensus_thinking: Some(ThinkingMode::Low),
                ..Default::default()
            },
        );
        let agent = set.get("consensus").unwrap();

        agent
            .execute(&AgentRequest::new().with("prompt", "Pick a save format"))
            .await
            .unwrap();
        agent
            .execute(
                &AgentRequest::new()
                    .with("prompt", "Pick a save format")
                    .with_thinking(ThinkingMode::High),
            )
            .await
            .unwrap();

        let calls = provider.calls();
        assert_eq!(calls[0].thinking_mode, ThinkingMode::Low);
        assert_eq!(calls[1].thinking_mode, ThinkingMode::High);
    }
}
