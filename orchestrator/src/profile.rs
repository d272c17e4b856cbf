//! Agent profiles and registry
//!
//! A profile pairs an agent name with its preferred model and thinking depth.
//! Profiles are immutable once registered.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{OrchestratorError, ProfileError};
use crate::llm::ThinkingMode;

/// Static description of a specialized agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentProfile {
    /// Unique identifier for this agent
    pub name: String,

    pub description: String,

    /// Model id used when the request carries no override
    pub preferred_model: String,

    /// Thinking depth used when the request carries no override
    pub thinking_mode: ThinkingMode,

    /// False for agents that fan out to several models themselves
    pub requires_model: bool,
}

impl AgentProfile {
    pub fn new(
        name: impl Into<String>,
        preferred_model: impl Into<String>,
        thinking_mode: ThinkingMode,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            preferred_model: preferred_model.into(),
            thinking_mode,
            requires_model: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the profile as not bound to a single model
    pub fn without_model(mut self) -> Self {
        self.requires_model = false;
        self
    }
}

/// Registry of agent profiles, in registration order
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    profiles: Vec<AgentProfile>,
    index: HashMap<String, usize>,
}

impl AgentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in agent
    pub fn builtin() -> Self {
        use ThinkingMode::{High, Medium};

        let profiles = [
            AgentProfile::new("architecture", "gemini-pro", High)
                .with_description("System architecture and design patterns"),
            AgentProfile::new("implementation", "gemini-flash", Medium)
                .with_description("Production-ready code implementation"),
            AgentProfile::new("optimization", "ollama", Medium)
                .with_description("Performance analysis and tuning"),
            AgentProfile::new("content", "claude-haiku", Medium)
                .with_description("Game content, dialogue and descriptions"),
            AgentProfile::new("consensus", "consensus", High)
                .with_description("Multi-model analysis of one prompt")
                .without_model(),
            AgentProfile::new("procedural_puzzle", "gemini-pro", High)
                .with_description("Procedurally varied puzzle design"),
            AgentProfile::new("dynamic_difficulty", "gemini-pro", Medium)
                .with_description("Difficulty tuning from player performance"),
            AgentProfile::new("narrative", "claude-haiku", High)
                .with_description("Horror narrative writing"),
            AgentProfile::new("asset_optimization", "ollama", Medium)
                .with_description("Asset size and loading optimization"),
            AgentProfile::new("story_weaver", "ollama", High)
                .with_description("Literary prose and story structure"),
            AgentProfile::new("psychology", "ollama", Medium)
                .with_description("Player psychology and retention"),
            AgentProfile::new("game_expert", "gemini-pro", High)
                .with_description("Puzzle and story integration"),
            AgentProfile::new("pop_culture", "ollama", Medium)
                .with_description("Era-appropriate cultural references"),
            AgentProfile::new("ux_ui", "ollama", Medium)
                .with_description("Interface and interaction design"),
            AgentProfile::new("creative_features", "gemini-pro", High)
                .with_description("Novel gameplay feature ideation"),
        ];

        let mut registry = Self::new();
        for profile in profiles {
            if let Err(e) = registry.register(profile) {
                tracing::error!("Built-in profile rejected: {}", e);
            }
        }
        registry
    }

    /// Register a profile
    pub fn register(&mut self, profile: AgentProfile) -> Result<(), ProfileError> {
        if self.index.contains_key(&profile.name) {
            return Err(ProfileError::Duplicate(profile.name));
        }
        if profile.requires_model && profile.preferred_model.trim().is_empty() {
            return Err(ProfileError::MissingModel(profile.name));
        }

        self.index.insert(profile.name.clone(), self.profiles.len());
        self.profiles.push(profile);
        Ok(())
    }

    /// Look up a profile by name
    pub fn get(&self, name: &str) -> Result<&AgentProfile, OrchestratorError> {
        self.index
            .get(name)
            .map(|&i| &self.profiles[i])
            .ok_or_else(|| OrchestratorError::UnknownAgent(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles() {
        let registry = AgentRegistry::builtin();
        assert_eq!(registry.len(), 15);

        let architecture = registry.get("architecture").unwrap();
        assert_eq!(architecture.preferred_model, "gemini-pro");
        assert_eq!(architecture.thinking_mode, ThinkingMode::High);

        let narrative = registry.get("narrative").unwrap();
        assert_eq!(narrative.preferred_model, "claude-haiku");
        assert_eq!(narrative.thinking_mode, ThinkingMode::High);

        assert!(!registry.get("consensus").unwrap().requires_model);
        assert_eq!(registry.names().next(), Some("architecture"));
    }

    #[test]
    fn test_unknown_agent() {
        let registry = AgentRegistry::builtin();
        let err = registry.get("wizard").unwrap_err();
        assert_eq!(err.to_string(), "Unknown agent: wizard");
    }

    #[test]
    fn test_register_rejects_invalid() {
        let mut registry = AgentRegistry::new();
        registry
            .register(AgentProfile::new("lore", "gemini-pro", ThinkingMode::Low))
            .unwrap();

        assert!(matches!(
            registry.register(AgentProfile::new("lore", "gpt-5", ThinkingMode::Low)),
            Err(ProfileError::Duplicate(_))
        ));
        assert!(matches!(
            registry.register(AgentProfile::new("empty", "", ThinkingMode::Low)),
            Err(ProfileError::MissingModel(_))
        ));
        registry
            .register(AgentProfile::new("fanout", "", ThinkingMode::High).without_model())
            .unwrap();
        assert_eq!(registry.len(), 2);
    }
}
