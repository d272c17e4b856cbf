//! Error types for agent dispatch and workflow execution

use crate::llm::ProviderError;

/// Errors raised by the orchestration core
///
/// Only [`OrchestratorError::UnknownWorkflowType`] aborts a workflow run. Every
/// other variant is caught at the step boundary and rendered inline in the
/// report as `Error: <message>`.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("Unknown workflow type: {0}")]
    UnknownWorkflowType(String),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Missing required field '{field}' for agent {agent}")]
    MissingField { agent: String, field: String },

    #[error("No task of type '{0}' was provided")]
    MissingTask(String),

    #[error("Unknown session type: {0}")]
    UnknownSessionType(String),

    #[error("Agent {agent} failed to execute with model {model}: {source}")]
    AgentExecutionFailed {
        agent: String,
        model: String,
        #[source]
        source: ProviderError,
    },
}

impl OrchestratorError {
    /// Shorthand for a missing argument on a given agent
    pub fn missing_field(agent: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            agent: agent.into(),
            field: field.into(),
        }
    }

    /// Whether the error was caused by the caller's input rather than a model call
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, Self::AgentExecutionFailed { .. })
    }
}

/// Errors raised while building the agent profile registry
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Agent profile '{0}' is already registered")]
    Duplicate(String),

    #[error("Agent profile '{0}' requires a model but has no preferred model")]
    MissingModel(String),
}

/// Errors raised while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_report_format() {
        let err = OrchestratorError::missing_field("narrative", "prompt");
        assert_eq!(
            err.to_string(),
            "Missing required field 'prompt' for agent narrative"
        );

        let err = OrchestratorError::AgentExecutionFailed {
            agent: "architecture".to_string(),
            model: "gemini-pro".to_string(),
            source: ProviderError::new("gemini-pro", "rate limited"),
        };
        assert_eq!(
            err.to_string(),
            "Agent architecture failed to execute with model gemini-pro: rate limited"
        );
        assert!(!err.is_caller_error());
        assert!(OrchestratorError::UnknownAgent("x".into()).is_caller_error());
    }
}
