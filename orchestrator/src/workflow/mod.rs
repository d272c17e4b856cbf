//! Workflow definitions, execution and reporting
//!
//! Named workflows are fixed step plans over the caller's tasks. The custom
//! workflow runs one step per task, sequentially or concurrently.

mod engine;
mod plan;
mod report;

pub use engine::{EngineConfig, WorkflowEngine};
pub use plan::{plan_for, ContextArg, DefaultValue, Inclusion, ModelRule, StepPlan, TaskNeed};
pub use report::{StepOutcome, StepResult, WorkflowReport};

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;
use crate::task::{TaskSpec, WorkflowContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
    GameDevelopment,
    PuzzleGeneration,
    ContentCreation,
    Optimization,
    Custom,
}

impl WorkflowType {
    pub const ALL: [WorkflowType; 5] = [
        Self::GameDevelopment,
        Self::PuzzleGeneration,
        Self::ContentCreation,
        Self::Optimization,
        Self::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GameDevelopment => "game_development",
            Self::PuzzleGeneration => "puzzle_generation",
            Self::ContentCreation => "content_creation",
            Self::Optimization => "optimization",
            Self::Custom => "custom",
        }
    }

    /// Title used in report headings
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::GameDevelopment => "Game Development",
            Self::PuzzleGeneration => "Puzzle Generation",
            Self::ContentCreation => "Content Creation",
            Self::Optimization => "Optimization",
            Self::Custom => "Custom",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::GameDevelopment => {
                "Architecture, implementation, content and optimization for the task types supplied"
            }
            Self::PuzzleGeneration => {
                "Theme analysis and puzzle variations, with optional balancing and narrative"
            }
            Self::ContentCreation => "Story, scenes and optionally characters and assets",
            Self::Optimization => "Performance analysis through to an implementation strategy",
            Self::Custom => "One step per task, sequential or parallel",
        }
    }
}

impl fmt::Display for WorkflowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowType {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| OrchestratorError::UnknownWorkflowType(s.to_string()))
    }
}

/// Input to [`WorkflowEngine::run`]
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WorkflowRequest {
    /// game_development, puzzle_generation, content_creation, optimization or custom
    pub workflow_type: String,

    pub tasks: Vec<TaskSpec>,

    /// Values shared by every step of the run
    #[serde(default)]
    pub context: WorkflowContext,

    /// Run custom workflow tasks concurrently
    #[serde(default)]
    pub parallel: bool,

    /// auto, cost_optimized, performance_optimized or balanced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_strategy: Option<String>,
}

impl WorkflowRequest {
    pub fn new(workflow_type: impl Into<String>) -> Self {
        Self {
            workflow_type: workflow_type.into(),
            ..Default::default()
        }
    }

    pub fn with_task(mut self, task: TaskSpec) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn with_tasks(mut self, tasks: Vec<TaskSpec>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    pub fn with_context(mut self, context: WorkflowContext) -> Self {
        self.context = context;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.model_strategy = Some(strategy.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_workflow_type_parsing() {
        assert_eq!(
            "puzzle_generation".parse::<WorkflowType>().unwrap(),
            WorkflowType::PuzzleGeneration
        );
        let err = "speedrun".parse::<WorkflowType>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown workflow type: speedrun");
    }

    #[test]
    fn test_request_deserialize_defaults() {
        let request: WorkflowRequest = serde_json::from_value(json!({
            "workflow_type": "custom",
            "tasks": [{"agent": "content", "prompt": "Write a note"}]
        }))
        .unwrap();

        assert!(!request.parallel);
        assert!(request.model_strategy.is_none());
        assert_eq!(request.tasks[0].agent.as_deref(), Some("content"));
        assert!(!request.context.contains_key("theme"));
    }
}
