//! Parameter types for Studio MCP tools

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use studio_orchestrator::{
    ProjectRequirements, SessionRequest, TaskSpec, ThinkingMode, WorkflowContext,
};

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct RunWorkflowParams {
    #[schemars(
        description = "Workflow type: game_development, puzzle_generation, content_creation, optimization or custom"
    )]
    pub workflow_type: String,

    #[schemars(description = "Tasks for the workflow. Named workflows match them by 'type'")]
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,

    #[schemars(description = "Shared key/value context visible to every step")]
    #[serde(default)]
    pub context: WorkflowContext,

    #[schemars(description = "Run custom workflow tasks concurrently (default: false)")]
    #[serde(default)]
    pub parallel: bool,

    #[schemars(
        description = "Model strategy: auto, cost_optimized, performance_optimized or balanced"
    )]
    #[serde(default)]
    pub model_strategy: Option<String>,

    #[schemars(description = "Return the report as JSON instead of markdown (default: false)")]
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct RunAgentParams {
    #[schemars(description = "Agent name, e.g. architecture, narrative, story_weaver")]
    pub agent: String,

    #[schemars(description = "Task description passed as the 'prompt' argument")]
    #[serde(default)]
    pub prompt: Option<String>,

    #[schemars(description = "Additional agent arguments such as theme, player_data or assets")]
    #[serde(default)]
    pub args: Map<String, Value>,

    #[schemars(description = "Model override (defaults to the agent's preferred model)")]
    #[serde(default)]
    pub model: Option<String>,

    #[schemars(description = "Thinking depth override: low, medium or high")]
    #[serde(default)]
    pub thinking_mode: Option<ThinkingMode>,

    #[schemars(description = "Conversation thread to continue")]
    #[serde(default)]
    pub continuation_id: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct RunConsensusParams {
    #[schemars(description = "Question or task every model should analyse")]
    pub prompt: String,

    #[schemars(description = "Models to consult (defaults to the configured consensus models)")]
    #[serde(default)]
    pub models: Option<Vec<String>>,

    #[schemars(description = "Files listed as reference material")]
    #[serde(default)]
    pub files: Vec<String>,

    #[schemars(description = "Thinking depth: low, medium or high")]
    #[serde(default)]
    pub thinking_mode: Option<ThinkingMode>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct RunCollaborationParams {
    #[schemars(
        description = "Project requirements: story, puzzles, player_data, aesthetic, core_mechanic"
    )]
    pub requirements: ProjectRequirements,

    #[schemars(description = "Return the report as JSON instead of markdown (default: false)")]
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct SelectModelParams {
    #[schemars(description = "Agent type to select a model for")]
    pub agent: String,

    #[schemars(
        description = "Model strategy: auto, cost_optimized, performance_optimized or balanced (default: auto)"
    )]
    #[serde(default)]
    pub strategy: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct RunWritersRoomParams {
    #[schemars(
        description = "Session: session_type (character_development, plot_development, dialogue_writing, world_building, story_outlining, genre_consultation), topic, genre, tone, style, duration, requirements"
    )]
    pub session: SessionRequest,

    #[schemars(description = "Model override (defaults to the configured writers room model)")]
    #[serde(default)]
    pub model: Option<String>,

    #[schemars(description = "Return the report as JSON instead of markdown (default: false)")]
    #[serde(default)]
    pub json: bool,
}
