//! Tool handlers
//!
//! Each handler validates its parameters, runs the matching orchestrator
//! operation and renders the result as markdown or JSON.

use rmcp::{
    model::{CallToolResult, Content},
    ErrorData as McpError,
};
use serde::Serialize;
use studio_orchestrator::config::{ConsensusSection, WritersRoomSection};
use studio_orchestrator::{
    select_model as pick_model, AgentRequest, AgentSet, ConsensusCollector, EngineConfig,
    ModelStrategy, PhaseCoordinator, WorkflowEngine, WorkflowRequest, WritersRoom,
};

use crate::error::ResultExt;
use crate::params::*;

// ============================================================================
// Helper Functions
// ============================================================================

fn text_success(text: impl Into<String>) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(text.into())]))
}

fn json_success<T: Serialize>(data: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(data).to_mcp_err()?;
    text_success(json)
}

#[derive(Debug, Serialize)]
struct ModelSelection {
    agent: String,
    strategy: ModelStrategy,
    model: String,
}

// ============================================================================
// Handler Functions
// ============================================================================

pub async fn run_workflow(
    agents: &AgentSet,
    engine_config: &EngineConfig,
    params: RunWorkflowParams,
) -> Result<CallToolResult, McpError> {
    let request = WorkflowRequest {
        workflow_type: params.workflow_type,
        tasks: params.tasks,
        context: params.context,
        parallel: params.parallel,
        model_strategy: params.model_strategy,
    };

    let engine = WorkflowEngine::new(agents.clone(), engine_config.clone());
    let report = engine.run(&request).await.to_mcp_err()?;

    if params.json {
        json_success(&report)
    } else {
        text_success(report.render())
    }
}

pub async fn run_agent(
    agents: &AgentSet,
    params: RunAgentParams,
) -> Result<CallToolResult, McpError> {
    let agent = agents.get(&params.agent).to_mcp_err()?;

    let mut request = AgentRequest {
        args: params.args,
        model: params.model,
        thinking_mode: params.thinking_mode,
        continuation_id: params.continuation_id,
    };
    if let Some(prompt) = params.prompt {
        request = request.with("prompt", prompt);
    }

    let output = agent.execute(&request).await.to_mcp_err()?;
    text_success(output)
}

pub async fn run_consensus(
    agents: &AgentSet,
    defaults: &ConsensusSection,
    params: RunConsensusParams,
) -> Result<CallToolResult, McpError> {
    if params.prompt.trim().is_empty() {
        return Err(McpError::invalid_params("prompt must not be empty", None));
    }

    let models = match params.models {
        Some(models) if !models.is_empty() => models,
        _ => defaults.models.clone(),
    };
    let thinking = params.thinking_mode.unwrap_or(defaults.thinking_mode);

    let output = ConsensusCollector::new(agents.dispatcher().clone())
        .run(&params.prompt, &params.files, &models, thinking)
        .await;
    text_success(output)
}

pub async fn run_collaboration(
    agents: &AgentSet,
    params: RunCollaborationParams,
) -> Result<CallToolResult, McpError> {
    let report = PhaseCoordinator::new(agents.clone())
        .run(&params.requirements)
        .await;

    if params.json {
        json_success(&report)
    } else {
        text_success(report.render())
    }
}

pub async fn run_writers_room(
    agents: &AgentSet,
    defaults: &WritersRoomSection,
    params: RunWritersRoomParams,
) -> Result<CallToolResult, McpError> {
    let model = params.model.unwrap_or_else(|| defaults.model.clone());
    let report = WritersRoom::new(agents.dispatcher().clone())
        .with_model(model)
        .run(&params.session)
        .await
        .to_mcp_err()?;

    if params.json {
        json_success(&report)
    } else {
        text_success(report.render())
    }
}

pub fn list_agents(agents: &AgentSet) -> Result<CallToolResult, McpError> {
    let profiles: Vec<_> = agents.registry().iter().collect();
    json_success(&profiles)
}

pub fn select_model(params: SelectModelParams) -> Result<CallToolResult, McpError> {
    let strategy = params
        .strategy
        .as_deref()
        .map(ModelStrategy::from_name_lenient)
        .unwrap_or_default();

    json_success(&ModelSelection {
        model: pick_model(&params.agent, strategy),
        agent: params.agent,
        strategy,
    })
}
