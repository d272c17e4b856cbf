//! MCP Server implementation for studio orchestration
//!
//! This module defines the server and its tool router. Handler
//! implementations are in the handlers module.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError,
};
use studio_orchestrator::{
    AgentRegistry, AgentSet, AgentSetOptions, EngineConfig, InMemoryThreadLog, ModelDispatcher,
    ProviderRegistry, ScriptedProvider, StudioConfig,
};

use crate::handlers;
use crate::params::*;

/// Set to answer every model call locally instead of reaching a provider
pub const DRY_RUN_ENV: &str = "STUDIO_DRY_RUN";

/// The Studio MCP Server
#[derive(Clone)]
pub struct StudioMcpServer {
    config: StudioConfig,
    agents: AgentSet,
    engine_config: EngineConfig,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Tool Router - Each tool delegates to its handler
// ============================================================================

#[tool_router]
impl StudioMcpServer {
    /// Create a new server from `.studio.toml`, or defaults when none loads
    pub fn new() -> Self {
        let config = match StudioConfig::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {}", e);
                StudioConfig::default()
            }
        };

        let dry_run = std::env::var(DRY_RUN_ENV).is_ok_and(|v| !v.is_empty() && v != "0");
        let providers = if dry_run {
            tracing::info!("{} set: all model calls are answered locally", DRY_RUN_ENV);
            ProviderRegistry::scripted(Arc::new(ScriptedProvider::new().named("dry-run")))
        } else {
            ProviderRegistry::from_config(&config)
        };

        Self::with_providers(config, providers)
    }

    /// Create a server with explicit config and providers
    pub fn with_providers(config: StudioConfig, providers: ProviderRegistry) -> Self {
        let dispatcher =
            ModelDispatcher::new(providers).with_timeout(config.engine.provider_timeout());
        let agents = AgentSet::with_options(
            AgentRegistry::builtin(),
            dispatcher,
            AgentSetOptions {
                threads: Some(Arc::new(InMemoryThreadLog::new())),
                consensus_models: Some(config.consensus.models.clone()),
                consensus_thinking: Some(config.consensus.thinking_mode),
            },
        );

        Self {
            engine_config: EngineConfig::from_studio_config(&config),
            config,
            agents,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Run a named workflow (game_development, puzzle_generation, content_creation, optimization) or a custom list of agent tasks and return the report"
    )]
    async fn run_workflow(
        &self,
        Parameters(params): Parameters<RunWorkflowParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::run_workflow(&self.agents, &self.engine_config, params).await
    }

    #[tool(description = "Run a single specialized agent with a prompt and optional arguments")]
    async fn run_agent(
        &self,
        Parameters(params): Parameters<RunAgentParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::run_agent(&self.agents, params).await
    }

    #[tool(description = "Ask several models the same question and collect their analyses")]
    async fn run_consensus(
        &self,
        Parameters(params): Parameters<RunConsensusParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::run_consensus(&self.agents, &self.config.consensus, params).await
    }

    #[tool(
        description = "Run the specialist agents over project requirements, then merge their findings into one design"
    )]
    async fn run_collaboration(
        &self,
        Parameters(params): Parameters<RunCollaborationParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::run_collaboration(&self.agents, params).await
    }

    #[tool(
        description = "Run a writers room session where a lead specialist drafts material and two others respond to it"
    )]
    async fn run_writers_room(
        &self,
        Parameters(params): Parameters<RunWritersRoomParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::run_writers_room(&self.agents, &self.config.writers_room, params).await
    }

    #[tool(description = "List agent profiles with their preferred model and thinking depth")]
    async fn list_agents(&self) -> Result<CallToolResult, McpError> {
        handlers::list_agents(&self.agents)
    }

    #[tool(description = "Show which model an agent type gets under a model strategy")]
    async fn select_model(
        &self,
        Parameters(params): Parameters<SelectModelParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::select_model(params)
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for StudioMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Game studio agent orchestration. Run named or custom workflows, \
                 single specialist agents, multi-model consensus, two-phase \
                 specialist collaboration and writers room sessions. Failed steps \
                 are reported inline."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

impl Default for StudioMcpServer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::{ErrorCode, RawContent};
    use serde_json::json;
    use studio_orchestrator::TaskSpec;

    fn scripted_server(provider: ScriptedProvider) -> StudioMcpServer {
        StudioMcpServer::with_providers(
            StudioConfig::default(),
            ProviderRegistry::scripted(Arc::new(provider)),
        )
    }

    fn text_of(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| match &c.raw {
                RawContent::Text(t) => Some(t.text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_list_tools() {
        let server = scripted_server(ScriptedProvider::new());
        let tools = server.tool_router.list_all();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();

        assert_eq!(tools.len(), 7);
        for expected in [
            "run_workflow",
            "run_agent",
            "run_consensus",
            "run_collaboration",
            "run_writers_room",
            "list_agents",
            "select_model",
        ] {
            assert!(names.contains(&expected), "missing tool {}", expected);
        }
    }

    #[tokio::test]
    async fn test_run_workflow_renders_report() {
        let server = scripted_server(ScriptedProvider::new().reply_when("vending", "done"));
        let params = RunWorkflowParams {
            workflow_type: "custom".to_string(),
            tasks: vec![TaskSpec::default()
                .with_agent("implementation")
                .with_prompt("Cursed vending machine")],
            ..Default::default()
        };

        let result = handlers::run_workflow(&server.agents, &server.engine_config, params)
            .await
            .unwrap();
        let text = text_of(&result);
        assert!(text.starts_with("# Custom Workflow Report"));
        assert!(text.contains("## Step 1: Task 1\n\ndone"));
    }

    #[tokio::test]
    async fn test_run_workflow_unknown_type_is_invalid_params() {
        let server = scripted_server(ScriptedProvider::new());
        let params = RunWorkflowParams {
            workflow_type: "speedrun".to_string(),
            ..Default::default()
        };

        let err = handlers::run_workflow(&server.agents, &server.engine_config, params)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_run_agent_with_args() {
        let provider = ScriptedProvider::new().reply_when("Platform:** mobile", "layout");
        let server = scripted_server(provider);
        let params: RunAgentParams = serde_json::from_value(json!({
            "agent": "ux_ui",
            "args": {"game_genre": "puzzle", "platform": "mobile"}
        }))
        .unwrap();

        let result = handlers::run_agent(&server.agents, params).await.unwrap();
        assert_eq!(text_of(&result), "layout");
    }

    #[tokio::test]
    async fn test_run_agent_missing_field() {
        let server = scripted_server(ScriptedProvider::new());
        let params = RunAgentParams {
            agent: "ux_ui".to_string(),
            ..Default::default()
        };

        let err = tokio_test::assert_err!(handlers::run_agent(&server.agents, params).await);
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("game_genre"));
    }

    #[tokio::test]
    async fn test_run_consensus_uses_configured_models() {
        let server = scripted_server(ScriptedProvider::new());
        let params = RunConsensusParams {
            prompt: "Which save system?".to_string(),
            ..Default::default()
        };

        let result = handlers::run_consensus(&server.agents, &server.config.consensus, params)
            .await
            .unwrap();
        let text = text_of(&result);
        assert!(text.starts_with("## CONSENSUS ANALYSIS"));
        assert!(text.contains("### GEMINI-PRO Analysis:"));
        assert!(text.contains("### CLAUDE-HAIKU Analysis:"));
    }

    #[tokio::test]
    async fn test_run_collaboration_json() {
        let server = scripted_server(ScriptedProvider::new());
        let params: RunCollaborationParams = serde_json::from_value(json!({
            "requirements": {"core_mechanic": "echolocation"},
            "json": true
        }))
        .unwrap();

        let result = handlers::run_collaboration(&server.agents, params)
            .await
            .unwrap();
        let report: serde_json::Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(report["phase_one"].as_array().unwrap().len(), 2);
        assert_eq!(report["integration_success"], json!(true));
    }

    #[tokio::test]
    async fn test_run_writers_room() {
        let server = scripted_server(
            ScriptedProvider::new().reply_when("# Writers Room: Character Profile", "Dana, 19"),
        );
        let params: RunWritersRoomParams = serde_json::from_value(json!({
            "session": {"session_type": "character_development", "topic": "The night clerk"}
        }))
        .unwrap();

        let result =
            handlers::run_writers_room(&server.agents, &server.config.writers_room, params)
                .await
                .unwrap();
        let text = text_of(&result);
        assert!(text.starts_with("# Writers Room: Character Development"));
        assert!(text.contains("## Character Profile (character developer)\n\nDana, 19"));
    }

    #[tokio::test]
    async fn test_run_writers_room_unknown_session_type() {
        let server = scripted_server(ScriptedProvider::new());
        let params: RunWritersRoomParams = serde_json::from_value(json!({
            "session": {"session_type": "musical_number", "topic": "Anything"}
        }))
        .unwrap();

        let err = tokio_test::assert_err!(
            handlers::run_writers_room(&server.agents, &server.config.writers_room, params).await
        );
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(err.message, "Unknown session type: musical_number");
    }

    #[test]
    fn test_list_agents_and_select_model() {
        let server = scripted_server(ScriptedProvider::new());

        let agents: serde_json::Value =
            serde_json::from_str(&text_of(&handlers::list_agents(&server.agents).unwrap()))
                .unwrap();
        assert_eq!(agents.as_array().unwrap().len(), 15);
        assert_eq!(agents[0]["name"], json!("architecture"));

        let selection: serde_json::Value = serde_json::from_str(&text_of(
            &handlers::select_model(SelectModelParams {
                agent: "implementation".to_string(),
                strategy: Some("performance_optimized".to_string()),
            })
            .unwrap(),
        ))
        .unwrap();
        assert_eq!(selection["model"], json!("gemini-pro"));
        assert_eq!(selection["strategy"], json!("performance_optimized"));
    }
}
