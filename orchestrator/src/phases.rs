//! Two-phase specialist collaboration
//!
//! Phase one runs the studio specialists concurrently over the project
//! requirements. Phase two hands their findings to the game expert for a
//! single integrated design.

use std::time::Instant;

use futures_util::future::join_all;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::agent::AgentSet;
use crate::error::OrchestratorError;
use crate::prompts::integration_brief;
use crate::task::AgentRequest;

/// Project description driving a collaboration session
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ProjectRequirements {
    /// Arguments for the story weaver, e.g. `story_prompt` and `tone`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story: Option<Map<String, Value>>,

    /// Story elements for puzzle integration; defaults to `story`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_elements: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_data: Option<Value>,

    /// Puzzle mechanics to integrate with the story
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puzzles: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aesthetic: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_mechanic: Option<String>,
}

/// One specialist's phase-one contribution
#[derive(Debug, Clone, Serialize)]
pub struct PhaseEntry {
    pub agent: String,
    /// Agent output, or `Error: {message}`
    pub text: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollaborationReport {
    pub phase_one: Vec<PhaseEntry>,
    pub integration: String,
    pub integration_success: bool,
    pub duration_ms: u64,
}

impl CollaborationReport {
    pub fn render(&self) -> String {
        let mut out = String::from("# Studio Collaboration Report\n\n");
        out.push_str("## Phase 1: Specialist Analysis\n\n");
        for entry in &self.phase_one {
            out.push_str(&format!("### {}\n\n{}\n\n---\n\n", entry.agent, entry.text));
        }
        out.push_str("## Phase 2: Integrated Design\n\n");
        out.push_str(&self.integration);
        out.push_str("\n\n");
        out
    }
}

pub struct PhaseCoordinator {
    agents: AgentSet,
}

impl PhaseCoordinator {
    pub fn new(agents: AgentSet) -> Self {
        Self { agents }
    }

    /// Which specialists run for these requirements, in launch order
    pub fn phase_one_plan(requirements: &ProjectRequirements) -> Vec<(&'static str, AgentRequest)> {
        let mut plan = Vec::new();

        if let Some(story) = &requirements.story {
            plan.push((
                "story_weaver",
                AgentRequest {
                    args: story.clone(),
                    ..Default::default()
                },
            ));
        }

        if let Some(player_data) = &requirements.player_data {
            plan.push((
                "psychology",
                AgentRequest::new().with("player_data", player_data.clone()),
            ));
        }

        if let (Some(puzzles), Some(story)) = (&requirements.puzzles, &requirements.story) {
            let elements = requirements
                .story_elements
                .clone()
                .unwrap_or_else(|| Value::Object(story.clone()));
            plan.push((
                "game_expert",
                AgentRequest::new()
                    .with("puzzle_mechanics", puzzles.clone())
                    .with("story_elements", elements),
            ));
        }

        if requirements.aesthetic.is_some() {
            plan.push(("pop_culture", AgentRequest::new().with("decade", "80s")));
        }

        plan.push((
            "ux_ui",
            AgentRequest::new()
                .with("game_genre", "puzzle")
                .with("platform", "web"),
        ));

        if let Some(mechanic) = &requirements.core_mechanic {
            plan.push((
                "creative_features",
                AgentRequest::new().with("core_mechanic", mechanic.as_str()),
            ));
        }

        plan
    }

    /// Run every applicable specialist concurrently; failures become entries
    pub async fn phase_one(&self, requirements: &ProjectRequirements) -> Vec<PhaseEntry> {
        let plan = Self::phase_one_plan(requirements);
        tracing::info!(agents = plan.len(), "Starting phase one");

        join_all(plan.iter().map(|(agent, request)| async move {
            let result = match self.agents.get(agent) {
                Ok(runner) => runner.execute(request).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(text) => PhaseEntry {
                    agent: agent.to_string(),
                    text,
                    success: true,
                },
                Err(e) => {
                    tracing::warn!(agent, error = %e, "Specialist failed");
                    PhaseEntry {
                        agent: agent.to_string(),
                        text: format!("Error: {}", e),
                        success: false,
                    }
                }
            }
        }))
        .await
    }

    /// Merge phase-one findings through the game expert
    pub async fn phase_two(&self, phase_one: &[PhaseEntry]) -> Result<String, OrchestratorError> {
        let findings: Vec<(String, String)> = phase_one
            .iter()
            .map(|e| (e.agent.clone(), e.text.clone()))
            .collect();
        let brief = integration_brief(&findings);

        tracing::info!(findings = findings.len(), "Starting phase two");
        self.agents
            .get("game_expert")?
            .execute(&AgentRequest::new().with("prompt", brief))
            .await
    }

    pub async fn run(&self, requirements: &ProjectRequirements) -> CollaborationReport {
        let start = Instant::now();
        let phase_one = self.phase_one(requirements).await;

        let (integration, integration_success) = match self.phase_two(&phase_one).await {
            Ok(text) => (text, true),
            Err(e) => {
                tracing::warn!(error = %e, "Integration phase failed");
                (format!("Error: {}", e), false)
            }
        };

        CollaborationReport {
            phase_one,
            integration,
            integration_success,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}
