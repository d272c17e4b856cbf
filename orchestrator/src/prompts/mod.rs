//! Prompt templates for specialized agents
//!
//! Each agent type owns a template and a builder that validates the request
//! and fills the template. Placeholders are written `{name}`.

mod consensus;
mod engineering;
mod game;
mod studio;
pub mod writers;

pub use consensus::consensus_prompt;
pub use studio::integration_brief;

use crate::error::OrchestratorError;
use crate::task::AgentRequest;

/// Builds the prompt for one agent from its request
///
/// The second argument is the agent name, used in validation errors.
pub type PromptBuilder = fn(&AgentRequest, &str) -> Result<String, OrchestratorError>;

/// Look up the builder for an agent type
pub fn builder_for(agent_type: &str) -> Option<PromptBuilder> {
    let builder: PromptBuilder = match agent_type {
        "architecture" => engineering::architecture,
        "implementation" => engineering::implementation,
        "optimization" => engineering::optimization,
        "content" => engineering::content,
        "procedural_puzzle" => game::procedural_puzzle,
        "dynamic_difficulty" => game::dynamic_difficulty,
        "narrative" => game::narrative,
        "asset_optimization" => game::asset_optimization,
        "story_weaver" => studio::story_weaver,
        "psychology" => studio::psychology,
        "game_expert" => studio::game_expert,
        "pop_culture" => studio::pop_culture,
        "ux_ui" => studio::ux_ui,
        "creative_features" => studio::creative_features,
        _ => return None,
    };
    Some(builder)
}

/// Substitute `{key}` placeholders in a template
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.trim_start().to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{}}}", key), value)
        })
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

/// Comma-joined `files` argument, or "None provided"
fn files_line(request: &AgentRequest) -> String {
    join_or(&request.string_list("files"), "None provided")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_replaces_every_occurrence() {
        let out = fill("\n{a} and {a} then {b}", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "x and x then y");
    }

    #[test]
    fn test_builder_lookup() {
        assert!(builder_for("architecture").is_some());
        assert!(builder_for("creative_features").is_some());
        assert!(builder_for("consensus").is_none());
        assert!(builder_for("wizard").is_none());
    }

    #[test]
    fn test_every_builder_reports_missing_fields() {
        let empty = AgentRequest::new();
        for agent in [
            "architecture",
            "implementation",
            "optimization",
            "content",
            "procedural_puzzle",
            "dynamic_difficulty",
            "narrative",
            "asset_optimization",
            "story_weaver",
            "psychology",
            "game_expert",
            "pop_culture",
            "ux_ui",
            "creative_features",
        ] {
            let build = builder_for(agent).unwrap();
            let err = build(&empty, agent).unwrap_err();
            assert!(
                matches!(err, OrchestratorError::MissingField { .. }),
                "{} should reject an empty request",
                agent
            );
        }
    }
}
