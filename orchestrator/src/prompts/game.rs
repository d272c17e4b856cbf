//! Puzzle, difficulty, narrative and asset prompts

use super::fill;
use crate::error::OrchestratorError;
use crate::task::AgentRequest;

const PUZZLE_PROMPT: &str = r#"
# Procedural Puzzle Design

- **Theme:** {theme}
- **Difficulty:** {difficulty}
- **Variations:** {variations}

## Brief
{task}

Design {variations} variations of a puzzle for a horror game. They share the
theme but each must play differently.

## Expectations
- Every variation has a solution the player can reason their way to
- Difficulty stays at the requested level
- Variations hold up on a second playthrough

## Output Format
For each variation:
1. Description
2. Solution Path
3. Difficulty Notes
4. Replay Hooks
"#;

const DIFFICULTY_PROMPT: &str = r#"
# Difficulty Tuning

- **Current Difficulty:** {current}

## Player Data
{player_data}

## Metrics
{metrics}

Read the player data and decide how the game should adapt.

## Expectations
- Separate skill gaps from bad luck
- Keep the player challenged without tipping into frustration
- Each adjustment names the knob and the new value

## Output Format
1. Performance Read
2. Current Fit
3. Adjustments
4. Rollout
"#;

const NARRATIVE_PROMPT: &str = r#"
# Horror Narrative

- **Theme:** {theme}
- **Tone:** {tone}
- **Length:** {length}

## Brief
{task}

Write narrative content for a horror game with a VHS-era look and feel.

## Expectations
- Tension builds steadily and pays off
- Period details feel lived in, not decorative
- Leave hooks for branching paths

## Output Format
- Narrative Text
- Scene Notes
- Characters
- Where the Plot Goes Next
"#;

const ASSET_PROMPT: &str = r#"
# Asset Optimization

- **Assets:** {assets}
- **Target Size:** {target_size}

## Requirements
{requirements}

Shrink these assets to the target while keeping the VHS look intact.

## Expectations
- Keep grain, bleed and scanline character
- Hit the size target per asset
- Account for load order and streaming

## Output Format
1. Current State
2. Changes per Asset
3. Expected Sizes
4. Steps
"#;

pub(super) fn procedural_puzzle(
    request: &AgentRequest,
    agent: &str,
) -> Result<String, OrchestratorError> {
    let task = request.require_str(agent, "prompt")?;
    let theme = request.str_or("theme", "horror");
    let difficulty = request.str_or("difficulty", "medium");
    let variations = request.u64_or("variations", 3).to_string();

    Ok(fill(
        PUZZLE_PROMPT,
        &[
            ("theme", &theme),
            ("difficulty", &difficulty),
            ("variations", &variations),
            ("task", &task),
        ],
    ))
}

pub(super) fn dynamic_difficulty(
    request: &AgentRequest,
    agent: &str,
) -> Result<String, OrchestratorError> {
    let player_data = request.require_json(agent, "player_data")?;
    let current = request.str_or("current_difficulty", "medium");
    let metrics = request.json_or("metrics", "{}");

    Ok(fill(
        DIFFICULTY_PROMPT,
        &[
            ("current", &current),
            ("player_data", &player_data),
            ("metrics", &metrics),
        ],
    ))
}

pub(super) fn narrative(request: &AgentRequest, agent: &str) -> Result<String, OrchestratorError> {
    let task = request.require_str(agent, "prompt")?;
    let theme = request.str_or("theme", "slasher");
    let tone = request.str_or("tone", "creepy");
    let length = request.str_or("length", "medium");

    Ok(fill(
        NARRATIVE_PROMPT,
        &[
            ("theme", &theme),
            ("tone", &tone),
            ("length", &length),
            ("task", &task),
        ],
    ))
}

pub(super) fn asset_optimization(
    request: &AgentRequest,
    agent: &str,
) -> Result<String, OrchestratorError> {
    let assets = request.string_list("assets");
    if assets.is_empty() {
        return Err(OrchestratorError::missing_field(agent, "assets"));
    }
    let target_size = request.str_or("target_size", "512KB");
    let requirements = request.json_or("requirements", "{}");

    Ok(fill(
        ASSET_PROMPT,
        &[
            ("assets", &assets.join(", ")),
            ("target_size", &target_size),
            ("requirements", &requirements),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_puzzle_defaults() {
        let request = AgentRequest::new().with("prompt", "A mirror puzzle");
        let prompt = procedural_puzzle(&request, "procedural_puzzle").unwrap();

        assert!(prompt.contains("**Theme:** horror"));
        assert!(prompt.contains("**Difficulty:** medium"));
        assert!(prompt.contains("Design 3 variations"));
    }

    #[test]
    fn test_difficulty_renders_json() {
        let request = AgentRequest::new()
            .with("player_data", json!({"deaths": 12}))
            .with("current_difficulty", "hard");
        let prompt = dynamic_difficulty(&request, "dynamic_difficulty").unwrap();

        assert!(prompt.contains("\"deaths\": 12"));
        assert!(prompt.contains("**Current Difficulty:** hard"));
        assert!(prompt.contains("## Metrics\n{}"));
    }

    #[test]
    fn test_assets_required() {
        let request = AgentRequest::new().with("assets", json!([]));
        let err = asset_optimization(&request, "asset_optimization").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required field 'assets' for agent asset_optimization"
        );
    }
}
