//! Prompts for the studio collaboration agents

use serde_json::Value;

use super::{fill, join_or};
use crate::error::OrchestratorError;
use crate::task::AgentRequest;

const STORY_WEAVER_PROMPT: &str = r#"
# Story Weaving

- **Concept:** {concept}
- **Tone:** {tone}
- **Prose Level:** {craft}
- **Emotional Arc:** {arc}
- **Scenes:** {scenes}

Write this story as a sequence of {scenes} scenes. The prose matters as much
as the plot.

## Craft
- Vary sentence length to control rhythm
- Let sensory detail carry the atmosphere
- Pick words for their weight, cut the rest
- Dialogue must reveal character or move the plot

## Horror
- Suggest rather than show
- Make the familiar wrong
- Give the reader's imagination room to do the work

## Output Format
For each scene:
1. Title
2. Setting and Atmosphere
3. Story Beats
4. Emotional Payoff
5. What Lingers
"#;

const PSYCHOLOGY_PROMPT: &str = r#"
# Player Psychology

- **Game Type:** {game_type}
- **Difficulty Profile:** {difficulty_profile}
- **Retention Goals:** {retention_goals}

## Player Data
{player_data}

Explain what keeps these players coming back and what drives them away.

## Expectations
- Ground each claim in the data above
- Cover motivation, flow and frustration
- Keep recommendations ethical; no dark patterns

## Output Format
1. Player Profile
2. Engagement Drivers
3. Churn Risks
4. Recommendations per Retention Goal
"#;

const GAME_EXPERT_PROMPT: &str = r#"
# Puzzle and Story Integration

- **Puzzle Mechanics:** {mechanics}
- **Story Elements:** {story}
- **Integration Goals:** {goals}
- **Player Experience:** {experience}

Map each puzzle mechanic onto the story so that solving puzzles is how the
player learns what happened.

## For each mechanic
- Which story element it reveals
- How it echoes the theme
- What the player should feel on solving it
- Where it sits in the difficulty curve

## Output Format
1. Integration Matrix
2. Progression Map
3. Techniques
4. Player Journey
5. Build Order
"#;

const GAME_EXPERT_BRIEF_PROMPT: &str = r#"
# Puzzle and Story Integration

- **Integration Goals:** {goals}
- **Player Experience:** {experience}

{brief}
"#;

const POP_CULTURE_PROMPT: &str = r#"
# Period Reference Pass

- **Decade:** {decade}
- **Reference Types:** {callbacks}
- **Integration Level:** {level}
- **Audience:** {audience}

Suggest references from the {decade} that fit a horror puzzle game.

## Expectations
- References must be accurate to the period
- Integration stays {level}; the game works for players who miss them
- Avoid anything that needs a license to show directly

## Output Format
1. Reference List with Source
2. Where Each Appears in the Game
3. How It Is Presented
4. Risks
"#;

const UX_UI_PROMPT: &str = r#"
# Interface Design

- **Genre:** {genre}
- **Platform:** {platform}
- **Accessibility Needs:** {accessibility}
- **Aesthetic:** {aesthetic}

Design the interface for this game.

## Expectations
- Readable and usable before it is atmospheric
- The aesthetic never hides state the player needs
- Controls fit the platform's input model
- Every accessibility need above is met

## Output Format
1. Screen Inventory
2. Layout and Navigation
3. Visual Language
4. Accessibility
5. Feedback and Motion
"#;

const CREATIVE_FEATURES_PROMPT: &str = r#"
# Feature Ideation

- **Core Mechanic:** {mechanic}
- **Innovation Level:** {innovation}
- **Technical Constraints:** {constraints}
- **Player Expectations:** {expectations}

Propose features that grow out of the core mechanic.

## Expectations
- Each feature deepens the mechanic rather than sitting beside it
- Respect every technical constraint
- Mix safe bets with at least one risky idea

## Output Format
For each feature:
1. Name and Pitch
2. How It Plays
3. Why It Fits
4. Build Cost
"#;

/// Array arguments join with commas; other values render as text or JSON
fn list_text(request: &AgentRequest, key: &str, default: &str) -> String {
    match request.get(key) {
        Some(Value::Array(_)) => join_or(&request.string_list(key), default),
        Some(_) => request.json_or(key, default),
        None => default.to_string(),
    }
}

pub(super) fn story_weaver(
    request: &AgentRequest,
    agent: &str,
) -> Result<String, OrchestratorError> {
    let concept = if request.has("story_prompt") {
        request.require_str(agent, "story_prompt")?
    } else {
        request
            .require_str(agent, "prompt")
            .map_err(|_| OrchestratorError::missing_field(agent, "story_prompt"))?
    };
    let tone = request.str_or("tone", "atmospheric");
    let craft = request.str_or("word_craft_level", "elevated");
    let scenes = request.u64_or("scenes", 5).to_string();
    let arc = request.str_or("emotional_arc", "dread to terror to revelation");

    Ok(fill(
        STORY_WEAVER_PROMPT,
        &[
            ("concept", &concept),
            ("tone", &tone),
            ("craft", &craft),
            ("arc", &arc),
            ("scenes", &scenes),
        ],
    ))
}

pub(super) fn psychology(request: &AgentRequest, agent: &str) -> Result<String, OrchestratorError> {
    let player_data = request.require_json(agent, "player_data")?;
    let goals = list_text(
        request,
        "retention_goals",
        "session length, return rate, engagement depth",
    );
    let game_type = request.str_or("game_type", "hybrid");
    let difficulty_profile = request.str_or("difficulty_profile", "adaptive");

    Ok(fill(
        PSYCHOLOGY_PROMPT,
        &[
            ("game_type", &game_type),
            ("difficulty_profile", &difficulty_profile),
            ("retention_goals", &goals),
            ("player_data", &player_data),
        ],
    ))
}

/// Needs mechanics plus story elements, or a prepared brief in `prompt`
pub(super) fn game_expert(
    request: &AgentRequest,
    agent: &str,
) -> Result<String, OrchestratorError> {
    let goals = list_text(
        request,
        "integration_goals",
        "thematic resonance, progression, revelation",
    );
    let experience = request.str_or("player_experience", "mystery");

    if request.has("puzzle_mechanics") || !request.has("prompt") {
        if !request.has("puzzle_mechanics") {
            return Err(OrchestratorError::missing_field(agent, "puzzle_mechanics"));
        }
        if !request.has("story_elements") {
            return Err(OrchestratorError::missing_field(agent, "story_elements"));
        }
        let mechanics = list_text(request, "puzzle_mechanics", "");
        let story = list_text(request, "story_elements", "");

        return Ok(fill(
            GAME_EXPERT_PROMPT,
            &[
                ("mechanics", &mechanics),
                ("story", &story),
                ("goals", &goals),
                ("experience", &experience),
            ],
        ));
    }

    let brief = request.require_str(agent, "prompt")?;
    Ok(fill(
        GAME_EXPERT_BRIEF_PROMPT,
        &[("goals", &goals), ("experience", &experience), ("brief", &brief)],
    ))
}

pub(super) fn pop_culture(
    request: &AgentRequest,
    agent: &str,
) -> Result<String, OrchestratorError> {
    let decade = request.require_str(agent, "decade")?;
    let callbacks = list_text(request, "callback_type", "movies, music, games");
    let level = request.str_or("integration_level", "subtle");
    let audience = request.str_or("target_audience", "nostalgic adults");

    Ok(fill(
        POP_CULTURE_PROMPT,
        &[
            ("decade", &decade),
            ("callbacks", &callbacks),
            ("level", &level),
            ("audience", &audience),
        ],
    ))
}

pub(super) fn ux_ui(request: &AgentRequest, agent: &str) -> Result<String, OrchestratorError> {
    let genre = request.require_str(agent, "game_genre")?;
    let platform = request.require_str(agent, "platform")?;
    let accessibility = list_text(request, "accessibility_needs", "None specified");
    let aesthetic = request.str_or("aesthetic_requirements", "VHS horror aesthetic");

    Ok(fill(
        UX_UI_PROMPT,
        &[
            ("genre", &genre),
            ("platform", &platform),
            ("accessibility", &accessibility),
            ("aesthetic", &aesthetic),
        ],
    ))
}

pub(super) fn creative_features(
    request: &AgentRequest,
    agent: &str,
) -> Result<String, OrchestratorError> {
    let mechanic = request.require_str(agent, "core_mechanic")?;
    let innovation = request.str_or("innovation_level", "novel");
    let constraints = list_text(request, "technical_constraints", "None specified");
    let expectations = list_text(request, "player_expectations", "None specified");

    Ok(fill(
        CREATIVE_FEATURES_PROMPT,
        &[
            ("mechanic", &mechanic),
            ("innovation", &innovation),
            ("constraints", &constraints),
            ("expectations", &expectations),
        ],
    ))
}

/// Brief for the integration phase, built from per-agent results in order
pub fn integration_brief(results: &[(String, String)]) -> String {
    let mut brief = String::from("## Integrated Design Review\n\n### Specialist Findings\n\n");

    for (agent, text) in results {
        brief.push_str(&format!("#### {}\n{}\n\n", agent.to_uppercase(), text));
    }

    brief.push_str(
        "### Task\n\
         Merge the findings above into one design. Where specialists disagree, \
         pick a side and say why. Order the work by impact over effort.\n\n\
         ### Output Format\n\
         1. Design Vision\n\
         2. Build Order\n\
         3. Integration Points\n\
         4. Conflicts and Resolutions\n\
         5. Success Measures\n",
    );
    brief
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_story_weaver_prompt_fallback() {
        let request = AgentRequest::new().with("prompt", "A lighthouse keeper hears tapes");
        let prompt = story_weaver(&request, "story_weaver").unwrap();
        assert!(prompt.contains("A lighthouse keeper hears tapes"));
        assert!(prompt.contains("sequence of 5 scenes"));

        let err = story_weaver(&AgentRequest::new(), "story_weaver").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required field 'story_prompt' for agent story_weaver"
        );
    }

    #[test]
    fn test_game_expert_modes() {
        let request = AgentRequest::new()
            .with("puzzle_mechanics", json!(["cipher", "tape splicing"]))
            .with("story_elements", json!({"setting": "video store"}));
        let prompt = game_expert(&request, "game_expert").unwrap();
        assert!(prompt.contains("cipher, tape splicing"));
        assert!(prompt.contains("video store"));

        let request = AgentRequest::new().with("prompt", "Merge these findings");
        let prompt = game_expert(&request, "game_expert").unwrap();
        assert!(prompt.ends_with("Merge these findings\n"));

        let request = AgentRequest::new().with("puzzle_mechanics", json!(["cipher"]));
        let err = game_expert(&request, "game_expert").unwrap_err();
        assert!(err.to_string().contains("story_elements"));
    }

    #[test]
    fn test_ux_ui_requires_platform() {
        let request = AgentRequest::new().with("game_genre", "puzzle");
        let err = ux_ui(&request, "ux_ui").unwrap_err();
        assert!(err.to_string().contains("'platform'"));

        let prompt = ux_ui(&request.with("platform", "web"), "ux_ui").unwrap();
        assert!(prompt.contains("**Accessibility Needs:** None specified"));
    }

    #[test]
    fn test_integration_brief_order() {
        let brief = integration_brief(&[
            ("story_weaver".to_string(), "prose".to_string()),
            ("ux_ui".to_string(), "layout".to_string()),
        ]);
        let story = brief.find("#### STORY_WEAVER").unwrap();
        let ux = brief.find("#### UX_UI").unwrap();
        assert!(story < ux);
    }
}
