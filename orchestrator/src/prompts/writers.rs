//! Writers room session prompts

use super::fill;

const LEAD_PROMPT: &str = r#"
# Writers Room: {title}

You are the {specialist} in a {style} writers room session.

- **Topic:** {topic}
- **Genre:** {genre}
- **Tone:** {tone}
- **Session Length:** {duration}

## Requirements
{requirements}

## Focus
{focus}

Open the session with concrete material the rest of the room can build on.
Keep it specific to the topic and true to the genre and tone.
"#;

const FOLLOW_UP_PROMPT: &str = r#"
# Writers Room: {title}

You are the {specialist} in a {style} writers room session.

- **Topic:** {topic}
- **Genre:** {genre}
- **Tone:** {tone}

## {lead_title} (from the {lead_specialist})
{lead_output}

## Focus
{focus}

Respond to the material above. Point out what works, what is missing and
what you would change, then give your own contribution.
"#;

/// Session fields shared by every prompt in one writers room run
pub struct SessionBrief<'a> {
    pub topic: &'a str,
    pub genre: &'a str,
    pub tone: &'a str,
    pub style: &'a str,
    pub duration: &'a str,
    pub requirements: &'a [String],
}

fn requirements_block(requirements: &[String]) -> String {
    if requirements.is_empty() {
        "None specified".to_string()
    } else {
        requirements
            .iter()
            .map(|r| format!("- {}", r))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Prompt for the specialist who opens a session
pub fn session_lead(
    brief: &SessionBrief<'_>,
    title: &str,
    specialist: &str,
    focus: &str,
) -> String {
    fill(
        LEAD_PROMPT,
        &[
            ("title", title),
            ("specialist", specialist),
            ("style", brief.style),
            ("topic", brief.topic),
            ("genre", brief.genre),
            ("tone", brief.tone),
            ("duration", brief.duration),
            ("requirements", &requirements_block(brief.requirements)),
            ("focus", focus),
        ],
    )
}

/// Prompt for a specialist reacting to the lead's output
pub fn session_follow_up(
    brief: &SessionBrief<'_>,
    title: &str,
    specialist: &str,
    focus: &str,
    lead: (&str, &str, &str),
) -> String {
    let (lead_title, lead_specialist, lead_output) = lead;
    fill(
        FOLLOW_UP_PROMPT,
        &[
            ("title", title),
            ("specialist", specialist),
            ("style", brief.style),
            ("topic", brief.topic),
            ("genre", brief.genre),
            ("tone", brief.tone),
            ("lead_title", lead_title),
            ("lead_specialist", lead_specialist),
            ("focus", focus),
            // Last, so placeholders inside model output stay untouched.
            ("lead_output", lead_output),
        ],
    )
}
