//! Shared framing prompt sent to every consensus participant

use super::{fill, join_or};

const CONSENSUS_PROMPT: &str = r#"
# Multi-Model Review

## Task
{task}

## Participants
{models}

## Files
{files}

Several models are answering this same request independently. Give your own
analysis; do not hedge toward what others might say.

## Expectations
- State a clear position
- Note the strongest argument against it
- End with concrete recommendations

## Output Format
1. Analysis
2. Risks
3. Recommendations
4. Action Items
"#;

pub fn consensus_prompt(task: &str, files: &[String], models: &[String]) -> String {
    let models = join_or(models, "None");
    let files = join_or(files, "None provided");
    fill(
        CONSENSUS_PROMPT,
        &[("task", task), ("models", &models), ("files", &files)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_every_participant() {
        let prompt = consensus_prompt(
            "Pick a save format",
            &[],
            &["gemini-pro".to_string(), "gpt-5".to_string()],
        );
        assert!(prompt.contains("gemini-pro, gpt-5"));
        assert!(prompt.contains("None provided"));
    }
}
