//! Architecture, implementation, optimization and content prompts

use super::{files_line, fill};
use crate::error::OrchestratorError;
use crate::task::AgentRequest;

const ARCHITECTURE_PROMPT: &str = r#"
# System Architecture Review

## Task
{task}

## Files
{files}

You are the lead architect. Design a structure for the task above that stays
maintainable as the game grows and holds up under load.

## Expectations
- Name the components and their single responsibility
- Describe how data moves between them
- Call out security and failure boundaries
- Prefer established patterns and say which ones you use

## Output Format
1. Overview
2. Components
3. Data Flow
4. Technology Choices
5. Delivery Phases
"#;

const IMPLEMENTATION_PROMPT: &str = r#"
# Implementation Request

## Task
{task}

## Reference Files
{files}

Write the code that delivers the task above.

## Expectations
- Match the conventions already present in the referenced files
- Handle errors explicitly
- Comment only where intent is not obvious

## Output Format
- The code
- A short note on the approach
- Assumptions you made
- How to test it
"#;

const OPTIMIZATION_PROMPT: &str = r#"
# Performance Review

## Task
{task}

## Files
{files}

Find what makes this slow or heavy and say how to fix it.

## Expectations
- Locate concrete bottlenecks (CPU, memory, I/O, rendering)
- Give specific changes, not general advice
- Attach a measurable target to each change

## Output Format
1. Issues Found
2. Recommended Changes
3. Expected Gains
4. Priority Order
"#;

const CONTENT_PROMPT: &str = r#"
# Content Request

## Task
{task}

## Reference Material
{files}

Write the requested content for the game.

## Expectations
- Clear language with a consistent voice
- Logical structure with headings where useful
- Concrete examples over abstractions

## Output Format
- The content itself
- Notes on tone and where it fits in the game
"#;

fn task_prompt(
    template: &str,
    request: &AgentRequest,
    agent: &str,
) -> Result<String, OrchestratorError> {
    let task = request.require_str(agent, "prompt")?;
    let files = files_line(request);
    Ok(fill(template, &[("task", &task), ("files", &files)]))
}

pub(super) fn architecture(
    request: &AgentRequest,
    agent: &str,
) -> Result<String, OrchestratorError> {
    task_prompt(ARCHITECTURE_PROMPT, request, agent)
}

pub(super) fn implementation(
    request: &AgentRequest,
    agent: &str,
) -> Result<String, OrchestratorError> {
    task_prompt(IMPLEMENTATION_PROMPT, request, agent)
}

pub(super) fn optimization(
    request: &AgentRequest,
    agent: &str,
) -> Result<String, OrchestratorError> {
    task_prompt(OPTIMIZATION_PROMPT, request, agent)
}

pub(super) fn content(request: &AgentRequest, agent: &str) -> Result<String, OrchestratorError> {
    task_prompt(CONTENT_PROMPT, request, agent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_architecture_prompt() {
        let request = AgentRequest::new()
            .with("prompt", "Design the save system")
            .with("files", vec!["src/save.rs", "src/state.rs"]);
        let prompt = architecture(&request, "architecture").unwrap();

        assert!(prompt.starts_with("# System Architecture Review"));
        assert!(prompt.contains("Design the save system"));
        assert!(prompt.contains("src/save.rs, src/state.rs"));
    }

    #[test]
    fn test_files_default() {
        let request = AgentRequest::new().with("prompt", "Tune the fog shader");
        let prompt = optimization(&request, "optimization").unwrap();
        assert!(prompt.contains("None provided"));
    }
}
