//! Step results and the rendered workflow report

use std::fmt::Write;

use chrono::{DateTime, Local};
use serde::Serialize;
use uuid::Uuid;

use crate::error::OrchestratorError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum StepOutcome {
    Success(String),
    Failure(String),
}

/// Result of executing one workflow step
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub name: String,

    /// Agent key the step dispatched to
    pub agent: String,

    /// Model id used, if the step got as far as selecting one
    pub model: Option<String>,

    pub outcome: StepOutcome,

    pub duration_ms: u64,
}

impl StepResult {
    pub fn new(
        name: impl Into<String>,
        agent: impl Into<String>,
        model: Option<String>,
        result: Result<String, OrchestratorError>,
        duration_ms: u64,
    ) -> Self {
        let outcome = match result {
            Ok(text) => StepOutcome::Success(text),
            Err(e) => StepOutcome::Failure(e.to_string()),
        };
        Self {
            name: name.into(),
            agent: agent.into(),
            model,
            outcome,
            duration_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, StepOutcome::Success(_))
    }

    /// Text shown for the step: raw output, or `Error: {message}`
    pub fn text(&self) -> String {
        match &self.outcome {
            StepOutcome::Success(text) => text.clone(),
            StepOutcome::Failure(message) => format!("Error: {}", message),
        }
    }
}

/// Outcome of a workflow run
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowReport {
    pub run_id: Uuid,

    /// Display name, e.g. "Puzzle Generation"
    pub workflow_name: String,

    pub steps: Vec<StepResult>,

    pub generated_at: DateTime<Local>,

    /// Report "Completed Successfully" regardless of failures
    pub legacy_status: bool,
}

impl WorkflowReport {
    pub fn new(workflow_name: impl Into<String>, steps: Vec<StepResult>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            workflow_name: workflow_name.into(),
            steps,
            generated_at: Local::now(),
            legacy_status: false,
        }
    }

    pub fn with_legacy_status(mut self, legacy_status: bool) -> Self {
        self.legacy_status = legacy_status;
        self
    }

    pub fn failed_count(&self) -> usize {
        self.steps.iter().filter(|s| !s.is_success()).count()
    }

    pub fn status(&self) -> String {
        let failed = self.failed_count();
        if self.legacy_status || failed == 0 {
            "Completed Successfully".to_string()
        } else {
            format!(
                "Completed with Errors ({} of {} steps failed)",
                failed,
                self.steps.len()
            )
        }
    }

    /// Markdown report; identical output for identical reports
    pub fn render(&self) -> String {
        let mut out = String::new();
        let total = self.steps.len();

        // Writing to a String cannot fail.
        let _ = write!(
            out,
            "# {} Workflow Report\n\n**Generated:** {}\n**Total Steps:** {}\n\n",
            self.workflow_name,
            self.generated_at.format("%Y-%m-%d %H:%M:%S"),
            total
        );

        for (i, step) in self.steps.iter().enumerate() {
            let _ = write!(out, "## Step {}: {}\n\n{}\n\n---\n\n", i + 1, step.name, step.text());
        }

        let _ = write!(
            out,
            "## Workflow Summary\n\n\
             - **Workflow Type:** {}\n\
             - **Steps Completed:** {}\n\
             - **Status:** {}\n\n",
            self.workflow_name,
            total,
            self.status()
        );

        out.push_str(
            "## Recommendations\n\n\
             1. Review each step's output for quality and completeness\n\
             2. Implement recommendations in order of priority\n\
             3. Test changes thoroughly before deployment\n\
             4. Monitor performance and user feedback\n\n",
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WorkflowReport {
        WorkflowReport::new(
            "Custom",
            vec![
                StepResult::new("Task 1", "content", None, Ok("ok".into()), 3),
                StepResult::new(
                    "Task 2",
                    "wizard",
                    None,
                    Err(OrchestratorError::UnknownAgent("wizard".into())),
                    0,
                ),
            ],
        )
    }

    #[test]
    fn test_render_layout() {
        let text = sample().render();

        assert!(text.starts_with("# Custom Workflow Report\n\n**Generated:** "));
        assert!(text.contains("**Total Steps:** 2\n\n"));
        assert!(text.contains("## Step 1: Task 1\n\nok\n\n---\n\n"));
        assert!(text.contains("## Step 2: Task 2\n\nError: Unknown agent: wizard\n\n---\n\n"));
        assert!(text.contains("- **Steps Completed:** 2\n"));
        assert!(text.ends_with("4. Monitor performance and user feedback\n\n"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let report = sample();
        assert_eq!(report.render(), report.render());
    }

    #[test]
    fn test_status_modes() {
        let report = sample();
        assert_eq!(report.status(), "Completed with Errors (1 of 2 steps failed)");
        assert_eq!(
            report.with_legacy_status(true).status(),
            "Completed Successfully"
        );

        let clean = WorkflowReport::new("Optimization", Vec::new());
        assert_eq!(clean.status(), "Completed Successfully");
    }
}
