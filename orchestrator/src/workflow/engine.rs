//! Workflow execution engine
//!
//! Executes workflows with:
//! - Declarative step plans for the named workflows
//! - Sequential or concurrent custom steps
//! - Per-step failure isolation

use std::time::Instant;

use futures_util::future::join_all;

use super::plan::{plan_for, ModelRule, StepPlan, TaskNeed};
use super::report::{StepResult, WorkflowReport};
use super::{WorkflowRequest, WorkflowType};
use crate::agent::AgentSet;
use crate::config::StudioConfig;
use crate::dispatch::{select_model, ModelStrategy};
use crate::error::OrchestratorError;
use crate::task::{AgentRequest, TaskSpec, WorkflowContext};

/// Configuration for the workflow engine
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Strategy used when a request names none
    pub default_strategy: ModelStrategy,

    /// Report "Completed Successfully" even when steps failed
    pub legacy_status: bool,
}

impl EngineConfig {
    pub fn from_studio_config(config: &StudioConfig) -> Self {
        Self {
            default_strategy: config.engine.strategy(),
            legacy_status: config.engine.legacy_status,
        }
    }
}

/// Workflow execution engine
pub struct WorkflowEngine {
    agents: AgentSet,
    config: EngineConfig,
}

impl WorkflowEngine {
    pub fn new(agents: AgentSet, config: EngineConfig) -> Self {
        Self { agents, config }
    }

    pub fn agents(&self) -> &AgentSet {
        &self.agents
    }

    /// Run a workflow and build its report
    ///
    /// Fails only for an unknown workflow type. Every step failure is
    /// captured in the report.
    pub async fn run(
        &self,
        request: &WorkflowRequest,
    ) -> Result<WorkflowReport, OrchestratorError> {
        let workflow: WorkflowType = request.workflow_type.parse()?;
        let strategy = request
            .model_strategy
            .as_deref()
            .map(ModelStrategy::from_name_lenient)
            .unwrap_or(self.config.default_strategy);

        tracing::info!(
            workflow = %workflow,
            tasks = request.tasks.len(),
            %strategy,
            parallel = request.parallel,
            "Starting workflow"
        );
        let start = Instant::now();

        let steps = match workflow {
            WorkflowType::Custom if request.parallel => {
                self.run_custom_parallel(&request.tasks, &request.context, strategy)
                    .await
            }
            WorkflowType::Custom => {
                self.run_custom_sequential(&request.tasks, &request.context, strategy)
                    .await
            }
            named => {
                if request.parallel {
                    tracing::debug!(
                        workflow = %named,
                        "Named workflows run sequentially; ignoring parallel flag"
                    );
                }
                self.run_plan(plan_for(named), &request.tasks, &request.context, strategy)
                    .await
            }
        };

        let report = WorkflowReport::new(workflow.display_name(), steps)
            .with_legacy_status(self.config.legacy_status);

        tracing::info!(
            workflow = %workflow,
            steps = report.steps.len(),
            failed = report.failed_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Workflow completed"
        );
        Ok(report)
    }

    async fn run_plan(
        &self,
        plan: &[StepPlan],
        tasks: &[TaskSpec],
        context: &WorkflowContext,
        strategy: ModelStrategy,
    ) -> Vec<StepResult> {
        let mut results = Vec::new();
        for step in plan.iter().filter(|s| s.is_included(tasks, context)) {
            let result = self.run_plan_step(step, tasks, context, strategy).await;
            log_step(&result);
            results.push(result);
        }
        results
    }

    async fn run_plan_step(
        &self,
        step: &StepPlan,
        tasks: &[TaskSpec],
        context: &WorkflowContext,
        strategy: ModelStrategy,
    ) -> StepResult {
        let start = Instant::now();
        let model = match step.model_rule {
            ModelRule::Strategy => select_model(step.agent, strategy),
            ModelRule::Fixed(model) => model.to_string(),
        };

        let matching: Vec<&TaskSpec> = tasks.iter().filter(|t| t.is_type(step.task_type)).collect();
        let fallback = TaskSpec::of_type(step.task_type);
        let inputs: Vec<&TaskSpec> = match step.task_need {
            TaskNeed::Required => matching.into_iter().take(1).collect(),
            TaskNeed::AllOfType => matching,
            TaskNeed::Optional => vec![matching.first().copied().unwrap_or(&fallback)],
        };

        let result = self.execute_plan_inputs(step, &inputs, context, &model).await;

        StepResult::new(
            step.title,
            step.agent,
            Some(model),
            result,
            start.elapsed().as_millis() as u64,
        )
    }

    async fn execute_plan_inputs(
        &self,
        step: &StepPlan,
        inputs: &[&TaskSpec],
        context: &WorkflowContext,
        model: &str,
    ) -> Result<String, OrchestratorError> {
        if inputs.is_empty() {
            return Err(OrchestratorError::MissingTask(step.task_type.to_string()));
        }
        let agent = self.agents.get(step.agent)?;

        // The first failing input fails the whole step; later inputs are not run.
        let mut outputs = Vec::with_capacity(inputs.len());
        for task in inputs {
            let mut request = AgentRequest::from_task(task);
            for arg in step.context_args {
                let value = context
                    .get(arg.key)
                    .cloned()
                    .unwrap_or_else(|| arg.default.to_value());
                request.args.insert(arg.key.to_string(), value);
            }
            request.model = Some(task.model.clone().unwrap_or_else(|| model.to_string()));
            request.thinking_mode = Some(task.thinking_mode.unwrap_or(step.thinking));

            outputs.push(agent.execute(&request).await?);
        }
        Ok(outputs.join("\n\n"))
    }

    async fn run_custom_sequential(
        &self,
        tasks: &[TaskSpec],
        context: &WorkflowContext,
        strategy: ModelStrategy,
    ) -> Vec<StepResult> {
        let mut results = Vec::with_capacity(tasks.len());
        for (index, task) in tasks.iter().enumerate() {
            let result = self.run_custom_step(index, task, context, strategy).await;
            log_step(&result);
            results.push(result);
        }
        results
    }

    /// All tasks at once; results stay in task order
    async fn run_custom_parallel(
        &self,
        tasks: &[TaskSpec],
        context: &WorkflowContext,
        strategy: ModelStrategy,
    ) -> Vec<StepResult> {
        let results = join_all(
            tasks
                .iter()
                .enumerate()
                .map(|(index, task)| self.run_custom_step(index, task, context, strategy)),
        )
        .await;
        results.iter().for_each(log_step);
        results
    }

    async fn run_custom_step(
        &self,
        index: usize,
        task: &TaskSpec,
        context: &WorkflowContext,
        strategy: ModelStrategy,
    ) -> StepResult {
        let start = Instant::now();
        let name = task
            .name
            .clone()
            .unwrap_or_else(|| format!("Task {}", index + 1));
        let agent_key = task
            .agent
            .clone()
            .or_else(|| task.task_type.clone())
            .unwrap_or_default();

        let (model, result) = match self.agents.get(&agent_key) {
            Ok(agent) => {
                let mut request = AgentRequest::from_task(task);
                for (key, value) in context.iter() {
                    request.args.entry(key.clone()).or_insert_with(|| value.clone());
                }
                if agent.profile().requires_model {
                    let model = task
                        .model
                        .clone()
                        .unwrap_or_else(|| select_model(&agent_key, strategy));
                    request.model = Some(model);
                }
                (Some(agent.model_for(&request)), agent.execute(&request).await)
            }
            Err(e) if agent_key.is_empty() => {
                tracing::debug!(step = %name, error = %e, "Task names no agent");
                (None, Err(OrchestratorError::missing_field(name.clone(), "agent")))
            }
            Err(e) => (None, Err(e)),
        };

        StepResult::new(
            name,
            agent_key,
            model,
            result,
            start.elapsed().as_millis() as u64,
        )
    }
}

fn log_step(result: &StepResult) {
    if result.is_success() {
        tracing::info!(
            step = %result.name,
            agent = %result.agent,
            duration_ms = result.duration_ms,
            "Step completed"
        );
    } else {
        tracing::warn!(
            step = %result.name,
            agent = %result.agent,
            "Step failed: {}",
            result.text()
        );
    }
}
