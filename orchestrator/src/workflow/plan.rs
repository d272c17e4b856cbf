//! Step plans for the named workflows

use serde::Serialize;
use serde_json::Value;

use super::WorkflowType;
use crate::llm::ThinkingMode;
use crate::task::{TaskSpec, WorkflowContext};

/// How a step picks its model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModelRule {
    /// Selection table under the run's strategy, keyed by the step's agent
    Strategy,
    Fixed(&'static str),
}

/// When a step appears in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Inclusion {
    Always,
    /// Some task has the step's task type
    TaskPresent,
    ContextKey(&'static str),
}

/// Which tasks a step consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskNeed {
    /// The first task of the step's type; the step fails without one
    Required,
    /// The first task of the step's type, if any
    Optional,
    /// Every task of the step's type, in order, outputs joined by a blank line
    ///
    /// Inputs run one after another. The first failure becomes the step's
    /// error; outputs already produced are dropped and later inputs skipped.
    AllOfType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DefaultValue {
    Str(&'static str),
    Int(u64),
    EmptyObject,
    EmptyList,
}

impl DefaultValue {
    pub fn to_value(self) -> Value {
        match self {
            Self::Str(s) => Value::String(s.to_string()),
            Self::Int(n) => Value::from(n),
            Self::EmptyObject => Value::Object(Default::default()),
            Self::EmptyList => Value::Array(Vec::new()),
        }
    }
}

/// Agent argument read from the workflow context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContextArg {
    pub key: &'static str,
    pub default: DefaultValue,
}

const fn arg(key: &'static str, default: DefaultValue) -> ContextArg {
    ContextArg { key, default }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepPlan {
    pub title: &'static str,
    pub task_type: &'static str,
    pub agent: &'static str,
    pub thinking: ThinkingMode,
    pub model_rule: ModelRule,
    pub inclusion: Inclusion,
    pub task_need: TaskNeed,
    /// Written over the task's own fields
    pub context_args: &'static [ContextArg],
}

impl StepPlan {
    const fn new(
        title: &'static str,
        task_type: &'static str,
        agent: &'static str,
        thinking: ThinkingMode,
    ) -> Self {
        Self {
            title,
            task_type,
            agent,
            thinking,
            model_rule: ModelRule::Strategy,
            inclusion: Inclusion::Always,
            task_need: TaskNeed::Required,
            context_args: &[],
        }
    }

    const fn when(mut self, inclusion: Inclusion) -> Self {
        self.inclusion = inclusion;
        self
    }

    const fn needs(mut self, task_need: TaskNeed) -> Self {
        self.task_need = task_need;
        self
    }

    const fn model(mut self, model_rule: ModelRule) -> Self {
        self.model_rule = model_rule;
        self
    }

    const fn args(mut self, context_args: &'static [ContextArg]) -> Self {
        self.context_args = context_args;
        self
    }

    pub fn is_included(&self, tasks: &[TaskSpec], context: &WorkflowContext) -> bool {
        match self.inclusion {
            Inclusion::Always => true,
            Inclusion::TaskPresent => tasks.iter().any(|t| t.is_type(self.task_type)),
            Inclusion::ContextKey(key) => context.contains_key(key),
        }
    }
}

use DefaultValue::{EmptyObject, Int, Str};
use ThinkingMode::{High, Medium};

const GAME_DEVELOPMENT: &[StepPlan] = &[
    StepPlan::new("Architecture Planning", "architecture", "architecture", High)
        .when(Inclusion::TaskPresent),
    StepPlan::new("Implementation", "implementation", "implementation", Medium)
        .when(Inclusion::TaskPresent)
        .needs(TaskNeed::AllOfType),
    StepPlan::new("Content Creation", "content", "content", Medium).when(Inclusion::TaskPresent),
    StepPlan::new("Performance Optimization", "optimization", "optimization", Medium)
        .when(Inclusion::TaskPresent),
];

const PUZZLE_GENERATION: &[StepPlan] = &[
    StepPlan::new("Theme Analysis", "theme_analysis", "content", Medium)
        .model(ModelRule::Fixed("claude-haiku")),
    StepPlan::new("Puzzle Generation", "procedural_generation", "procedural_puzzle", High).args(&[
        arg("theme", Str("horror")),
        arg("difficulty", Str("medium")),
        arg("variations", Int(3)),
    ]),
    StepPlan::new("Difficulty Balancing", "difficulty_balancing", "dynamic_difficulty", Medium)
        .when(Inclusion::ContextKey("difficulty_adjustment"))
        .needs(TaskNeed::Optional)
        .args(&[
            arg("player_data", EmptyObject),
            arg("current_difficulty", Str("medium")),
            arg("metrics", EmptyObject),
        ]),
    StepPlan::new("Narrative Integration", "narrative_integration", "narrative", High)
        .when(Inclusion::ContextKey("narrative"))
        .args(&[
            arg("theme", Str("slasher")),
            arg("tone", Str("creepy")),
            arg("length", Str("medium")),
        ]),
];

const CONTENT_CREATION: &[StepPlan] = &[
    StepPlan::new("Story Development", "story_development", "narrative", High).args(&[
        arg("theme", Str("cosmic_horror")),
        arg("tone", Str("atmospheric")),
        arg("length", Str("long")),
    ]),
    StepPlan::new("Character Creation", "character_creation", "content", Medium)
        .when(Inclusion::ContextKey("characters")),
    StepPlan::new("Scene Writing", "scene_writing", "narrative", High).args(&[
        arg("theme", Str("slasher")),
        arg("tone", Str("tense")),
        arg("length", Str("medium")),
    ]),
    StepPlan::new("Asset Generation", "asset_generation", "asset_optimization", Medium)
        .when(Inclusion::ContextKey("assets"))
        .args(&[
            arg("target_size", Str("512KB")),
            arg("requirements", EmptyObject),
        ]),
];

const OPTIMIZATION: &[StepPlan] = &[
    StepPlan::new("Performance Analysis", "performance_analysis", "optimization", Medium),
    StepPlan::new(
        "Bottleneck Identification",
        "bottleneck_identification",
        "optimization",
        Medium,
    ),
    StepPlan::new(
        "Optimization Recommendations",
        "optimization_recommendations",
        "optimization",
        Medium,
    ),
    StepPlan::new("Implementation Strategy", "implementation_plan", "architecture", High),
];

/// Steps of a named workflow in execution order; empty for custom
pub fn plan_for(workflow: WorkflowType) -> &'static [StepPlan] {
    match workflow {
        WorkflowType::GameDevelopment => GAME_DEVELOPMENT,
        WorkflowType::PuzzleGeneration => PUZZLE_GENERATION,
        WorkflowType::ContentCreation => CONTENT_CREATION,
        WorkflowType::Optimization => OPTIMIZATION,
        WorkflowType::Custom => &[],
    }
}
