//! Multi-model agent orchestration for game studio work
//!
//! This crate provides:
//! - Agent profiles with a preferred model and thinking depth per agent
//! - Prompt templates validated against each agent's required fields
//! - Model selection strategies (auto, cost, performance, balanced)
//! - Named and custom workflows with per-step failure isolation
//! - Multi-model consensus and two-phase specialist collaboration
//! - Writers room sessions for story, character and world development
//!
//! # Example
//!
//! ```rust,ignore
//! use studio_orchestrator::{
//!     AgentRegistry, AgentSet, EngineConfig, ModelDispatcher, ProviderRegistry,
//!     StudioConfig, TaskSpec, WorkflowEngine, WorkflowRequest,
//! };
//!
//! let config = StudioConfig::load()?;
//! let dispatcher = ModelDispatcher::new(ProviderRegistry::from_config(&config))
//!     .with_timeout(config.engine.provider_timeout());
//! let agents = AgentSet::new(AgentRegistry::builtin(), dispatcher);
//! let engine = WorkflowEngine::new(agents, EngineConfig::from_studio_config(&config));
//!
//! let request = WorkflowRequest::new("game_development")
//!     .with_task(TaskSpec::of_type("architecture").with_prompt("Inventory system"));
//! println!("{}", engine.run(&request).await?.render());
//! ```

pub mod agent;
pub mod config;
pub mod consensus;
pub mod dispatch;
pub mod error;
pub mod llm;
pub mod phases;
pub mod profile;
pub mod prompts;
pub mod task;
pub mod thread;
pub mod workflow;
pub mod writers_room;

pub use agent::{Agent, AgentSet, AgentSetOptions, ConsensusAgent, SpecializedAgent};
pub use config::StudioConfig;
pub use consensus::ConsensusCollector;
pub use dispatch::{select_model, ModelDispatcher, ModelStrategy};
pub use error::{ConfigError, OrchestratorError, ProfileError};
pub use llm::{
    Message, ModelProvider, ProviderError, ProviderRegistry, ScriptedProvider, ThinkingMode,
};
pub use phases::{CollaborationReport, PhaseCoordinator, ProjectRequirements};
pub use profile::{AgentProfile, AgentRegistry};
pub use task::{AgentRequest, TaskSpec, WorkflowContext};
pub use thread::{InMemoryThreadLog, ThreadLog};
pub use workflow::{
    EngineConfig, StepOutcome, StepResult, WorkflowEngine, WorkflowReport, WorkflowRequest,
    WorkflowType,
};
pub use writers_room::{SessionReport, SessionRequest, SessionType, WritersRoom};
