//! Studio CLI
//!
//! Runs workflows, single agents, consensus and collaboration sessions.
//!
//! Usage:
//!   studio workflow run game_development --tasks tasks.json
//!   studio workflow list
//!   studio workflow show puzzle_generation
//!   studio agents list
//!   studio agent run narrative --prompt "A tape that records you"
//!   studio models select architecture --strategy cost_optimized
//!   studio consensus --prompt "Which save format?" --model gemini-pro --model gpt-5
//!   studio collaborate --requirements project.json
//!   studio writers-room world_building --topic "A mall after closing"

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studio_orchestrator::llm::list_models;
use studio_orchestrator::workflow::{plan_for, Inclusion, ModelRule, TaskNeed};
use studio_orchestrator::{
    select_model, AgentRegistry, AgentRequest, AgentSet, AgentSetOptions, ConsensusCollector,
    EngineConfig, InMemoryThreadLog, ModelDispatcher, ModelStrategy, PhaseCoordinator,
    ProjectRequirements, ProviderRegistry, ScriptedProvider, SessionRequest, StudioConfig,
    TaskSpec, ThinkingMode, WorkflowContext, WorkflowEngine, WorkflowRequest, WorkflowType,
    WritersRoom,
};

#[derive(Parser)]
#[command(name = "studio")]
#[command(about = "Multi-model agent orchestration for game studio tasks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a .studio.toml (default: search from cwd, then ~/.config/studio)
    #[arg(long, env = "STUDIO_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Answer every model call locally without contacting providers
    #[arg(long, global = true)]
    dry_run: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Workflow execution and inspection
    Workflow {
        #[command(subcommand)]
        command: WorkflowCommands,
    },
    /// Agent profiles
    Agents {
        #[command(subcommand)]
        command: AgentCommands,
    },
    /// Run a single agent
    Agent {
        #[command(subcommand)]
        command: AgentRunCommands,
    },
    /// Model selection and availability
    Models {
        #[command(subcommand)]
        command: ModelCommands,
    },
    /// Ask several models the same question
    Consensus {
        #[arg(long, short)]
        prompt: String,

        /// Participating model (repeatable; default from config)
        #[arg(long = "model", short = 'm')]
        models: Vec<String>,

        /// File to mention in the prompt (repeatable)
        #[arg(long = "file")]
        files: Vec<String>,

        #[arg(long)]
        thinking: Option<ThinkingMode>,
    },
    /// Run a two-phase specialist collaboration session
    Collaborate {
        /// JSON file with project requirements
        #[arg(long, short)]
        requirements: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a writers room session
    WritersRoom {
        /// character_development, plot_development, dialogue_writing, world_building,
        /// story_outlining or genre_consultation
        #[arg(default_value = "character_development")]
        session_type: String,

        #[arg(long, short)]
        topic: String,

        #[arg(long, default_value = "horror")]
        genre: String,

        #[arg(long, default_value = "dark")]
        tone: String,

        /// Collaboration style, e.g. roundtable or brainstorm
        #[arg(long, default_value = "roundtable")]
        style: String,

        #[arg(long, default_value = "medium")]
        duration: String,

        /// Specific requirement (repeatable)
        #[arg(long = "require", short = 'r')]
        requirements: Vec<String>,

        /// Model override (default from config)
        #[arg(long, short)]
        model: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WorkflowCommands {
    /// Run a workflow
    Run {
        /// game_development, puzzle_generation, content_creation, optimization or custom
        workflow: String,

        /// JSON file holding the task list
        #[arg(long, short)]
        tasks: PathBuf,

        /// JSON file holding the shared context object
        #[arg(long, short)]
        context: Option<PathBuf>,

        /// Run custom workflow tasks concurrently
        #[arg(long)]
        parallel: bool,

        /// auto, cost_optimized, performance_optimized or balanced
        #[arg(long, short)]
        strategy: Option<String>,

        /// Write the report here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List available workflows
    List,
    /// Show the steps of a workflow
    Show {
        workflow: String,
    },
}

#[derive(Subcommand)]
enum AgentCommands {
    /// List agent profiles
    List,
    /// Show one agent profile
    Show {
        agent: String,
    },
}

#[derive(Subcommand)]
enum AgentRunCommands {
    /// Execute an agent once
    Run {
        agent: String,

        #[arg(long, short)]
        prompt: Option<String>,

        /// Extra argument as key=value; values parse as JSON when possible
        #[arg(long = "arg", short = 'a', value_parser = parse_key_value)]
        args: Vec<(String, Value)>,

        /// Model override
        #[arg(long, short)]
        model: Option<String>,

        #[arg(long)]
        thinking: Option<ThinkingMode>,
    },
}

#[derive(Subcommand)]
enum ModelCommands {
    /// Show the model chosen for an agent type
    Select {
        agent: String,

        #[arg(long, short, default_value = "auto")]
        strategy: String,
    },
    /// List logical models and local Ollama models
    List,
}

fn parse_key_value(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.trim().to_string(), value))
}

/// Initialize tracing with the given verbosity level
///
/// - 0: warn (default)
/// - 1: info (-v)
/// - 2: debug (-vv)
/// - 3+: trace (-vvv)
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    // Allow RUST_LOG to override if set
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Everything a command needs to reach the models
struct Studio {
    config: StudioConfig,
    agents: AgentSet,
}

impl Studio {
    fn build(config: StudioConfig, dry_run: bool) -> Self {
        let providers = if dry_run {
            tracing::info!("Dry run: all model calls are answered locally");
            ProviderRegistry::scripted(Arc::new(ScriptedProvider::new().named("dry-run")))
        } else {
            ProviderRegistry::from_config(&config)
        };
        let dispatcher =
            ModelDispatcher::new(providers).with_timeout(config.engine.provider_timeout());
        let agents = AgentSet::with_options(
            AgentRegistry::builtin(),
            dispatcher,
            AgentSetOptions {
                threads: Some(Arc::new(InMemoryThreadLog::new())),
                consensus_models: Some(config.consensus.models.clone()),
                consensus_thinking: Some(config.consensus.thinking_mode),
            },
        );
        Self { config, agents }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI first to get verbosity before initializing tracing
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => StudioConfig::load_from_path(path)?,
        None => StudioConfig::load()?,
    };

    match cli.command {
        Commands::Workflow { command } => run_workflow_command(command, config, cli.dry_run).await,
        Commands::Agents { command } => run_agents_command(command),
        Commands::Agent { command } => run_agent_command(command, config, cli.dry_run).await,
        Commands::Models { command } => run_models_command(command, config, cli.dry_run).await,
        Commands::Consensus {
            prompt,
            models,
            files,
            thinking,
        } => {
            let studio = Studio::build(config, cli.dry_run);
            let models = if models.is_empty() {
                studio.config.consensus.models.clone()
            } else {
                models
            };
            let collector = ConsensusCollector::new(studio.agents.dispatcher().clone());
            let output = collector
                .run(
                    &prompt,
                    &files,
                    &models,
                    thinking.unwrap_or(studio.config.consensus.thinking_mode),
                )
                .await;
            println!("{}", output);
            Ok(())
        }
        Commands::Collaborate { requirements, json } => {
            let requirements: ProjectRequirements = read_json(&requirements)?;
            let studio = Studio::build(config, cli.dry_run);
            let report = PhaseCoordinator::new(studio.agents).run(&requirements).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.render());
            }
            Ok(())
        }
        Commands::WritersRoom {
            session_type,
            topic,
            genre,
            tone,
            style,
            duration,
            requirements,
            model,
            json,
        } => {
            let request = SessionRequest {
                session_type,
                topic,
                genre,
                tone,
                style,
                duration,
                requirements,
            };
            let studio = Studio::build(config, cli.dry_run);
            let model = model.unwrap_or_else(|| studio.config.writers_room.model.clone());
            let report = WritersRoom::new(studio.agents.dispatcher().clone())
                .with_model(model)
                .run(&request)
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.render());
            }
            Ok(())
        }
    }
}

async fn run_workflow_command(
    command: WorkflowCommands,
    config: StudioConfig,
    dry_run: bool,
) -> Result<()> {
    match command {
        WorkflowCommands::Run {
            workflow,
            tasks,
            context,
            parallel,
            strategy,
            output,
            json,
        } => {
            let tasks: Vec<TaskSpec> = read_json(&tasks)?;
            let context: WorkflowContext = match context {
                Some(path) => read_json(&path)?,
                None => WorkflowContext::new(),
            };

            let mut request = WorkflowRequest::new(workflow)
                .with_tasks(tasks)
                .with_context(context)
                .parallel(parallel);
            if let Some(strategy) = strategy {
                request = request.with_strategy(strategy);
            }

            let engine_config = EngineConfig::from_studio_config(&config);
            let studio = Studio::build(config, dry_run);
            let engine = WorkflowEngine::new(studio.agents, engine_config);
            let report = engine.run(&request).await?;

            let rendered = if json {
                serde_json::to_string_pretty(&report)?
            } else {
                report.render()
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!("Report written to {} ({})", path.display(), report.status());
                }
                None => println!("{}", rendered),
            }
        }

        WorkflowCommands::List => {
            println!("Available Workflows:\n");
            for workflow in WorkflowType::ALL {
                println!("  {} - {}", workflow, workflow.description());
            }
            println!("\nRun a workflow with: studio workflow run <type> --tasks tasks.json");
        }

        WorkflowCommands::Show { workflow } => {
            let workflow: WorkflowType = workflow.parse()?;
            println!("Workflow: {} ({})\n", workflow.display_name(), workflow);
            println!("Description: {}\n", workflow.description());

            let plan = plan_for(workflow);
            if plan.is_empty() {
                println!("Steps: one per task; agent from the task's 'agent' or 'type' field.");
                return Ok(());
            }

            println!("Steps:");
            for (i, step) in plan.iter().enumerate() {
                println!(
                    "  {}. {} [Agent: {}, thinking: {}]",
                    i + 1,
                    step.title,
                    step.agent,
                    step.thinking
                );
                let inclusion = match step.inclusion {
                    Inclusion::Always => "always".to_string(),
                    Inclusion::TaskPresent => format!("when a '{}' task is given", step.task_type),
                    Inclusion::ContextKey(key) => format!("when context has '{}'", key),
                };
                println!("     Runs: {}", inclusion);
                let input = match step.task_need {
                    TaskNeed::Required => format!("first '{}' task (required)", step.task_type),
                    TaskNeed::Optional => format!("first '{}' task, if any", step.task_type),
                    TaskNeed::AllOfType => format!("every '{}' task", step.task_type),
                };
                println!("     Input: {}", input);
                if let ModelRule::Fixed(model) = step.model_rule {
                    println!("     Model: {}", model);
                }
                if !step.context_args.is_empty() {
                    let keys: Vec<_> = step.context_args.iter().map(|a| a.key).collect();
                    println!("     Context: {}", keys.join(", "));
                }
            }
        }
    }

    Ok(())
}

fn run_agents_command(command: AgentCommands) -> Result<()> {
    let registry = AgentRegistry::builtin();

    match command {
        AgentCommands::List => {
            println!("Available Agents:\n");
            for profile in registry.iter() {
                println!(
                    "  {} ({}, {}) - {}",
                    profile.name,
                    profile.preferred_model,
                    profile.thinking_mode,
                    profile.description
                );
            }
        }

        AgentCommands::Show { agent } => {
            let profile = registry.get(&agent)?;
            println!("Agent: {}\n", profile.name);
            println!("Description: {}", profile.description);
            println!("Preferred Model: {}", profile.preferred_model);
            println!("Thinking Mode: {}", profile.thinking_mode);
            if !profile.requires_model {
                println!("Fans out to several models");
            }
            println!("\nModel by strategy:");
            for strategy in ModelStrategy::ALL {
                println!("  {:<22} {}", strategy.as_str(), select_model(&profile.name, strategy));
            }
        }
    }

    Ok(())
}

async fn run_agent_command(
    command: AgentRunCommands,
    config: StudioConfig,
    dry_run: bool,
) -> Result<()> {
    match command {
        AgentRunCommands::Run {
            agent,
            prompt,
            args,
            model,
            thinking,
        } => {
            let studio = Studio::build(config, dry_run);
            let runner = studio.agents.get(&agent)?;

            let mut request = AgentRequest::new();
            if let Some(prompt) = prompt {
                request = request.with("prompt", prompt);
            }
            for (key, value) in args {
                request = request.with(key, value);
            }
            request.model = model;
            request.thinking_mode = thinking;

            let output = runner.execute(&request).await?;
            println!("{}", output);
        }
    }

    Ok(())
}

async fn run_models_command(
    command: ModelCommands,
    config: StudioConfig,
    dry_run: bool,
) -> Result<()> {
    match command {
        ModelCommands::Select { agent, strategy } => {
            let strategy = ModelStrategy::from_name_lenient(&strategy);
            println!("{}", select_model(&agent, strategy));
        }

        ModelCommands::List => {
            let studio = Studio::build(config, dry_run);
            let dispatcher = studio.agents.dispatcher();

            println!("Logical models:\n");
            for model in ["gemini-pro", "gemini-flash", "claude-haiku", "gpt-5", "ollama"] {
                let status = if dispatcher.is_available(model) {
                    "available"
                } else {
                    "unavailable"
                };
                println!("  {:<14} {}", model, status);
            }

            println!("\nLocal Ollama models ({}):\n", studio.config.ollama.url);
            match list_models(&studio.config.ollama.url).await {
                Ok(models) if models.is_empty() => println!("  (none pulled)"),
                Ok(models) => {
                    for m in models {
                        let marker = if m.name == studio.config.ollama.model { "*" } else { " " };
                        println!("{} {} ({:.1} GB)", marker, m.name, m.size as f64 / 1e9);
                    }
                }
                Err(e) => println!("  Could not reach Ollama: {}", e),
            }
        }
    }

    Ok(())
}
