//! CLI entrypoint for stepwise
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;
use stepwise_application::{Engine, ExecutionProgress, LlmGateway, NoProgress, RunInput};
use stepwise_infrastructure::{
    ConfigLoader, FileConfig, InMemorySessionStore, JsonlConversationLogger, LlmPlanGenerator,
    LlmReportSynthesizer, OpenAiGateway, travel_registry,
};
use stepwise_presentation::{ChatRepl, Cli, ConsoleFormatter, OutputFormat, ProgressReporter};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.show_config {
        print_config_sources(&cli);
        return Ok(());
    }

    let config = load_config(&cli)?;
    info!(model = %config.llm.model, "Starting stepwise");

    let registry = Arc::new(travel_registry().context("failed to register tools")?);

    if cli.list_tools {
        print!("{}", ConsoleFormatter::format_tools(&registry));
        return Ok(());
    }

    // === Dependency Injection ===
    let gateway: Arc<dyn LlmGateway> =
        Arc::new(OpenAiGateway::new(&config.llm).context("failed to create LLM gateway")?);

    let mut engine = Engine::new(
        Arc::new(LlmPlanGenerator::new(gateway.clone())),
        Arc::new(LlmReportSynthesizer::new(gateway)),
        registry,
        config.to_engine_config(),
    )
    .with_session_store(Arc::new(InMemorySessionStore::new()));

    if let Some(path) = &config.logging.conversation_log {
        match JsonlConversationLogger::open(path) {
            Ok(logger) => {
                info!(path = %path.display(), "Conversation log enabled");
                engine = engine.with_conversation_logger(Arc::new(logger));
            }
            Err(e) => warn!(
                "Could not open conversation log {}: {}",
                path.display(),
                e
            ),
        }
    }

    // Chat mode
    if cli.chat {
        let repl = ChatRepl::new(Arc::new(engine))
            .with_constraints(cli.constraint_map())
            .with_output(cli.output)
            .with_progress(!cli.quiet);

        repl.run().await?;
        return Ok(());
    }

    // Single goal mode - goal is required
    let goal = match &cli.goal {
        Some(goal) if !goal.trim().is_empty() => goal.clone(),
        _ => bail!("A goal is required. Use --chat for interactive mode."),
    };

    let token = CancellationToken::new();
    {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling remaining steps");
                token.cancel();
            }
        });
    }

    let reporter = (!cli.quiet).then(ProgressReporter::new);
    let progress: &dyn ExecutionProgress = match &reporter {
        Some(reporter) => reporter,
        None => &NoProgress,
    };

    let input = RunInput::new(goal).with_constraints(cli.constraint_map());
    let result = engine.run_detailed(input, &Some(token), progress).await;
    if let Some(reporter) = &reporter {
        reporter.finish();
    }
    let outcome = result?;

    let output = match cli.output {
        OutputFormat::Full => ConsoleFormatter::format(&outcome),
        OutputFormat::Answer => ConsoleFormatter::format_answer(&outcome),
        OutputFormat::Json => ConsoleFormatter::format_json(&outcome),
    };

    println!("{}", output);

    Ok(())
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };

    let issues = config.validate();
    if !issues.is_empty() {
        let details = issues
            .iter()
            .map(|issue| format!("  - {}", issue))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("Invalid configuration:\n{}", details);
    }

    Ok(config)
}

fn print_config_sources(cli: &Cli) {
    println!("{}", "Configuration sources (highest priority first):".bold());
    println!("  {:<9} STEPWISE_* environment variables", "Env");

    for source in ConfigLoader::config_sources(cli.config.as_ref()) {
        let status = if source.found {
            "found".green()
        } else {
            "not found".dimmed()
        };
        println!(
            "  {:<9} {} ({})",
            source.label,
            source.path.display(),
            status
        );
    }

    if cli.no_config {
        println!();
        println!("{}", "--no-config: only built-in defaults are used".yellow());
    }
}
