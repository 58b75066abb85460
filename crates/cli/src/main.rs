mod app;
mod cli;
mod config;
mod terminal;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use acemock_core::config::{load_dotenv, Config};
use acemock_core::profile::ProfileKind;
use acemock_interview::InterviewController;
use acemock_llm::EvaluationGateway;
use acemock_runner::{CatalogSource, CodeRunner};

use crate::app::{App, AppOptions};
use crate::cli::CliArgs;
use crate::config::CliConfig;
use crate::terminal::{InputLines, Terminal};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let terminal = Terminal::new();

    // Config: env (with .env), then the TOML file and flags on top
    load_dotenv();
    let file_config = CliConfig::load(args.config.as_deref())
        .context("failed to load configuration")?;
    let mut config = Config::from_env();
    file_config.apply(&args, &mut config.llm, &mut config.execution);
    config.log_summary();

    // Handle --list-selections
    if args.list_selections {
        let groups: Vec<_> = ProfileKind::ALL
            .iter()
            .map(|kind| (*kind, acemock_core::profile::filter_options("", Some(*kind))))
            .collect();
        terminal.print_selections(&groups)?;
        return Ok(());
    }

    let runner = CodeRunner::from_config(&config.execution)
        .context("failed to create code runner")?;

    // Handle --list-runtimes
    if args.list_runtimes {
        let languages = runner.available_languages().await;
        let source = runner.catalog().get(runner.piston()).await.source;
        terminal.print_runtimes(&languages, source == CatalogSource::Fallback)?;
        return Ok(());
    }

    if !config.llm.is_configured() {
        bail!(
            "no API key for provider '{}': pass --api-key, set the provider's API key \
             environment variable, or add it to the config file",
            config.llm.provider
        );
    }

    let gateway = EvaluationGateway::from_config(&config.llm)
        .context("failed to create LLM provider")?;
    terminal.print_banner(gateway.provider_name(), config.llm.active_model())?;
    info!(provider = gateway.provider_name(), "Starting interview");

    let controller = InterviewController::new(
        Arc::new(gateway),
        Arc::new(runner),
        config.interview.clone(),
    );
    let options = AppOptions {
        timed: !args.no_timer,
        json: args.json,
        selection: args.selection.clone(),
    };

    App::new(controller, terminal, InputLines::spawn(), options)
        .run()
        .await
}
