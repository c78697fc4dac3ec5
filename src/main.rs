//! autocommit - CLI entry point.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use autocommit::confirm::{AssumeYes, Confirmer, TerminalConfirmer};
use autocommit::error::{AutocommitError, PromptError};
use autocommit::git::{GitCli, check_git_installed};
use autocommit::pipeline::{Outcome, Pipeline, RunOptions, RunState};
use autocommit::{Config, GeminiClient};

/// Exit status used when the operator interrupts the run.
const INTERRUPTED_EXIT_CODE: u8 = 130;

/// Generate a commit message for pending changes with Gemini and commit them.
#[derive(Parser, Debug)]
#[command(name = "autocommit")]
#[command(about = "Generate a commit message for pending changes with Gemini and commit them")]
#[command(version)]
struct Cli {
    /// Language of the generated message (overrides COMMIT_LANGUAGE)
    #[arg(long)]
    lang: Option<String>,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long)]
    yes: bool,

    /// Print the generated message and leave the repository untouched
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nOperation cancelled by user.");
            std::process::exit(i32::from(INTERRUPTED_EXIT_CODE));
        }
    });

    println!("autocommit started...");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_cancelled(&e) => {
            println!("Operation cancelled by user.");
            ExitCode::from(INTERRUPTED_EXIT_CODE)
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Whether the run ended because the operator interrupted a prompt.
fn is_cancelled(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<AutocommitError>(),
        Some(AutocommitError::Prompt(PromptError::Cancelled))
    )
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    debug!("State {:?}", RunState::Init);

    // Step 1: Load configuration (.env first, real environment wins)
    if let Err(e) = dotenv::dotenv() {
        debug!("No .env loaded: {}", e);
    }
    let mut config = Config::from_env()?;
    if let Some(lang) = cli.lang {
        config = config.with_language(lang)?;
    }

    // Step 2: Check prerequisites
    check_git_installed()?;
    let backend = GeminiClient::from_config(&config).context("Failed to build HTTP client")?;
    let workdir = std::env::current_dir().context("Failed to get current directory")?;

    let confirmer: &dyn Confirmer = if cli.yes { &AssumeYes } else { &TerminalConfirmer };

    let mut options = RunOptions::new(workdir);
    options.dry_run = cli.dry_run;

    // Step 3: Run the pipeline
    let git = GitCli::new();
    let mut pipeline = Pipeline::new(&config, &git, &backend, confirmer, options);
    match pipeline.run().await {
        Ok(Outcome::Committed { message }) => {
            debug!("Committed with title: {}", message.title());
            Ok(())
        }
        Ok(Outcome::Aborted(reason)) => {
            debug!("Aborted: {:?}", reason);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
