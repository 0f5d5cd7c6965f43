//! Sentry Autofix CLI
//!
//! Fetches production errors from Sentry, asks Claude for a fix proposal,
//! and writes human-reviewable reports.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use autofix_claude::ClaudeClient;
use autofix_sentry::SentryClient;

mod config;
mod patch;
mod report;
mod run;

use config::Config;
use run::IssueOutcome;

#[derive(Parser)]
#[command(name = "sentry-autofix")]
#[command(about = "AI-assisted fix proposals for Sentry issues")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze eligible issues and write fix proposals
    Run,

    /// List matching issues and their eligibility without invoking the model
    List,

    /// Analyze one specific issue
    Issue {
        /// Issue ID or short ID (e.g., "WEB-123")
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = cli.config;

    let sentry = SentryClient::new(&config.organization, &config.sentry_token);
    let claude = ClaudeClient::new(&config.anthropic_api_key, &config.model, config.max_tokens);

    match cli.command {
        Commands::Run => {
            let summary = run::run(&config, &sentry, &claude).await?;
            println!(
                "Run complete: {} analyzed, {} skipped, {} failed",
                summary.analyzed, summary.skipped, summary.failed
            );
            println!("Reports written to {}", config.output_dir.display());
        }

        Commands::List => {
            run::list(&config, &sentry).await?;
        }

        Commands::Issue { id } => match run::run_single(&config, &sentry, &claude, &id).await? {
            IssueOutcome::Analyzed => {
                println!("Proposal written to {}", config.output_dir.display());
            }
            IssueOutcome::Skipped => {
                println!("Issue {id} is not eligible for auto-fix");
            }
        },
    }

    Ok(())
}
