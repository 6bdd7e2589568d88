//! Remark CLI - Main entry point

mod cli;

use clap::{Parser, Subcommand};
use remark_foundation::{ActionFailurePolicy, RunnerSettings, SettingsScope};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Remark - keyword driven comment tasks
#[derive(Parser, Debug)]
#[command(name = "remark")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover targets for a keyword and comment on each of them
    Run {
        /// Keyword used to discover targets
        #[arg(short, long)]
        keyword: String,

        /// Comment text to submit
        #[arg(short, long)]
        comment: String,

        /// Comments per target (defaults to the configured repeat count)
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        count: Option<i64>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Collect commenters from targets matching a keyword
    Collect {
        /// Keyword used to discover targets
        #[arg(short, long)]
        keyword: String,

        /// Maximum number of users to collect
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective settings, or change and save one scope
    Settings {
        /// Failure policy to store (continue or abort)
        #[arg(long)]
        failure_policy: Option<ActionFailurePolicy>,

        /// Default comments per target to store
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        default_count: Option<u32>,

        /// Write to the global settings instead of the project's
        #[arg(long)]
        global: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging (stderr, stdout is reserved for results)
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Load configuration
    let settings = RunnerSettings::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load settings: {}", e);
        RunnerSettings::default()
    });

    match args.command {
        Command::Run {
            keyword,
            comment,
            count,
            json,
        } => {
            let count = count.unwrap_or_else(|| i64::from(settings.default_repeat_count()));
            cli::run_task(&settings, &keyword, &comment, count, json).await
        }
        Command::Collect {
            keyword,
            limit,
            json,
        } => {
            cli::collect(&settings, &keyword, limit, json).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Settings {
            failure_policy,
            default_count,
            global,
        } => {
            if failure_policy.is_none() && default_count.is_none() {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                let scope = if global {
                    SettingsScope::Global
                } else {
                    SettingsScope::Project
                };
                cli::update_settings(scope, failure_policy, default_count)?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
