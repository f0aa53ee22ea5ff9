//! `gcphcp`: operational commands for GKE-hosted OpenShift control planes,
//! executed through Cloud Workflows.

mod commands;
mod duration;
mod render;
mod session;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use gcphcp_api::{CancelReason, WorkflowError};
use gcphcp_util::config::{OUTPUT_ENV, PROJECT_ENV, REGION_ENV};
use gcphcp_util::redact_sensitive;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::ops::OpsCommand;
use crate::session::Session;

const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, Parser)]
#[command(name = "gcphcp")]
#[command(about = "GCP HCP CLI - operate hosted control planes through Cloud Workflows")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// GCP project ID
    #[arg(long, env = PROJECT_ENV, global = true)]
    pub project: Option<String>,

    /// GCP region
    #[arg(long, env = REGION_ENV, global = true)]
    pub region: Option<String>,

    /// Output format: text, json, yaml
    #[arg(long, short = 'o', env = OUTPUT_ENV, global = true)]
    pub output: Option<String>,

    /// Config file path (default: <config dir>/gcphcp/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log debug output to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Operational commands for cluster debugging and remediation
    Ops {
        #[command(subcommand)]
        command: OpsCommand,
    },

    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let cancel = CancellationToken::new();
    spawn_interrupt_listener(cancel.clone());

    let result = tokio::select! {
        biased;
        result = run(cli, cancel.clone()) => result,
        _ = cancel.cancelled() => Err(WorkflowError::Cancelled {
            action: "running command".to_string(),
            reason: CancelReason::Cancelled,
        }
        .into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {}", redact_sensitive(&format!("{error:#}")));
            if was_interrupted(&error) {
                ExitCode::from(EXIT_INTERRUPTED)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli, cancel: CancellationToken) -> Result<()> {
    match cli.command {
        Commands::Version => {
            print!("{}", commands::version::version_text());
            Ok(())
        }
        Commands::Ops { command } => {
            let session = Session::load(&cli.global, cancel)?;
            commands::ops::run(command, &session).await
        }
    }
}

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` is honoured unless
/// `--verbose` asks for debug output.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Ctrl+C stops waiting; remote executions are left running.
fn spawn_interrupt_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received");
            cancel.cancel();
        }
    });
}

fn was_interrupted(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<WorkflowError>(),
            Some(WorkflowError::Cancelled {
                reason: CancelReason::Cancelled,
                ..
            })
        )
    })
}
