// Copyright 2026 Kargo Takip Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use kargo_takip::cli;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "kargo-takip",
    about = "Kargo Takip — track Turkish parcel carriers from the command line",
    version,
    after_help = "Run 'kargo-takip <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track a shipment by tracking number
    Track {
        /// Carrier tracking number
        tracking_number: String,
        /// Provider name (case-insensitive)
        #[arg(long, default_value = "aras kargo")]
        provider: String,
    },
    /// List registered providers
    Providers,
    /// Check environment and diagnose issues
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is reserved for results.
    let default_level = if cli.verbose {
        "kargo_takip=debug"
    } else {
        "kargo_takip=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Track {
            tracking_number,
            provider,
        } => cli::track_cmd::run(&provider, &tracking_number, cli.json).await,
        Commands::Providers => cli::providers_cmd::run(cli.json),
        Commands::Doctor => cli::doctor::run().await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "kargo-takip", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    result
}
