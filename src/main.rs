//! Fraud Shield - Main Entry Point
//!
//! Credit card fraud detection front end with CLI and server modes.

use clap::Parser;
use fraud_shield::cli::{
    cmd_analyze, cmd_info, cmd_interactive, cmd_models, cmd_serve, Cli, Commands,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fraud_shield=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Analyze { input, output, report }) => {
            cmd_analyze(&input, output.as_deref(), report.as_deref())?;
        }
        Some(Commands::Info { input }) => {
            cmd_info(&input)?;
        }
        Some(Commands::Models) => {
            cmd_models()?;
        }
        Some(Commands::Serve { port, host }) => {
            cmd_serve(&host, port).await?;
        }
        None => {
            // Default: interactive launcher
            cmd_interactive().await?;
        }
    }

    Ok(())
}
