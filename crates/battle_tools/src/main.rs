//! Battle data development tools.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "battle-tools")]
#[command(about = "Development tools for the battle engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate data files
    Validate {
        /// Path to data directory
        #[arg(default_value = "assets/data")]
        path: String,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating data files in: {path}");
            match battle_tools::validate::validate_data_directory(std::path::Path::new(&path)) {
                Ok(report) if report.is_ok() => {
                    tracing::info!(files = report.files_checked, "Validation passed");
                }
                Ok(report) => {
                    for issue in &report.issues {
                        tracing::error!("{issue}");
                    }
                    tracing::error!(
                        files = report.files_checked,
                        issues = report.issues.len(),
                        "Validation failed"
                    );
                    std::process::exit(1);
                }
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}
