//! Myshop CLI - database migrations and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! myshop-cli migrate
//!
//! # Load categories and products from a YAML file
//! myshop-cli seed catalog.yaml
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "myshop-cli")]
#[command(author, version, about = "Myshop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Create or update categories and products from a YAML file
    Seed {
        /// Path to the catalog YAML file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { file } => {
            let summary = commands::seed::catalog(&file).await?;
            tracing::info!(
                categories = summary.categories,
                products = summary.products,
                "Seeding complete"
            );
        }
    }
    Ok(())
}
