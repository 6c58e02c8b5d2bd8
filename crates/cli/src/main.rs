//! Toyshop CLI - catalog maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Create one copy of every toy per palette color
//! toyshop-cli variants generate --yes
//!
//! # List toys through the catalog filters
//! toyshop-cli products list --category Dolls --age 3-5 --color red
//! ```
//!
//! # Commands
//!
//! - `variants generate` - Color variant batch (re-running duplicates records)
//! - `products list` - Filtered catalog listing

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "toyshop-cli")]
#[command(author, version, about = "Toyshop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Color variant maintenance
    Variants {
        #[command(subcommand)]
        action: VariantAction,
    },
    /// Catalog queries
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
}

#[derive(Subcommand)]
enum VariantAction {
    /// Create Blue, Black, Red and Yellow copies of every toy
    Generate {
        /// Confirm the run. Every run creates new records, even for toys
        /// that already have variants.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List toys matching the filters
    List {
        /// Category name (case-insensitive)
        #[arg(long)]
        category: Option<String>,

        /// Age bucket: 0-2, 3-5, 6-8, 9-12 or 13+
        #[arg(long)]
        age: Option<String>,

        /// Color name (case-insensitive)
        #[arg(long)]
        color: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "toyshop_cli=info,toyshop_storefront=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Variants { action } => match action {
            VariantAction::Generate { yes } => commands::variants::generate(yes).await,
        },
        Commands::Products { action } => match action {
            ProductAction::List {
                category,
                age,
                color,
            } => commands::products::list(category, age, color).await,
        },
    }
}
