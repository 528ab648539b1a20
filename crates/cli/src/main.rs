//! Cartkeep CLI - Inspect and edit the locally stored cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! cartkeep list
//!
//! # Add a product by hand
//! cartkeep add p1 --title "Chair" --image-url https://img/p1.png --price 200
//!
//! # Add a product, filling missing details from the catalog API
//! cartkeep add p1
//!
//! # Change quantities
//! cartkeep increment p1
//! cartkeep decrement p1
//!
//! # List catalog products
//! cartkeep catalog
//! ```
//!
//! Configuration comes from `CART_STORAGE_DIR`, `CART_STORAGE_KEY` and
//! `CART_API_BASE_URL` (see `cartkeep::config`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cartkeep::storage::FileStorage;
use cartkeep::{CartConfig, CartProvider};

mod commands;

#[derive(Parser)]
#[command(name = "cartkeep")]
#[command(author, version, about = "Cartkeep cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart contents
    List,
    /// Add a product, or bump its quantity if already in the cart
    Add {
        /// Product ID
        id: String,

        /// Display name (looked up in the catalog when omitted)
        #[arg(short, long)]
        title: Option<String>,

        /// Image URL (looked up in the catalog when omitted)
        #[arg(short, long)]
        image_url: Option<String>,

        /// Unit price (looked up in the catalog when omitted)
        #[arg(short, long)]
        price: Option<Decimal>,
    },
    /// Increase a product's quantity by one
    Increment {
        /// Product ID
        id: String,
    },
    /// Decrease a product's quantity by one (never below 1)
    Decrement {
        /// Product ID
        id: String,
    },
    /// List products offered by the catalog API
    Catalog,
}

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr so stdout stays clean for cart output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cartkeep=info,cartkeep_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CartConfig::from_env()?;

    if matches!(cli.command, Commands::Catalog) {
        commands::catalog::list(&config.api).await?;
        return Ok(());
    }

    let storage = Arc::new(FileStorage::new(&config.storage.dir));
    let provider = CartProvider::mount(storage, &config.storage).await;

    let outcome = provider
        .scope(async {
            match cli.command {
                Commands::List => commands::cart::list().await,
                Commands::Add {
                    id,
                    title,
                    image_url,
                    price,
                } => {
                    let details = commands::cart::ProductDetails {
                        title,
                        image_url,
                        price,
                    };
                    commands::cart::add(&id, details, &config.api).await
                }
                Commands::Increment { id } => commands::cart::increment(&id).await,
                Commands::Decrement { id } => commands::cart::decrement(&id).await,
                Commands::Catalog => Ok(()),
            }
        })
        .await;

    // Make sure the last snapshot hits disk before the process exits
    provider.store().flush().await;
    outcome
}
