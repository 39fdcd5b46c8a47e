//! price-compare - price comparison service for electronics listings
//!
//! Serves ranked seller offers over a REST API and scrapes store pages for prices.

use anyhow::Result;
use clap::{Parser, Subcommand};
use price_compare::api::hash_password;
use price_compare::commands::{self, RecordTarget, ScrapeCommand};
use price_compare::config::{Config, OutputFormat};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "price-compare",
    version,
    about = "Price comparison service for electronics listings",
    long_about = "Compares seller offers for electronics, ranks authorised sellers first, \
                  and scrapes store product pages for a confident price."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format (table, json, csv)
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST API
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<String>,

        /// SQLite database URL
        #[arg(long)]
        database: Option<String>,
    },

    /// Scrape product pages by ASIN
    #[command(alias = "s")]
    Scrape {
        /// ASIN(s) to scrape
        #[arg(required = true)]
        asins: Vec<String>,

        /// Category whose price band applies
        #[arg(long)]
        category: Option<String>,

        /// Record the price as an offer for this product slug
        #[arg(long, requires = "seller")]
        record: Option<String>,

        /// Seller name the recorded offer belongs to
        #[arg(long, requires = "record")]
        seller: Option<String>,

        /// Warranty type of the recorded offer
        #[arg(long, default_value = "Brand warranty")]
        warranty: String,

        /// Return window of the recorded offer, in days
        #[arg(long, default_value = "0")]
        return_days: i64,

        /// SQLite database URL
        #[arg(long)]
        database: Option<String>,
    },

    /// Extract a price from a saved product page
    #[command(alias = "x")]
    Extract {
        /// HTML file to read
        file: PathBuf,

        /// Category whose price band applies
        #[arg(long)]
        category: Option<String>,
    },

    /// Print an Argon2 hash for the admin password
    HashPassword {
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        let level = match cli.command {
            Commands::Serve { .. } => Level::INFO,
            _ => Level::WARN,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(format) = cli.format {
        config.format = format;
    }

    match cli.command {
        Commands::Serve { bind, database } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(database) = database {
                config.database_url = database;
            }

            commands::serve(&config).await?;
        }

        Commands::Scrape { asins, category, record, seller, warranty, return_days, database } => {
            if let Some(database) = database {
                config.database_url = database;
            }
            if return_days < 0 {
                anyhow::bail!("--return-days must not be negative");
            }

            let target = match (record, seller) {
                (Some(product_slug), Some(seller_name)) => Some(RecordTarget {
                    product_slug,
                    seller_name,
                    warranty_type: warranty,
                    return_days,
                }),
                _ => None,
            };

            let cmd = ScrapeCommand::new(config).category(category).record(target);
            let output = cmd.execute(&asins).await?;
            println!("{}", output);
        }

        Commands::Extract { file, category } => {
            let output = commands::extract_file(&config, &file, category.as_deref())?;
            println!("{}", output);
        }

        Commands::HashPassword { password } => {
            println!("{}", hash_password(&password)?);
        }
    }

    Ok(())
}
