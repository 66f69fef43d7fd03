use anyhow::Result;
use clap::{Parser, Subcommand};
use feed_core::{Catalog, Config, EngagementPolicy};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod rank;

#[derive(Parser)]
#[command(name = "feed-ranker")]
#[command(about = "Rank storefront listings into a feed", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the feed for a catalog snapshot
    Rank {
        /// Path to the catalog JSON (defaults to CATALOG_PATH)
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Search text; omit to build the browse feed
        #[arg(short, long, default_value = "")]
        query: String,

        /// Seed for the browse rotation
        #[arg(long)]
        seed: Option<u64>,

        /// Print the feed as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the counter value after one more engagement
    Engagement {
        /// Value currently stored
        #[arg(long)]
        current: u32,

        /// Reset threshold (defaults to ENGAGEMENT_RESET_THRESHOLD)
        #[arg(long)]
        threshold: Option<u32>,
    },

    /// Show catalog statistics
    Stats {
        /// Path to the catalog JSON (defaults to CATALOG_PATH)
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Rank {
            catalog,
            query,
            seed,
            json,
        } => {
            let catalog_path = catalog.unwrap_or_else(|| config.catalog_path.clone());
            info!(catalog = ?catalog_path, query = %query, "Ranking catalog");
            rank::run(&config, &catalog_path, &query, seed, json)?;
        }

        Commands::Engagement { current, threshold } => {
            let threshold = threshold.unwrap_or(config.ranking.engagement_reset_threshold);
            if threshold == 0 {
                anyhow::bail!("--threshold must be at least 1");
            }
            let policy = EngagementPolicy::new(threshold);
            let next = policy.next(current);
            info!(current, next, threshold, reset = policy.resets_after(current), "Engagement");
            println!("{}", next);
        }

        Commands::Stats { catalog } => {
            let catalog_path = catalog.unwrap_or_else(|| config.catalog_path.clone());
            show_stats(&catalog_path)?;
        }
    }

    Ok(())
}

fn show_stats(catalog_path: &Path) -> Result<()> {
    let catalog = Catalog::from_path(catalog_path)?;
    let stats = catalog.stats();

    info!(
        listings = stats.listings,
        fixed_placement = stats.fixed_placement,
        search_boosted = stats.search_boosted,
        with_engagement = stats.with_engagement,
        "Catalog statistics"
    );

    Ok(())
}
