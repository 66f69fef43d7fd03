use anyhow::Result;
use feed_core::{Catalog, Config, Feed, FeedEngine, FeedEntry};
use std::path::Path;
use tracing::info;

/// Rank a catalog file and print the resulting feed to stdout
pub fn run(
    config: &Config,
    catalog_path: &Path,
    query: &str,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let catalog = Catalog::from_path(catalog_path)?;
    info!(listings = catalog.len(), "Catalog loaded");

    let engine = FeedEngine::new(config.ranking.clone())?;
    let feed = match seed {
        Some(seed) => engine.build_feed_seeded(catalog.listings(), query, seed),
        None => engine.build_feed_with_os_rng(catalog.listings(), query),
    };

    info!(
        mode = ?feed.mode,
        listings = feed.items().count(),
        ads = feed.ad_count(),
        "Feed built"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&feed)?);
    } else {
        print!("{}", render(&feed));
    }

    Ok(())
}

/// One line per entry: position, tier, score, flags, id and name
pub fn render(feed: &Feed) -> String {
    let mut out = String::new();

    for (pos, entry) in feed.entries.iter().enumerate() {
        let line = match entry {
            FeedEntry::Listing(item) => {
                let tier = item
                    .tier
                    .map(|t| t.level().to_string())
                    .unwrap_or_else(|| "-".to_string());
                let flag = if item.featured { "*" } else { " " };
                format!(
                    "{:>4}  tier {}  {:>8.3} {} {:<20} {}\n",
                    pos, tier, item.score, flag, item.listing.id, item.listing.name
                )
            }
            FeedEntry::AdSlot { key } => format!("{:>4}  [ad] {}\n", pos, key),
        };
        out.push_str(&line);
    }

    out
}
