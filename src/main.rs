//! # Policy News Watch
//!
//! A harvesting pipeline that collects policy-news items from a small set of
//! government and news sources, normalizes them into canonical records, and
//! merges only genuinely new items into a durable CSV store.
//!
//! ## Features
//!
//! - Scrapes the MIIT home page, a gov "latest policy" RSS bridge, and an
//!   optional news search API
//! - Resolves publish dates through a prioritized cascade (fixed patterns,
//!   permissive parse, label-adjacent article mining, URL-path fallback)
//! - Deduplicates within a run by canonical URL key and against the store
//!   by raw URL string
//! - Rewrites the store atomically-in-spirit: merged in memory, re-sorted,
//!   then written whole
//!
//! ## Usage
//!
//! ```sh
//! policy_news_watch --config config.yaml
//! ```
//!
//! ## Architecture
//!
//! One run is logically sequential:
//! 1. **Extraction**: each configured source yields raw candidates
//! 2. **Assembly**: candidates become Items; publish dates resolved
//! 3. **Back-fill**: undated home-page items get their article pages mined
//!    for a date (bounded, memoized)
//! 4. **Filtering**: keyword gate, then time-window gate
//! 5. **Merge**: intra-batch dedup, then append-only merge into the store

use std::error::Error;
use std::path::Path;

use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod dates;
mod enrich;
mod fetch;
mod models;
mod pipeline;
mod scrapers;
mod store;
mod urls;
mod utils;

use cli::Cli;
use enrich::DateCache;
use models::Item;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("policy_news_watch starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.config, ?args.csv_out, "Parsed CLI arguments");

    // Config errors are fatal before any network activity.
    let config = config::load_config(Path::new(&args.config))?;
    info!(config_path = %args.config, "Loaded configuration");

    let csv_path = args
        .csv_out
        .clone()
        .unwrap_or_else(|| config.output.csv_path.clone());
    let added_count_path = args
        .added_count_out
        .clone()
        .unwrap_or_else(|| config.output.added_count_path.clone());

    let client = fetch::client()?;
    let now = utils::now_civil();
    let fetched_at = utils::fetched_at_stamp(now);

    // ---- Extract and assemble, source by source ----
    let mut home_items: Vec<Item> = Vec::new();
    let mut feed_items: Vec<Item> = Vec::new();
    let mut search_items: Vec<Item> = Vec::new();

    if let Some(source) = &config.sources.miit_home {
        match scrapers::miit::collect(&client, source).await {
            Ok(candidates) => {
                home_items = candidates
                    .into_iter()
                    .filter_map(|candidate| {
                        pipeline::build_item(
                            candidate,
                            &source.name,
                            &source.url,
                            source.min_title_len,
                            &fetched_at,
                        )
                    })
                    .collect();
                info!(count = home_items.len(), "Assembled MIIT home-page items");
            }
            Err(e) => {
                error!(url = %source.url, error = %e, "MIIT home page unreachable; source contributes nothing");
            }
        }
    }

    if let Some(source) = &config.sources.gov_policy_rss {
        match scrapers::govrss::collect(&client, source).await {
            Ok(candidates) => {
                feed_items = candidates
                    .into_iter()
                    .filter_map(|candidate| {
                        pipeline::build_item(candidate, &source.name, &source.rss, 1, &fetched_at)
                    })
                    .collect();
                info!(count = feed_items.len(), "Assembled gov feed items");
            }
            Err(e) => {
                error!(feed = %source.rss, error = %e, "Gov feed unreachable; source contributes nothing");
            }
        }
    }

    if let Some(source) = &config.sources.news_search {
        match scrapers::search::collect(&client, source, now).await {
            Ok(candidates) => {
                search_items = candidates
                    .into_iter()
                    .filter_map(|candidate| {
                        pipeline::build_item(
                            candidate,
                            &source.name,
                            &source.endpoint,
                            1,
                            &fetched_at,
                        )
                    })
                    .collect();
                info!(count = search_items.len(), "Assembled search items");
            }
            Err(e) => {
                error!(endpoint = %source.endpoint, error = %e, "Search endpoint unreachable; source contributes nothing");
            }
        }
    }

    // ---- Back-fill missing dates from article pages ----
    if config.resolve_pub_date && !home_items.is_empty() {
        let mut cache = DateCache::new();
        enrich::backfill_dates(
            &client,
            &mut home_items,
            &mut cache,
            config.resolve_pub_date_cap,
        )
        .await;
    }

    // ---- Filter, dedup, merge ----
    let batch: Vec<Item> = home_items
        .into_iter()
        .chain(feed_items)
        .chain(search_items)
        .collect();
    info!(count = batch.len(), "Total items before filtering");

    let filtered = pipeline::apply_filters(
        batch,
        &config.keywords,
        now,
        config.window_days,
        config.hard_cap_days,
    );
    let deduped = pipeline::dedup_batch(filtered);
    info!(count = deduped.len(), "Items after filtering and dedup");

    let csv_path = Path::new(&csv_path);
    let existing = store::load_existing(csv_path)?;
    let (merged, added) = store::merge(existing, &deduped);

    // Persistence errors are fatal: surface them, write no added-count
    // artifact.
    store::write_store(csv_path, &merged)?;

    if let Err(e) = std::fs::write(&added_count_path, added.to_string()) {
        error!(path = %added_count_path, error = %e, "Failed to write added-count file");
        return Err(e.into());
    }

    if added == 0 {
        warn!("Run added no new items");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        rows = merged.len(),
        added,
        "Execution complete"
    );

    Ok(())
}
