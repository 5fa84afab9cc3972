//! The durable CSV store and its merge contract.
//!
//! The store is a flat CSV table with a fixed column set: Title, Publisher,
//! NewsURL, PublishDate (possibly empty), Source, FetchedAt. Each run reads
//! the whole table, appends only items whose **exact** URL string is not
//! already present (deliberately not the canonical key, so `http://x` and
//! `https://x` land as separate rows) and rewrites the file globally
//! re-sorted. The merged table is fully computed in memory before the first
//! byte is written; a failed write leaves no partially merged file behind.
//!
//! The file is UTF-8 with a leading BOM so spreadsheet tools pick up the
//! CJK columns without an import dialog.

use std::collections::HashSet;
use std::error::Error;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::models::Item;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Sort sentinel for rows without a publish date: sorts after every real
/// date in the descending order.
const EMPTY_DATE_SORT_KEY: &str = "0000-00-00";

/// One persisted row, column names exactly as written to the file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoreRow {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Publisher")]
    pub publisher: String,
    #[serde(rename = "NewsURL")]
    pub news_url: String,
    #[serde(rename = "PublishDate")]
    pub publish_date: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "FetchedAt")]
    pub fetched_at: String,
}

impl StoreRow {
    fn from_item(item: &Item) -> Self {
        Self {
            title: item.title.clone(),
            publisher: item.publisher.clone(),
            news_url: item.url.clone(),
            publish_date: item
                .pub_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            source: item.source.clone(),
            fetched_at: item.fetched_at.clone(),
        }
    }
}

/// Read the persisted table. A missing file is an empty table, not an
/// error; a present-but-unreadable file is fatal.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_existing(path: &Path) -> Result<Vec<StoreRow>, Box<dyn Error>> {
    if !path.exists() {
        debug!("No existing store; starting from an empty table");
        return Ok(Vec::new());
    }
    let bytes = fs::read(path)?;
    let body = bytes
        .strip_prefix(&UTF8_BOM)
        .unwrap_or(&bytes);

    let mut reader = csv::Reader::from_reader(body);
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        let row: StoreRow = row?;
        rows.push(row);
    }
    info!(rows = rows.len(), "Loaded existing store");
    Ok(rows)
}

/// Merge a deduplicated batch into the existing table.
///
/// Identity here is the raw URL string. Returns the re-sorted merged table
/// and the count of rows actually appended, the run's sole "did anything
/// change" signal.
pub fn merge(existing: Vec<StoreRow>, batch: &[Item]) -> (Vec<StoreRow>, usize) {
    let mut known_urls: HashSet<String> =
        existing.iter().map(|row| row.news_url.clone()).collect();

    let mut merged = existing;
    let mut added = 0usize;
    for item in batch {
        if known_urls.contains(&item.url) {
            continue;
        }
        merged.push(StoreRow::from_item(item));
        known_urls.insert(item.url.clone());
        added += 1;
    }

    merged.sort_by(|a, b| {
        let date_a = sort_date(&a.publish_date);
        let date_b = sort_date(&b.publish_date);
        date_b
            .cmp(date_a)
            .then_with(|| b.fetched_at.cmp(&a.fetched_at))
    });

    (merged, added)
}

fn sort_date(publish_date: &str) -> &str {
    if publish_date.is_empty() {
        EMPTY_DATE_SORT_KEY
    } else {
        publish_date
    }
}

/// Rewrite the whole store file.
///
/// The CSV body is assembled in memory first; the write either fully
/// replaces the file or fails before touching it.
#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = rows.len()))]
pub fn write_store(path: &Path, rows: &[StoreRow]) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut buffer: Vec<u8> = Vec::new();
    buffer.extend_from_slice(&UTF8_BOM);
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        if rows.is_empty() {
            // Keep the schema visible even before anything was harvested.
            writer.write_record([
                "Title",
                "Publisher",
                "NewsURL",
                "PublishDate",
                "Source",
                "FetchedAt",
            ])?;
        }
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }

    fs::write(path, buffer)?;
    info!("Store rewritten");
    Ok(())
}
