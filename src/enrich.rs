//! Article-page date back-fill.
//!
//! Home-page listings often show no date next to a link. When enabled, this
//! step fetches the linked article pages and mines them for a publish date
//! (label-adjacent search first, then the URL-path fallback).
//!
//! Resource discipline, in order of importance:
//! - the number of secondary fetches per run is bounded by a configurable
//!   cap,
//! - each URL is fetched at most once per run via [`DateCache`], which is
//!   scoped to the run and passed in, never process-lifetime state,
//! - fetches run on a bounded-concurrency stream,
//! - a failed fetch degrades that one item to "unknown date" and nothing
//!   else.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::Html;
use tracing::{debug, info, warn};

use crate::dates;
use crate::fetch;
use crate::models::Item;

/// How many article pages are fetched at once.
const BACKFILL_CONCURRENCY: usize = 8;

/// Per-run memo of URL → resolution outcome. Negative outcomes are cached
/// too, so a URL that yielded nothing is not fetched again within the run.
#[derive(Debug, Default)]
pub struct DateCache {
    resolved: HashMap<String, Option<NaiveDate>>,
}

impl DateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.resolved.contains_key(url)
    }

    pub fn insert(&mut self, url: String, date: Option<NaiveDate>) {
        self.resolved.insert(url, date);
    }

    pub fn get(&self, url: &str) -> Option<Option<NaiveDate>> {
        self.resolved.get(url).copied()
    }
}

/// Fill in missing publish dates by fetching article pages.
///
/// Items that already carry a date are untouched. At most `fetch_cap` pages
/// are fetched; items beyond the cap keep their unknown date.
pub async fn backfill_dates(
    client: &Client,
    items: &mut [Item],
    cache: &mut DateCache,
    fetch_cap: usize,
) {
    let mut pending: Vec<String> = Vec::new();
    let mut queued: HashSet<&str> = HashSet::new();
    for item in items.iter() {
        if item.pub_date.is_none() && !cache.contains(&item.url) && queued.insert(&item.url) {
            pending.push(item.url.clone());
        }
    }
    drop(queued);

    if pending.len() > fetch_cap {
        warn!(
            pending = pending.len(),
            cap = fetch_cap,
            "Date back-fill fetch cap reached; remaining items keep an unknown date"
        );
        pending.truncate(fetch_cap);
    }

    if !pending.is_empty() {
        info!(count = pending.len(), "Back-filling publish dates from article pages");
        let outcomes: Vec<(String, Option<NaiveDate>)> = stream::iter(pending)
            .map(|url| {
                let client = client.clone();
                async move {
                    let date = resolve_article_date(&client, &url).await;
                    (url, date)
                }
            })
            .buffer_unordered(BACKFILL_CONCURRENCY)
            .collect()
            .await;
        for (url, date) in outcomes {
            cache.insert(url, date);
        }
    }

    let mut filled = 0usize;
    for item in items.iter_mut() {
        if item.pub_date.is_none() {
            if let Some(outcome) = cache.get(&item.url) {
                if outcome.is_some() {
                    filled += 1;
                }
                item.pub_date = outcome;
            }
        }
    }
    debug!(filled, "Date back-fill applied");
}

/// Fetch one article page and mine it for a date. A transport failure is
/// caught here; the URL-path fallback still gets its chance since it needs
/// no network.
async fn resolve_article_date(client: &Client, url: &str) -> Option<NaiveDate> {
    let from_page = match fetch::get_text(client, url).await {
        Ok(body) => page_date(&body),
        Err(e) => {
            warn!(%url, error = %e, "Article fetch failed; falling back to URL path");
            None
        }
    };
    from_page.or_else(|| dates::resolve_from_url_path(url))
}

/// Extract the page text and run the label-prioritized resolver over it.
fn page_date(html: &str) -> Option<NaiveDate> {
    let document = Html::parse_document(html);
    let text = document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ");
    dates::resolve_near_labels(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn undated_item(url: &str) -> Item {
        Item {
            title: "工信部关于5G发展的最新政策解读".to_string(),
            publisher: "工业和信息化部".to_string(),
            url: url.to_string(),
            pub_date: None,
            source: "MIIT-首页-最新政策".to_string(),
            fetched_at: "2026-01-21T12:00:00+08:00".to_string(),
        }
    }

    #[test]
    fn test_page_date_prefers_labelled_date() {
        let html = r#"
            <html><body>
              <div class="crumbs">首页 > 2026-01-01 政策文件</div>
              <div class="meta">发布时间：2026-01-16　来源：办公厅</div>
              <div class="content">正文……</div>
            </body></html>
        "#;
        assert_eq!(page_date(html), Some(date(2026, 1, 16)));
    }

    #[test]
    fn test_page_date_unknown() {
        assert_eq!(page_date("<html><body>无日期正文</body></html>"), None);
    }

    #[tokio::test]
    async fn test_backfill_applies_cached_outcomes_without_fetching() {
        let client = fetch::client().unwrap();
        let mut cache = DateCache::new();
        cache.insert(
            "https://example.invalid/a".to_string(),
            Some(date(2026, 1, 16)),
        );
        cache.insert("https://example.invalid/b".to_string(), None);

        let mut items = vec![
            undated_item("https://example.invalid/a"),
            undated_item("https://example.invalid/b"),
        ];
        // Cap of zero: nothing may touch the network; cached outcomes still
        // apply.
        backfill_dates(&client, &mut items, &mut cache, 0).await;

        assert_eq!(items[0].pub_date, Some(date(2026, 1, 16)));
        assert_eq!(items[1].pub_date, None);
    }

    #[tokio::test]
    async fn test_backfill_cap_zero_skips_unknown_urls() {
        let client = fetch::client().unwrap();
        let mut cache = DateCache::new();
        let mut items = vec![undated_item("https://example.invalid/never-fetched")];

        backfill_dates(&client, &mut items, &mut cache, 0).await;

        assert_eq!(items[0].pub_date, None);
        assert!(!cache.contains("https://example.invalid/never-fetched"));
    }

    #[test]
    fn test_cache_memoizes_negative_outcomes() {
        let mut cache = DateCache::new();
        cache.insert("https://example.com/a".to_string(), None);
        assert!(cache.contains("https://example.com/a"));
        assert_eq!(cache.get("https://example.com/a"), Some(None));
    }
}
