//! Item assembly, acceptance filtering, and intra-batch deduplication.
//!
//! Candidates come out of the extractors noisy: navigation links, decorative
//! anchors, duplicate hrefs in different dress. This module turns them into
//! accepted [`Item`]s in three steps, each silently dropping what fails
//! (noise is expected, not an error):
//!
//! 1. [`build_item`]: structural gates (title length, non-empty href) plus
//!    URL resolution and date resolution.
//! 2. [`keyword_hit`] / [`within_window`]: acceptance policy.
//! 3. [`dedup_batch`]: one Item per canonical URL key.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use tracing::debug;

use crate::dates;
use crate::models::{Item, RawCandidate};
use crate::urls::{canonical_key, normalize};

/// Assemble an [`Item`] from a candidate, or drop it.
///
/// A candidate fails the gate when its trimmed title is shorter than the
/// per-source minimum (counted in characters; the sources are not ASCII)
/// or its href is empty. The publish date comes from the source-provided
/// timestamp when there is one, otherwise from the text around the link.
pub fn build_item(
    candidate: RawCandidate,
    publisher: &str,
    base_url: &str,
    min_title_len: usize,
    fetched_at: &str,
) -> Option<Item> {
    let title = candidate.title.trim();
    if title.chars().count() < min_title_len {
        return None;
    }
    if candidate.href.trim().is_empty() {
        return None;
    }

    let url = normalize(base_url, &candidate.href);
    let pub_date = candidate
        .explicit_time
        .as_deref()
        .and_then(dates::resolve)
        .or_else(|| dates::resolve(&candidate.context_text));

    Some(Item {
        title: title.to_string(),
        publisher: publisher.to_string(),
        url,
        pub_date,
        source: candidate.source_tag,
        fetched_at: fetched_at.to_string(),
    })
}

/// Case-insensitive keyword substring gate on the title.
///
/// Items with no resolved date are not exempt from this gate.
pub fn keyword_hit(title: &str, keywords: &[String]) -> bool {
    let title = title.to_lowercase();
    keywords
        .iter()
        .any(|keyword| title.contains(&keyword.to_lowercase()))
}

/// Time-window acceptance.
///
/// An unknown date passes: better to review an undated row by hand than to
/// miss it. A known date must fall within `[now - hard_cap_days, now]`.
/// `_window_days` is the tighter advisory window; it is carried through the
/// configuration but does not reject on this path (the hard cap is the only
/// enforced horizon for home-page sources).
pub fn within_window(
    pub_date: Option<NaiveDate>,
    now: DateTime<FixedOffset>,
    _window_days: i64,
    hard_cap_days: i64,
) -> bool {
    let Some(date) = pub_date else {
        return true;
    };
    let lower = (now - Duration::days(hard_cap_days)).date_naive();
    let upper = now.date_naive();
    lower <= date && date <= upper
}

/// Run the keyword and time-window gates over a batch.
pub fn apply_filters(
    items: Vec<Item>,
    keywords: &[String],
    now: DateTime<FixedOffset>,
    window_days: i64,
    hard_cap_days: i64,
) -> Vec<Item> {
    let before = items.len();
    let kept: Vec<Item> = items
        .into_iter()
        .filter(|item| keyword_hit(&item.title, keywords))
        .filter(|item| within_window(item.pub_date, now, window_days, hard_cap_days))
        .collect();
    debug!(before, after = kept.len(), "Applied keyword and window filters");
    kept
}

/// Collapse a filtered batch to one Item per canonical URL key.
///
/// The first-seen Item anchors the surviving record; a later duplicate
/// contributes only a better publish date (a resolved date beats an
/// unresolved one, a later date beats an earlier one). Extraction order is
/// stable, so the result is deterministic.
pub fn dedup_batch(items: Vec<Item>) -> Vec<Item> {
    let mut order: Vec<String> = Vec::new();
    let mut kept: HashMap<String, Item> = HashMap::new();

    for item in items {
        let key = canonical_key(&item.url);
        match kept.entry(key) {
            Entry::Vacant(slot) => {
                order.push(slot.key().clone());
                slot.insert(item);
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if fresher_date(existing.pub_date, item.pub_date) {
                    existing.pub_date = item.pub_date;
                }
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| kept.remove(&key))
        .collect()
}

/// Does `candidate` carry a strictly better publish date than `current`?
fn fresher_date(current: Option<NaiveDate>, candidate: Option<NaiveDate>) -> bool {
    match (current, candidate) {
        (None, Some(_)) => true,
        (Some(current), Some(candidate)) => candidate > current,
        _ => false,
    }
}
