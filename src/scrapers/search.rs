//! News search API extractor.
//!
//! Search-style sources answer a query with paged JSON results whose
//! freshness is often relative ("3小时前"). Freshness rules here are
//! stricter than for the home-page sources: a result whose publish time
//! cannot be established is dropped outright, and results older than the
//! configured freshness window never become candidates.

use std::error::Error;

use chrono::{DateTime, Duration, FixedOffset};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::SearchSourceConfig;
use crate::dates;
use crate::fetch;
use crate::models::RawCandidate;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    publish_time: Option<String>,
}

/// Query the endpoint page by page and extract candidates.
///
/// An unreachable endpoint is the caller's problem (the source contributes
/// nothing); a failure on a later page just stops the pagination with
/// whatever was already collected.
#[instrument(level = "info", skip_all, fields(endpoint = %source.endpoint, query = %source.query))]
pub async fn collect(
    client: &Client,
    source: &SearchSourceConfig,
    now: DateTime<FixedOffset>,
) -> Result<Vec<RawCandidate>, Box<dyn Error>> {
    let mut out = Vec::new();
    for page in 1..=source.max_pages.max(1) {
        let url = format!(
            "{}?q={}&page={}&size={}",
            source.endpoint,
            urlencoding::encode(&source.query),
            page,
            source.page_size
        );
        let body = match fetch::get_text(client, &url).await {
            Ok(body) => body,
            Err(e) if page == 1 => return Err(e),
            Err(e) => {
                warn!(page, error = %e, "Search page fetch failed; stopping pagination");
                break;
            }
        };
        let response: SearchResponse = match serde_json::from_str(&body) {
            Ok(response) => response,
            Err(e) => {
                warn!(page, error = %e, "Search page was not valid JSON; stopping pagination");
                break;
            }
        };
        if response.results.is_empty() {
            debug!(page, "Search returned no more results");
            break;
        }
        out.extend(hits_to_candidates(response.results, now, source));
    }
    info!(count = out.len(), "Extracted search candidates");
    Ok(out)
}

/// Convert one page of hits, enforcing the freshness rules.
fn hits_to_candidates(
    hits: Vec<SearchHit>,
    now: DateTime<FixedOffset>,
    source: &SearchSourceConfig,
) -> Vec<RawCandidate> {
    let oldest = now - Duration::days(source.freshness_days);
    hits.into_iter()
        .filter_map(|hit| {
            if hit.title.trim().is_empty() || hit.url.trim().is_empty() {
                return None;
            }
            // No established freshness, no candidate.
            let published = hit
                .publish_time
                .as_deref()
                .and_then(|time| dates::resolve_relative(time, now))?;
            if published < oldest {
                return None;
            }
            Some(RawCandidate {
                title: hit.title.trim().to_string(),
                href: hit.url.trim().to_string(),
                context_text: hit.summary,
                explicit_time: Some(published.format("%Y-%m-%d").to_string()),
                source_tag: format!("新闻搜索-{}", source.query),
            })
        })
        .collect()
}
