//! MIIT home-page extractor.
//!
//! The ministry home page has no stable markup to select against, so this
//! extractor anchors on content instead: it looks for the fixed policy
//! section headings (最新政策, 政策文件, ...), walks up from each heading to
//! the closest container that actually holds a list of links, and harvests
//! those links. Decorative and navigation anchors are filtered out by the
//! shared builder gates later; only the obviously structural noise
//! (`javascript:` targets, anchors that repeat a heading) is dropped here.

use std::error::Error;

use itertools::Itertools;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};

use crate::config::HomeSourceConfig;
use crate::fetch;
use crate::models::RawCandidate;
use crate::urls::normalize;

/// Policy section headings searched on the home page. Fixed set.
const SECTION_KEYWORDS: [&str; 4] = ["最新政策", "政策文件", "文件公示", "意见征集"];

/// At most this many heading occurrences are followed per section.
const SECTION_NODE_CAP: usize = 3;

/// A container qualifies once it holds at least this many links.
const CONTAINER_MIN_LINKS: usize = 5;

/// How many levels the container walk may ascend.
const CONTAINER_ASCENT_CAP: usize = 4;

/// Per-section harvest cap.
const SECTION_LINK_CAP: usize = 20;

/// Fetch the home page and extract candidates.
#[instrument(level = "info", skip_all, fields(url = %source.url))]
pub async fn collect(
    client: &Client,
    source: &HomeSourceConfig,
) -> Result<Vec<RawCandidate>, Box<dyn Error>> {
    let html = fetch::get_text(client, &source.url).await?;
    let candidates = extract_candidates(&html, &source.url);
    info!(count = candidates.len(), "Extracted MIIT home-page candidates");
    Ok(candidates)
}

/// Pure extraction over already-fetched HTML.
pub fn extract_candidates(html: &str, base_url: &str) -> Vec<RawCandidate> {
    let document = Html::parse_document(html);
    let any_selector = Selector::parse("*").unwrap();
    let anchor_selector = Selector::parse("a[href]").unwrap();

    let mut out = Vec::new();
    for section in SECTION_KEYWORDS {
        let mut links: Vec<(String, String, String)> = Vec::new();

        let headings = document
            .select(&any_selector)
            .filter(|element| own_text_contains(element, section))
            .take(SECTION_NODE_CAP);

        for heading in headings {
            let container = closest_link_container(heading, &anchor_selector);
            for anchor in container.select(&anchor_selector) {
                let title = element_text(&anchor);
                let href = anchor.value().attr("href").unwrap_or_default();
                if title.is_empty() || SECTION_KEYWORDS.contains(&title.as_str()) {
                    continue;
                }
                if href.starts_with("javascript:") {
                    continue;
                }
                let full = normalize(base_url, href);
                let context = anchor
                    .parent()
                    .and_then(ElementRef::wrap)
                    .map(|parent| element_text(&parent))
                    .unwrap_or_default();
                links.push((title, full, context));
            }
        }

        let section_count = links.len();
        for (title, full, context) in links
            .into_iter()
            .unique_by(|(_, full, _)| full.clone())
            .take(SECTION_LINK_CAP)
        {
            out.push(RawCandidate {
                title,
                href: full,
                context_text: context,
                explicit_time: None,
                source_tag: format!("MIIT-首页-{section}"),
            });
        }
        debug!(section, harvested = section_count, "Section links collected");
    }
    out
}

/// Does the element's own text (not its descendants') mention `needle`?
fn own_text_contains(element: &ElementRef, needle: &str) -> bool {
    element
        .children()
        .filter_map(|child| child.value().as_text())
        .any(|text| text.contains(needle))
}

/// Walk upward from a heading element to the closest ancestor holding at
/// least [`CONTAINER_MIN_LINKS`] links, giving up after
/// [`CONTAINER_ASCENT_CAP`] levels and settling for the highest container
/// reached.
fn closest_link_container<'a>(
    start: ElementRef<'a>,
    anchor_selector: &Selector,
) -> ElementRef<'a> {
    let mut container = start;
    for _ in 0..CONTAINER_ASCENT_CAP {
        if container.select(anchor_selector).count() >= CONTAINER_MIN_LINKS {
            break;
        }
        match container.parent().and_then(ElementRef::wrap) {
            Some(parent) => container = parent,
            None => break,
        }
    }
    container
}

/// Element text joined on spaces, trimmed.
fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .join(" ")
}
