//! Gov policy RSS extractor.
//!
//! The government "latest policy" feed (served via an RSSHub-style bridge)
//! is the easy source: entries already carry a title, an absolute link, and
//! usually an RFC 2822 `pubDate`. The timestamp string is passed through as
//! the candidate's explicit time; the shared date resolver deals with its
//! format.

use std::error::Error;

use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::config::RssSourceConfig;
use crate::fetch;
use crate::models::RawCandidate;

/// Only this many leading feed entries are considered.
const FEED_ENTRY_CAP: usize = 50;

const SOURCE_TAG: &str = "GOV-最新政策(RSSHub)";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<FeedItem>,
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    updated: Option<String>,
}

/// Fetch the feed and extract candidates.
#[instrument(level = "info", skip_all, fields(feed = %source.rss))]
pub async fn collect(
    client: &Client,
    source: &RssSourceConfig,
) -> Result<Vec<RawCandidate>, Box<dyn Error>> {
    let xml = fetch::get_text(client, &source.rss).await?;
    let candidates = parse_feed(&xml)?;
    info!(count = candidates.len(), "Extracted gov feed candidates");
    Ok(candidates)
}

/// Pure extraction over already-fetched feed XML.
fn parse_feed(xml: &str) -> Result<Vec<RawCandidate>, Box<dyn Error>> {
    let rss: Rss = quick_xml::de::from_str(xml)?;

    let mut out = Vec::new();
    for entry in rss.channel.items.into_iter().take(FEED_ENTRY_CAP) {
        let title = entry.title.as_deref().unwrap_or_default().trim().to_string();
        let link = entry.link.as_deref().unwrap_or_default().trim().to_string();
        if title.is_empty() || link.is_empty() {
            warn!("Feed entry without title or link; skipped");
            continue;
        }
        out.push(RawCandidate {
            title,
            href: link,
            context_text: String::new(),
            explicit_time: entry.pub_date.or(entry.updated),
            source_tag: SOURCE_TAG.to_string(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>最新政策</title>
    <link>https://www.gov.cn/zhengce/zuixin.htm</link>
    <item>
      <title>国务院关于促进政策落实的通知</title>
      <link>https://www.gov.cn/zhengce/content/202601/content_1.htm</link>
      <pubDate>Tue, 20 Jan 2026 10:00:00 +0800</pubDate>
    </item>
    <item>
      <title>关于征求产业政策意见的公告</title>
      <link>https://www.gov.cn/zhengce/content/202601/content_2.htm</link>
    </item>
    <item>
      <title></title>
      <link>https://www.gov.cn/zhengce/content/202601/content_3.htm</link>
    </item>
  </channel>
</rss>
"#;

    #[test]
    fn test_parse_feed_extracts_entries() {
        let candidates = parse_feed(FEED).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title, "国务院关于促进政策落实的通知");
        assert_eq!(
            candidates[0].href,
            "https://www.gov.cn/zhengce/content/202601/content_1.htm"
        );
        assert_eq!(candidates[0].source_tag, SOURCE_TAG);
    }

    #[test]
    fn test_parse_feed_passes_pub_date_through() {
        let candidates = parse_feed(FEED).unwrap();
        assert_eq!(
            candidates[0].explicit_time.as_deref(),
            Some("Tue, 20 Jan 2026 10:00:00 +0800")
        );
        // Second entry has no pubDate at all.
        assert!(candidates[1].explicit_time.is_none());
    }

    #[test]
    fn test_parse_feed_skips_titleless_entries() {
        let candidates = parse_feed(FEED).unwrap();
        assert!(candidates.iter().all(|c| !c.title.is_empty()));
    }

    #[test]
    fn test_parse_feed_malformed_is_error() {
        assert!(parse_feed("this is not xml").is_err());
    }

    #[test]
    fn test_parse_feed_empty_channel() {
        let xml = r#"<rss version="2.0"><channel><title>t</title></channel></rss>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }
}
