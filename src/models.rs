//! Data models for harvested policy-news records.
//!
//! This module defines the two record shapes that flow through the pipeline:
//! - [`RawCandidate`]: a link/title/date-text tuple pulled out of a fetched
//!   page or feed by a source extractor
//! - [`Item`]: the normalized record that survives filtering and ends up in
//!   the persisted store
//!
//! Candidates are ephemeral and owned by the extraction step that produced
//! them; Items carry the fixed store columns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A raw candidate link as extracted from a source, before normalization.
///
/// Candidates are produced in page order, which matters: when two candidates
/// later collapse onto the same canonical URL, the first-seen one anchors the
/// surviving record.
///
/// # Fields
///
/// * `title` - The anchor/entry text as found in the source
/// * `href` - Absolute or relative link target
/// * `context_text` - Text surrounding the link, mined for a publish date
/// * `explicit_time` - A source-provided timestamp string, when the source
///   has one (feed `pubDate`, search-API publish time)
/// * `source_tag` - Human-readable provenance label
#[derive(Debug, Clone)]
pub struct RawCandidate {
    /// The link text as found in the source.
    pub title: String,
    /// Absolute or relative link target.
    pub href: String,
    /// Nearby text used for date mining; may be empty.
    pub context_text: String,
    /// Structured timestamp string provided by the source, if any.
    pub explicit_time: Option<String>,
    /// Provenance label, e.g. `MIIT-首页-政策文件`.
    pub source_tag: String,
}

/// One normalized policy-news record.
///
/// This is the unit that is deduplicated, merged against the persisted store,
/// and written out as a CSV row. `url` is the persisted identity; the
/// intra-batch deduplicator instead compares canonical keys (see the `urls`
/// module), which is a deliberately different, looser identity.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Item {
    /// Trimmed, non-empty headline.
    pub title: String,
    /// Organizational name configured for the source.
    pub publisher: String,
    /// Absolute URL; never empty.
    pub url: String,
    /// Resolved calendar date, when one could be established.
    pub pub_date: Option<NaiveDate>,
    /// Provenance tag, possibly with a sub-tag suffix.
    pub source: String,
    /// Capture time in the fixed UTC+8 civil zone, ISO-8601 with offset.
    pub fetched_at: String,
}
