//! Typed run configuration loaded from a YAML file.
//!
//! The configuration names the sources to harvest, the keyword and
//! time-window acceptance policy, and the output locations. Sources are
//! optional as a whole, but a source section that is present must carry its
//! required keys: a missing key is a fatal error at load time, before any
//! network activity, since the pipeline assumes required keys exist.
//!
//! # Example
//!
//! ```yaml
//! keywords: [政策, 通知]
//! window_days: 7
//! hard_cap_days: 14
//! output:
//!   csv_path: data/policy_news.csv
//! sources:
//!   miit_home:
//!     url: https://www.miit.gov.cn/
//!     name: 工业和信息化部
//! ```

use serde::Deserialize;
use std::error::Error;
use std::path::Path;

/// Top-level run configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Title must contain at least one of these (case-insensitive) to pass.
    pub keywords: Vec<String>,
    /// Advisory freshness window in days. Currently not enforced for
    /// home-page/RSS sources; only the hard cap rejects.
    pub window_days: i64,
    /// Absolute oldest a dated item may be, in days.
    pub hard_cap_days: i64,
    /// Fetch article pages to back-fill missing publish dates.
    #[serde(default = "default_resolve_pub_date")]
    pub resolve_pub_date: bool,
    /// Upper bound on article-page fetches per run.
    #[serde(default = "default_resolve_pub_date_cap")]
    pub resolve_pub_date_cap: usize,
    /// Output locations.
    pub output: OutputConfig,
    /// Source sections; each one optional.
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// Where the merged table and the run summary land.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the CSV store; rewritten whole every run.
    pub csv_path: String,
    /// Path of the added-count side file.
    #[serde(default = "default_added_count_path")]
    pub added_count_path: String,
}

/// The set of configured sources. Absent sections are skipped silently.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesConfig {
    pub miit_home: Option<HomeSourceConfig>,
    pub gov_policy_rss: Option<RssSourceConfig>,
    pub news_search: Option<SearchSourceConfig>,
}

/// A home-page source scraped from HTML.
#[derive(Debug, Clone, Deserialize)]
pub struct HomeSourceConfig {
    /// Base URL of the home page.
    pub url: String,
    /// Display name, used as the Item publisher.
    pub name: String,
    /// Minimum title length in characters; shorter links are navigation
    /// noise and are dropped.
    #[serde(default = "default_min_title_len")]
    pub min_title_len: usize,
}

/// An RSS/Atom-backed source.
#[derive(Debug, Clone, Deserialize)]
pub struct RssSourceConfig {
    /// Feed endpoint.
    pub rss: String,
    /// Display name, used as the Item publisher.
    pub name: String,
}

/// A search-API source returning paged JSON results.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSourceConfig {
    /// Search endpoint; query parameters are appended.
    pub endpoint: String,
    /// Display name, used as the Item publisher.
    pub name: String,
    /// Query string sent to the endpoint.
    pub query: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    /// Results older than this many days are dropped at extraction time.
    #[serde(default = "default_freshness_days")]
    pub freshness_days: i64,
}

fn default_resolve_pub_date() -> bool {
    true
}

fn default_resolve_pub_date_cap() -> usize {
    60
}

fn default_added_count_path() -> String {
    "added_count.txt".to_string()
}

fn default_min_title_len() -> usize {
    6
}

fn default_page_size() -> usize {
    10
}

fn default_max_pages() -> usize {
    1
}

fn default_freshness_days() -> i64 {
    7
}

/// Load and validate the run configuration.
///
/// # Errors
///
/// Fails if the file cannot be read or if a present section is missing a
/// required key. Both are fatal: the run must abort before touching the
/// network.
pub fn load_config(path: &Path) -> Result<Config, Box<dyn Error>> {
    let raw = std::fs::read_to_string(path)?;
    let config: Config = serde_yaml::from_str(&raw)?;
    Ok(config)
}
