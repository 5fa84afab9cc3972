//! Source extractors for the configured policy-news outlets.
//!
//! Each extractor consumes fetched raw content plus its source configuration
//! and yields zero or more `RawCandidate`s. Site-structure knowledge lives
//! entirely here; extractors own no persisted state.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | MIIT home page | [`miit`] | HTML scraping | Links harvested near fixed section headings |
//! | Gov policy feed | [`govrss`] | RSS | First 50 entries, `pubDate`/`updated` |
//! | News search API | [`search`] | Paged JSON | Relative freshness; undatable results dropped |
//!
//! # Common Patterns
//!
//! Each module exports a `collect()` entry point returning candidates.
//! A failed source fetch is reported to the caller, which logs it and lets
//! the source contribute zero items; one dead source never aborts a run.

pub mod govrss;
pub mod miit;
pub mod search;
