//! Publish-date resolution.
//!
//! Sources rarely agree on how they say when something was published: a list
//! page puts `2026-01-16` next to the link, an article page buries
//! `2026年1月16日` under a `发布时间` label, a feed carries an RFC 2822
//! timestamp, and a search API answers `3小时前`. This module turns all of
//! those into a plain calendar date, or into "unknown". It never returns an
//! error.
//!
//! # Strategy order
//!
//! 1. A fixed, ordered list of date patterns ([`resolve`]). The first
//!    pattern that matches anywhere in the text wins; a match with an
//!    out-of-range component fails the whole resolution rather than falling
//!    through.
//! 2. A permissive parse ladder for structured timestamp strings, accepted
//!    only when the year is plausible (≥ 2000).
//! 3. Label-adjacent search for article pages ([`resolve_near_labels`]) and
//!    a low-confidence URL-path fallback ([`resolve_from_url_path`]).
//! 4. A relative-time resolver for search-style sources
//!    ([`resolve_relative`]).

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::utils::civil_zone;

/// Fixed date patterns, in priority order. The order is part of the
/// contract: `2026-01-16` beats `2026年1月16日` beats `2026.01.16` when a
/// text contains more than one form.
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // 2026-01-16 / 2026/01/16
        Regex::new(r"(\d{4})[-/](\d{1,2})[-/](\d{1,2})").unwrap(),
        // 2026年1月16日
        Regex::new(r"(\d{4})\s*年\s*(\d{1,2})\s*月\s*(\d{1,2})\s*日").unwrap(),
        // 2026.01.16
        Regex::new(r"(\d{4})\.(\d{1,2})\.(\d{1,2})").unwrap(),
    ]
});

/// Path segments that encode year and month, e.g. `/2026/01/` or `/202601/`.
/// Path-encoded dates never carry a day.
static PATH_DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"/(20\d{2})/(\d{1,2})(?:/|$)").unwrap(),
        Regex::new(r"/(20\d{2})(\d{2})/").unwrap(),
    ]
});

/// Relative freshness, e.g. `5分钟前`, `3 小时前`, `2天前`.
static RELATIVE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s*(分钟|小时|天)前$").unwrap());

/// Label cues searched in priority order on article pages. Fixed set, not
/// configurable.
const CONTEXT_LABELS: [&str; 5] = ["发布时间", "发布日期", "日期", "时间", "来源"];

/// How many characters after a label are searched for a date.
const LABEL_WINDOW_CHARS: usize = 40;

/// Permissive datetime layouts tried after the RFC parsers.
const PERMISSIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Permissive date-only layouts.
const PERMISSIVE_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d %b %Y", "%B %d, %Y"];

/// Resolve a calendar date from free text.
///
/// Applies the fixed patterns in priority order; the first match anywhere in
/// the text decides the outcome. If a matched component is out of range
/// (month 13, day 0, ...) the whole resolution is "unknown"; later
/// patterns do not get a second chance. Only when no fixed pattern matches
/// at all is the permissive ladder consulted.
pub fn resolve(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    for pattern in DATE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            let year: i32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            let day: u32 = caps[3].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }
    }
    parse_permissive(text).map(|dt| dt.date_naive())
}

/// Resolve a date from an article page, preferring dates that sit next to a
/// publication label over dates that merely appear first.
///
/// Searches a bounded window after each occurrence of each label cue, in
/// label priority order; falls back to [`resolve`] over the whole text.
pub fn resolve_near_labels(text: &str) -> Option<NaiveDate> {
    for label in CONTEXT_LABELS {
        for (pos, _) in text.match_indices(label) {
            let window: String = text[pos + label.len()..]
                .chars()
                .take(LABEL_WINDOW_CHARS)
                .collect();
            if let Some(date) = fixed_pattern_date(&window) {
                return Some(date);
            }
        }
    }
    resolve(text)
}

/// Synthesize a date from a year/month-encoded URL path, day pinned to `01`.
///
/// This is the weakest strategy: it only runs when no textual date was
/// found, and the result is always the first of the month.
pub fn resolve_from_url_path(url: &str) -> Option<NaiveDate> {
    let parsed = Url::parse(url).ok();
    let path = parsed.as_ref().map(|u| u.path()).unwrap_or(url);
    for pattern in PATH_DATE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(path) {
            let year: i32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, 1);
        }
    }
    None
}

/// Resolve a search-API freshness string relative to `now`.
///
/// Recognizes exactly the suffixes 分钟前 / 小时前 / 天前; anything else is
/// handed to the permissive absolute parser with the result normalized to
/// the fixed UTC+8 civil zone. Unparseable text yields `None`, and callers
/// on the search path drop such items outright.
pub fn resolve_relative(text: &str, now: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    let trimmed = text.trim();
    if let Some(caps) = RELATIVE_PATTERN.captures(trimmed) {
        let amount: i64 = caps[1].parse().ok()?;
        let delta = match &caps[2] {
            "分钟" => Duration::minutes(amount),
            "小时" => Duration::hours(amount),
            _ => Duration::days(amount),
        };
        return Some(now - delta);
    }
    parse_permissive(trimmed).map(|dt| dt.with_timezone(&civil_zone()))
}

/// First fixed-pattern date in `text`, treating an out-of-range match as no
/// match. Used for label windows, where a bad hit just means trying the
/// next label occurrence.
fn fixed_pattern_date(text: &str) -> Option<NaiveDate> {
    for pattern in DATE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            let year: i32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            let day: u32 = caps[3].parse().ok()?;
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }
    }
    None
}

/// Permissive absolute parse ladder: RFC 2822 (feed `pubDate`), RFC 3339,
/// then a fixed list of common layouts. A parse only counts when the year
/// is ≥ 2000, which keeps the ladder from inventing a date out of a small
/// unrelated number. Time-of-day, if present, is carried through so the
/// relative resolver can compare against a freshness window; [`resolve`]
/// discards it.
fn parse_permissive(text: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return accept_year(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return accept_year(dt);
    }
    for fmt in PERMISSIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return accept_year(naive.and_local_timezone(civil_zone()).single()?);
        }
    }
    for fmt in PERMISSIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return accept_year(naive.and_local_timezone(civil_zone()).single()?);
        }
    }
    None
}

fn accept_year(dt: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    (dt.year() >= 2000).then_some(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now_fixed() -> DateTime<FixedOffset> {
        civil_zone().with_ymd_and_hms(2026, 1, 21, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_resolve_dash_form() {
        assert_eq!(resolve("发布于 2026-01-16 的通知"), Some(date(2026, 1, 16)));
    }

    #[test]
    fn test_resolve_slash_form() {
        assert_eq!(resolve("更新 2026/1/6"), Some(date(2026, 1, 6)));
    }

    #[test]
    fn test_resolve_cjk_form() {
        assert_eq!(resolve("2026年1月16日发布"), Some(date(2026, 1, 16)));
        assert_eq!(resolve("2026 年 1 月 6 日"), Some(date(2026, 1, 6)));
    }

    #[test]
    fn test_resolve_dot_form() {
        assert_eq!(resolve("［2026.01.16］"), Some(date(2026, 1, 16)));
    }

    #[test]
    fn test_resolve_zero_pads_single_digits() {
        let d = resolve("2026/1/6").unwrap();
        assert_eq!(d.format("%Y-%m-%d").to_string(), "2026-01-06");
    }

    #[test]
    fn test_pattern_priority_dash_beats_cjk() {
        // Both forms present: the dash/slash pattern is consulted first.
        let text = "2026年2月2日 … 2026-01-16";
        assert_eq!(resolve(text), Some(date(2026, 1, 16)));
    }

    #[test]
    fn test_pattern_priority_cjk_beats_dot() {
        let text = "2026.03.03 … 2026年2月2日";
        assert_eq!(resolve(text), Some(date(2026, 2, 2)));
    }

    #[test]
    fn test_out_of_range_fails_whole_resolution() {
        // Month 13 matched by the first pattern: no fall-through to the
        // CJK form that would otherwise resolve.
        assert_eq!(resolve("编号2026-13-01，见2026年1月5日公告"), None);
    }

    #[test]
    fn test_resolve_empty_and_dateless() {
        assert_eq!(resolve(""), None);
        assert_eq!(resolve("关于进一步做好有关工作的通知"), None);
    }

    #[test]
    fn test_permissive_rfc2822() {
        assert_eq!(
            resolve("Tue, 20 Jan 2026 10:00:00 +0800"),
            Some(date(2026, 1, 20))
        );
        assert_eq!(
            resolve("Tue, 20 Jan 2026 22:00:00 GMT"),
            Some(date(2026, 1, 20))
        );
    }

    #[test]
    fn test_permissive_rejects_pre_2000_years() {
        // A parser must not invent a date from a small unrelated number.
        assert_eq!(resolve("Mon, 3 Feb 0099 00:00:00 +0000"), None);
    }

    #[test]
    fn test_permissive_named_month() {
        assert_eq!(resolve("20 Jan 2026"), Some(date(2026, 1, 20)));
    }

    #[test]
    fn test_resolve_near_labels_prefers_label_over_position() {
        // An unrelated date appears first, but the one next to 发布时间 wins.
        let text = "更新提示 2026-01-01 … 发布时间：2026-01-16 … 页脚 2025-12-31";
        assert_eq!(resolve_near_labels(text), Some(date(2026, 1, 16)));
    }

    #[test]
    fn test_resolve_near_labels_label_priority() {
        let text = "来源：新华社 2026-01-02 … 发布日期 2026-01-16";
        // 发布日期 outranks 来源 regardless of position.
        assert_eq!(resolve_near_labels(text), Some(date(2026, 1, 16)));
    }

    #[test]
    fn test_resolve_near_labels_falls_back_to_first_date() {
        let text = "摘要 2026-01-10 正文";
        assert_eq!(resolve_near_labels(text), Some(date(2026, 1, 10)));
    }

    #[test]
    fn test_resolve_near_labels_unknown() {
        assert_eq!(resolve_near_labels("发布时间：稍后公布"), None);
    }

    #[test]
    fn test_url_path_slash_form() {
        assert_eq!(
            resolve_from_url_path("https://example.com/zcwj/2026/01/a.html"),
            Some(date(2026, 1, 1))
        );
    }

    #[test]
    fn test_url_path_compact_form() {
        assert_eq!(
            resolve_from_url_path("https://example.com/art/202601/c_123.htm"),
            Some(date(2026, 1, 1))
        );
    }

    #[test]
    fn test_url_path_day_always_first_of_month() {
        let d = resolve_from_url_path("https://example.com/2026/3/detail").unwrap();
        assert_eq!(d, date(2026, 3, 1));
    }

    #[test]
    fn test_url_path_no_date() {
        assert_eq!(resolve_from_url_path("https://example.com/zfxxgk/a.html"), None);
        assert_eq!(resolve_from_url_path("not a url at all"), None);
    }

    #[test]
    fn test_relative_minutes_hours_days() {
        let now = now_fixed();
        assert_eq!(
            resolve_relative("30分钟前", now),
            Some(now - Duration::minutes(30))
        );
        assert_eq!(
            resolve_relative("5 小时前", now),
            Some(now - Duration::hours(5))
        );
        assert_eq!(resolve_relative("3天前", now), Some(now - Duration::days(3)));
    }

    #[test]
    fn test_relative_falls_back_to_absolute_in_civil_zone() {
        let now = now_fixed();
        let resolved = resolve_relative("2026-01-20 10:30", now).unwrap();
        assert_eq!(resolved.date_naive(), date(2026, 1, 20));
        assert_eq!(resolved.offset().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn test_relative_unparseable_is_unknown() {
        assert_eq!(resolve_relative("刚刚", now_fixed()), None);
        assert_eq!(resolve_relative("", now_fixed()), None);
    }
}
