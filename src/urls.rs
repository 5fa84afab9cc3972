//! URL resolution and canonicalization.
//!
//! Two distinct jobs live here and must not be confused:
//! - [`normalize`] turns an extracted `href` (absolute, protocol-relative,
//!   root-relative, or plain relative) into an absolute URL.
//! - [`canonical_key`] maps an absolute URL to the identity used for
//!   intra-batch deduplication: scheme-insensitive, `www.`-insensitive,
//!   fragment-stripped, trailing-slash-normalized.
//!
//! The persisted store does NOT use canonical keys; it compares raw URL
//! strings. Both functions degrade gracefully on malformed input: they
//! return something usable and never fail.

use url::Url;

/// Resolve an extracted `href` against a base URL.
///
/// - Already has a scheme: returned as-is.
/// - Starts with `//`: `https:` is prefixed.
/// - Starts with `/`: joined to the base's scheme and host.
/// - Otherwise: slash-joined off the base. No `..`-segment resolution is
///   attempted; candidate links on the configured sources do not use it.
pub fn normalize(base: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{rest}");
    }
    if href.starts_with('/') {
        if let Ok(parsed) = Url::parse(base) {
            if let Some(host) = parsed.host_str() {
                let port = parsed
                    .port()
                    .map(|p| format!(":{p}"))
                    .unwrap_or_default();
                return format!("{}://{}{}{}", parsed.scheme(), host, port, href);
            }
        }
        return format!("{}{}", base.trim_end_matches('/'), href);
    }
    format!("{}/{}", base.trim_end_matches('/'), href)
}

/// Deduplication key for an absolute URL.
///
/// Lower-cases the host, strips one leading `www.`, drops the fragment and
/// the scheme, removes a single trailing slash unless the path is exactly
/// `/`, and keeps the query string verbatim. `http://WWW.Example.com/a/`
/// and `https://example.com/a` therefore share a key.
///
/// Malformed input comes back unchanged; canonicalization never raises.
pub fn canonical_key(url: &str) -> String {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return url.to_string(),
    };
    let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    let mut path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        path.pop();
    }

    let mut key = String::new();
    key.push_str(host);
    if let Some(port) = parsed.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }
    key.push_str(&path);
    if let Some(query) = parsed.query() {
        key.push('?');
        key.push_str(query);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_absolute_passthrough() {
        assert_eq!(
            normalize("https://example.com", "https://other.com/a"),
            "https://other.com/a"
        );
        assert_eq!(
            normalize("https://example.com", "http://other.com/a"),
            "http://other.com/a"
        );
    }

    #[test]
    fn test_normalize_protocol_relative() {
        assert_eq!(
            normalize("https://example.com", "//www.example.com/zfxxgk/a.html"),
            "https://www.example.com/zfxxgk/a.html"
        );
    }

    #[test]
    fn test_normalize_root_relative_joins_scheme_host() {
        assert_eq!(
            normalize("https://example.com/somewhere/deep/", "/zfxxgk/a.html"),
            "https://example.com/zfxxgk/a.html"
        );
    }

    #[test]
    fn test_normalize_plain_relative() {
        assert_eq!(
            normalize("https://example.com/", "zfxxgk/a.html"),
            "https://example.com/zfxxgk/a.html"
        );
        assert_eq!(
            normalize("https://example.com", "zfxxgk/a.html"),
            "https://example.com/zfxxgk/a.html"
        );
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(
            normalize("https://example.com", "  /a.html "),
            "https://example.com/a.html"
        );
    }

    #[test]
    fn test_canonical_key_scheme_and_www_insensitive() {
        assert_eq!(
            canonical_key("http://WWW.Example.com/a/"),
            canonical_key("https://example.com/a")
        );
        assert_eq!(canonical_key("https://example.com/a"), "example.com/a");
    }

    #[test]
    fn test_canonical_key_drops_fragment_keeps_query() {
        assert_eq!(
            canonical_key("https://example.com/a?id=3#section"),
            "example.com/a?id=3"
        );
    }

    #[test]
    fn test_canonical_key_root_path_keeps_slash() {
        assert_eq!(canonical_key("https://example.com/"), "example.com/");
    }

    #[test]
    fn test_canonical_key_strips_single_trailing_slash() {
        assert_eq!(canonical_key("https://example.com/a/b/"), "example.com/a/b");
    }

    #[test]
    fn test_canonical_key_keeps_port() {
        assert_eq!(
            canonical_key("http://example.com:8080/a"),
            "example.com:8080/a"
        );
    }

    #[test]
    fn test_canonical_key_malformed_unchanged() {
        assert_eq!(canonical_key("not a url"), "not a url");
        assert_eq!(canonical_key(""), "");
    }
}
