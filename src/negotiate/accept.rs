//! `Accept` / `Accept-Encoding` matching.
//!
//! Deliberately simple: the first media range that matches wins and
//! q-values are ignored along with every other parameter.

use crate::utils::mime;

/// Return the first range of `accept` matching `content_type`.
pub fn first_match<'h>(accept: &'h str, content_type: &str) -> Option<&'h str> {
    accept
        .split(',')
        .map(str::trim)
        .find(|range| range_matches(range, content_type))
}

/// Match one media range against a bare content type. `*` on either side
/// matches anything.
pub fn range_matches(range: &str, content_type: &str) -> bool {
    let essence = range.split(';').next().unwrap_or_default().trim();
    if essence.is_empty() {
        return false;
    }
    let (range_type, range_sub) = mime::split(essence);
    let (ty, sub) = mime::split(content_type);
    part_matches(range_type.trim(), ty) && part_matches(range_sub.trim(), sub)
}

fn part_matches(range: &str, actual: &str) -> bool {
    range == "*" || actual == "*" || range.eq_ignore_ascii_case(actual)
}

/// Whether the `Accept-Encoding` value lists `token`.
pub fn offers_encoding(accept_encoding: Option<&str>, token: &str) -> bool {
    accept_encoding.is_some_and(|header| {
        header.split(',').any(|item| {
            item.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .eq_ignore_ascii_case(token)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_matches() {
        assert!(range_matches("text/css", "text/css"));
        assert!(range_matches("text/*", "text/css"));
        assert!(range_matches("*/*", "image/png"));
        assert!(range_matches(" Text/CSS ;q=0.5", "text/css"));
        assert!(!range_matches("text/html", "text/css"));
        assert!(!range_matches("image/*", "text/css"));
        assert!(!range_matches("", "text/css"));
        assert!(!range_matches("text", "text/css"));
    }

    #[test]
    fn test_first_match_is_client_order() {
        assert_eq!(
            first_match("text/html, text/*;q=0.1, */*", "text/css"),
            Some("text/*;q=0.1")
        );
        // q=0 is not treated as a refusal
        assert_eq!(first_match("text/css;q=0", "text/css"), Some("text/css;q=0"));
        assert_eq!(first_match("image/png, text/html", "text/css"), None);
    }

    #[test]
    fn test_offers_encoding() {
        assert!(offers_encoding(Some("gzip, deflate, br"), "deflate"));
        assert!(offers_encoding(Some("GZIP;q=0.8"), "gzip"));
        assert!(!offers_encoding(Some("br"), "gzip"));
        assert!(!offers_encoding(Some("x-gzip"), "gzip"));
        assert!(!offers_encoding(None, "gzip"));
    }
}
