//! Conditional request evaluation (`If-None-Match` / `If-Modified-Since`).

/// Whether the client copy described by the validators is stale.
///
/// `If-None-Match` takes precedence; `If-Modified-Since` is only consulted
/// when it is absent. Without either header the resource counts as modified.
pub fn is_modified(
    if_none_match: Option<&str>,
    if_modified_since: Option<&str>,
    etag: Option<&str>,
    last_modified: Option<&str>,
) -> bool {
    if let Some(header) = if_none_match {
        return !header.split(',').any(|tag| {
            let tag = opaque_tag(tag);
            tag == "*" || etag.is_some_and(|etag| tag == etag)
        });
    }

    if let Some(since) = if_modified_since
        && let Some(last_modified) = last_modified
    {
        if since.trim() == last_modified {
            return false;
        }
        if let (Ok(since), Ok(modified)) = (
            httpdate::parse_http_date(since.trim()),
            httpdate::parse_http_date(last_modified),
        ) {
            return since < modified;
        }
    }

    true
}

/// Strip whitespace, the weak marker and quotes from one entity tag.
fn opaque_tag(tag: &str) -> &str {
    let tag = tag.trim();
    tag.strip_prefix("W/").unwrap_or(tag).trim_matches('"')
}

/// Quoted `ETag` header value for a digest.
pub fn etag_header(etag: &str) -> String {
    format!("\"{etag}\"")
}
