//! Header extraction from tiny_http requests.

use tiny_http::Request;

use crate::negotiate::StaticRequest;

/// Owned copy of the headers the negotiation engine reads.
#[derive(Debug, Default)]
pub struct RequestHeaders {
    accept: Option<String>,
    accept_encoding: Option<String>,
    if_none_match: Option<String>,
    if_modified_since: Option<String>,
}

impl RequestHeaders {
    /// Collect the headers of `request`. Repeated headers are joined with
    /// `, `, which is equivalent for list-valued fields.
    pub fn from_request(request: &Request) -> Self {
        let mut headers = Self::default();
        for header in request.headers() {
            let field = header.field.as_str().as_str();
            let slot = if field.eq_ignore_ascii_case("accept") {
                &mut headers.accept
            } else if field.eq_ignore_ascii_case("accept-encoding") {
                &mut headers.accept_encoding
            } else if field.eq_ignore_ascii_case("if-none-match") {
                &mut headers.if_none_match
            } else if field.eq_ignore_ascii_case("if-modified-since") {
                &mut headers.if_modified_since
            } else {
                continue;
            };
            append(slot, header.value.as_str());
        }
        headers
    }

    /// Borrow as the engine's request view.
    pub fn view<'a>(&'a self, method: &'a str, url: &'a str) -> StaticRequest<'a> {
        StaticRequest {
            method,
            path: url,
            accept: self.accept.as_deref(),
            accept_encoding: self.accept_encoding.as_deref(),
            if_none_match: self.if_none_match.as_deref(),
            if_modified_since: self.if_modified_since.as_deref(),
        }
    }
}

fn append(slot: &mut Option<String>, value: &str) {
    match slot {
        Some(existing) => {
            existing.push_str(", ");
            existing.push_str(value);
        }
        None => *slot = Some(value.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_joins_repeated_values() {
        let mut slot = None;
        append(&mut slot, "text/html");
        append(&mut slot, "text/*;q=0.5");
        assert_eq!(slot.as_deref(), Some("text/html, text/*;q=0.5"));
    }

    #[test]
    fn test_view_borrows_fields() {
        let headers = RequestHeaders {
            accept: Some("*/*".into()),
            if_none_match: Some("\"abc\"".into()),
            ..RequestHeaders::default()
        };
        let view = headers.view("GET", "/static/a.css");
        assert_eq!(view.method, "GET");
        assert_eq!(view.path, "/static/a.css");
        assert_eq!(view.accept, Some("*/*"));
        assert_eq!(view.accept_encoding, None);
        assert_eq!(view.if_none_match, Some("\"abc\""));
    }
}
