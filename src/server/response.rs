//! HTTP response writers.

use anyhow::{Result, anyhow};
use std::io::Cursor;
use tiny_http::{Header, Request, Response, StatusCode};

use crate::negotiate::{Representation, Validators, etag_header};
use crate::utils::mime::types::PLAIN;

/// 200 with the negotiated representation.
///
/// The body is read straight from the shared buffer.
pub fn representation(request: Request, repr: Representation) -> Result<()> {
    let mut headers = vec![make_header("Content-Type", repr.content_type)?];
    if let Some(encoding) = repr.encoding {
        headers.push(make_header("Content-Encoding", encoding.as_str())?);
    }
    push_validators(&mut headers, &repr.validators)?;

    let length = repr.body.len();
    let response = Response::new(
        StatusCode(200),
        headers,
        Cursor::new(repr.body),
        Some(length),
        None,
    );
    request.respond(response)?;
    Ok(())
}

/// 304 with validators and an empty body.
pub fn not_modified(request: Request, validators: &Validators) -> Result<()> {
    let mut headers = Vec::with_capacity(2);
    push_validators(&mut headers, validators)?;

    let mut response = Response::empty(StatusCode(304));
    for header in headers {
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}

/// Plain-text 404.
pub fn not_found(request: Request) -> Result<()> {
    let response = Response::from_data(b"404 Not Found".to_vec())
        .with_status_code(StatusCode(404))
        .with_header(make_header("Content-Type", PLAIN)?);
    request.respond(response)?;
    Ok(())
}

/// 503 for requests over the per-worker ceiling.
pub fn unavailable(request: Request) -> Result<()> {
    let response = Response::from_data(b"503 Service Unavailable".to_vec())
        .with_status_code(StatusCode(503))
        .with_header(make_header("Content-Type", PLAIN)?);
    request.respond(response)?;
    Ok(())
}

fn push_validators(headers: &mut Vec<Header>, validators: &Validators) -> Result<()> {
    if let Some(etag) = &validators.etag {
        headers.push(make_header("ETag", &etag_header(etag))?);
    }
    if let Some(last_modified) = &validators.last_modified {
        headers.push(make_header("Last-Modified", last_modified)?);
    }
    Ok(())
}

fn make_header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|()| anyhow!("invalid header value for {name}: {value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_header() {
        let header = make_header("ETag", "\"abc\"").unwrap();
        assert!(header.field.equiv("etag"));
        assert_eq!(header.value.as_str(), "\"abc\"");
    }

    #[test]
    fn test_make_header_rejects_non_ascii() {
        assert!(make_header("X-Name", "caf\u{e9}").is_err());
    }
}
