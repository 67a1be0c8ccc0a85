//! Request-time content negotiation for static assets.
//!
//! ```text
//! GET + prefix + Accept ──► debug?  ── yes ─► DebugBypass (re-read every time)
//!                              │
//!                              no
//!                              ▼
//!                       registry lookup ─► first matching Accept range
//!                              │                     │
//!                         miss: fall through    freshness ─► 304
//!                                                    │
//!                                              deflate > gzip > identity
//! ```
//!
//! Anything the engine does not claim falls through to the application.

mod accept;
mod debug;
mod freshness;

use std::sync::Arc;

pub use accept::{first_match, offers_encoding};
pub use debug::DebugBypass;
pub use freshness::{etag_header, is_modified};

use crate::asset::{AssetRegistry, Encoding};
use crate::utils::path::request_path;

/// Request view consumed by the engine. All headers are raw values.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticRequest<'a> {
    pub method: &'a str,
    /// Request target as received (may carry a query, percent-encoded).
    pub path: &'a str,
    pub accept: Option<&'a str>,
    pub accept_encoding: Option<&'a str>,
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
}

impl<'a> StaticRequest<'a> {
    pub fn get(path: &'a str) -> Self {
        Self {
            method: "GET",
            path,
            ..Self::default()
        }
    }

    pub fn accept(mut self, value: &'a str) -> Self {
        self.accept = Some(value);
        self
    }

    pub fn accept_encoding(mut self, value: &'a str) -> Self {
        self.accept_encoding = Some(value);
        self
    }

    pub fn if_none_match(mut self, value: &'a str) -> Self {
        self.if_none_match = Some(value);
        self
    }

    pub fn if_modified_since(mut self, value: &'a str) -> Self {
        self.if_modified_since = Some(value);
        self
    }
}

/// Cache validators sent with 200 and 304 responses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validators {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

/// Selected representation of an asset.
#[derive(Debug, Clone)]
pub struct Representation {
    pub body: Arc<[u8]>,
    pub content_type: &'static str,
    /// `None` for identity.
    pub encoding: Option<Encoding>,
    pub validators: Validators,
}

/// Result of negotiating one request.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Not a static request; hand it to the application.
    FallThrough,
    NotFound,
    NotModified(Validators),
    Ok(Representation),
}

enum Mode {
    Cached(AssetRegistry),
    Debug(DebugBypass),
}

/// Static request interceptor for one bind prefix.
pub struct Negotiator {
    prefix: String,
    mode: Mode,
}

impl Negotiator {
    /// Serve from a prebuilt registry.
    pub fn cached(registry: AssetRegistry) -> Self {
        Self {
            prefix: registry.prefix().to_owned(),
            mode: Mode::Cached(registry),
        }
    }

    /// Serve straight from disk on every request.
    pub fn debug(prefix: impl Into<String>, bypass: DebugBypass) -> Self {
        Self {
            prefix: prefix.into(),
            mode: Mode::Debug(bypass),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The registry backing cached mode.
    pub fn registry(&self) -> Option<&AssetRegistry> {
        match &self.mode {
            Mode::Cached(registry) => Some(registry),
            Mode::Debug(_) => None,
        }
    }

    pub fn negotiate(&self, req: &StaticRequest<'_>) -> Outcome {
        if req.method != "GET" {
            return Outcome::FallThrough;
        }
        let path = request_path(req.path);
        let Some(remainder) = path.strip_prefix(self.prefix.as_str()) else {
            return Outcome::FallThrough;
        };
        let Some(accept) = req.accept else {
            return Outcome::FallThrough;
        };

        let registry = match &self.mode {
            // `/staticx.css` is not below `/static`
            Mode::Debug(_) if !remainder.is_empty() && !remainder.starts_with('/') => {
                return Outcome::NotFound;
            }
            Mode::Debug(bypass) => return bypass.serve(remainder),
            Mode::Cached(registry) => registry,
        };
        let Some(record) = registry.get(&path) else {
            return Outcome::FallThrough;
        };
        if first_match(accept, record.content_type()).is_none() {
            return Outcome::FallThrough;
        }

        let validators = Validators {
            etag: record.etag().map(str::to_owned),
            last_modified: Some(record.last_modified().to_owned()),
        };
        if !is_modified(
            req.if_none_match,
            req.if_modified_since,
            record.etag(),
            Some(record.last_modified()),
        ) {
            return Outcome::NotModified(validators);
        }

        let compressed = Encoding::PREFERENCE.into_iter().find_map(|encoding| {
            if !offers_encoding(req.accept_encoding, encoding.as_str()) {
                return None;
            }
            record.variant(encoding).map(|body| (encoding, body))
        });
        let (encoding, body) = match compressed {
            Some((encoding, body)) => (Some(encoding), Arc::clone(body)),
            None => (None, Arc::clone(record.content())),
        };

        Outcome::Ok(Representation {
            body,
            content_type: record.content_type(),
            encoding,
            validators,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetScanner, CompressionPrecomputer, MinifierRegistry};
    use crate::utils::mime::types;
    use flate2::read::GzDecoder;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;

    const STYLE: &str = "body {\n  color: red;\n}\n";

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("style.css"), STYLE).unwrap();
        fs::create_dir(dir.path().join("js")).unwrap();
        fs::write(dir.path().join("js/app.js"), "var greeting = 'hello';\n").unwrap();
        dir
    }

    fn cached(dir: &TempDir, compress: bool) -> Negotiator {
        let minifiers = MinifierRegistry::with_defaults();
        let registry = AssetScanner::new(dir.path(), "/static", &minifiers)
            .scan()
            .unwrap();
        if compress {
            CompressionPrecomputer::default().precompute(&registry).wait();
        }
        Negotiator::cached(registry)
    }

    fn expect_ok(outcome: Outcome) -> Representation {
        match outcome {
            Outcome::Ok(repr) => repr,
            other => panic!("expected 200, got {other:?}"),
        }
    }

    #[test]
    fn test_scenario_gzip_after_precompute() {
        let dir = site();
        let negotiator = cached(&dir, true);
        let req = StaticRequest::get("/static/style.css")
            .accept("text/*")
            .accept_encoding("gzip");

        let repr = expect_ok(negotiator.negotiate(&req));
        assert_eq!(repr.content_type, types::CSS);
        assert_eq!(repr.encoding, Some(Encoding::Gzip));

        let mut body = String::new();
        GzDecoder::new(&repr.body[..]).read_to_string(&mut body).unwrap();
        assert_eq!(body, "body{color:red}");
        assert!(repr.validators.etag.is_some());
        assert!(repr.validators.last_modified.is_some());
    }

    #[test]
    fn test_scenario_identity_before_precompute() {
        let dir = site();
        let negotiator = cached(&dir, false);
        let req = StaticRequest::get("/static/style.css")
            .accept("text/*")
            .accept_encoding("gzip");

        let repr = expect_ok(negotiator.negotiate(&req));
        assert_eq!(repr.encoding, None);
        assert_eq!(&repr.body[..], b"body{color:red}");
    }

    #[test]
    fn test_deflate_preferred_over_gzip() {
        let dir = site();
        let negotiator = cached(&dir, true);
        let req = StaticRequest::get("/static/style.css")
            .accept("*/*")
            .accept_encoding("gzip, deflate");

        let repr = expect_ok(negotiator.negotiate(&req));
        assert_eq!(repr.encoding, Some(Encoding::Deflate));
        let record = negotiator.registry().unwrap().get("/static/style.css").unwrap();
        assert_eq!(repr.body, *record.deflate().unwrap());
    }

    #[test]
    fn test_matching_validators_yield_not_modified() {
        let dir = site();
        let negotiator = cached(&dir, false);
        let record = negotiator.registry().unwrap().get("/static/style.css").unwrap();
        let etag = etag_header(record.etag().unwrap());
        let last_modified = record.last_modified().to_owned();

        let by_etag = StaticRequest::get("/static/style.css")
            .accept("text/css")
            .if_none_match(&etag);
        match negotiator.negotiate(&by_etag) {
            Outcome::NotModified(validators) => {
                assert_eq!(validators.etag.as_deref(), record.etag());
                assert_eq!(validators.last_modified.as_deref(), Some(last_modified.as_str()));
            }
            other => panic!("expected 304, got {other:?}"),
        }

        let by_date = StaticRequest::get("/static/style.css")
            .accept("text/css")
            .if_modified_since(&last_modified);
        assert!(matches!(negotiator.negotiate(&by_date), Outcome::NotModified(_)));
    }

    #[test]
    fn test_stale_validators_yield_body() {
        let dir = site();
        let negotiator = cached(&dir, false);
        let req = StaticRequest::get("/static/style.css")
            .accept("text/css")
            .if_none_match("\"outdated\"")
            .if_modified_since("Sun, 06 Nov 1994 08:49:37 GMT");

        let repr = expect_ok(negotiator.negotiate(&req));
        assert!(!repr.body.is_empty());
    }

    #[test]
    fn test_unmatched_accept_falls_through() {
        let dir = site();
        let negotiator = cached(&dir, false);
        let req = StaticRequest::get("/static/style.css").accept("image/*, application/json");
        assert!(matches!(negotiator.negotiate(&req), Outcome::FallThrough));
    }

    #[test]
    fn test_first_range_wins_regardless_of_q() {
        let dir = site();
        let negotiator = cached(&dir, false);
        let req = StaticRequest::get("/static/js/app.js").accept("image/png, */*;q=0.01");
        let repr = expect_ok(negotiator.negotiate(&req));
        assert_eq!(repr.content_type, types::JAVASCRIPT);
    }

    #[test]
    fn test_non_static_requests_fall_through() {
        let dir = site();
        let negotiator = cached(&dir, false);

        let missing_accept = StaticRequest::get("/static/style.css");
        let post = StaticRequest {
            method: "POST",
            ..StaticRequest::get("/static/style.css").accept("*/*")
        };
        let outside = StaticRequest::get("/api/style.css").accept("*/*");
        let unknown = StaticRequest::get("/static/nope.css").accept("*/*");

        for req in [missing_accept, post, outside, unknown] {
            assert!(
                matches!(negotiator.negotiate(&req), Outcome::FallThrough),
                "{req:?}"
            );
        }
    }

    #[test]
    fn test_query_and_escapes_are_normalized() {
        let dir = site();
        fs::write(dir.path().join("my file.txt"), "spaced").unwrap();
        let negotiator = cached(&dir, false);

        let query = StaticRequest::get("/static/style.css?v=42").accept("text/css");
        assert!(matches!(negotiator.negotiate(&query), Outcome::Ok(_)));

        let escaped = StaticRequest::get("/static/my%20file.txt").accept("text/plain");
        assert_eq!(&expect_ok(negotiator.negotiate(&escaped)).body[..], b"spaced");
    }

    #[test]
    fn test_scenario_debug_reflects_edits() {
        let dir = site();
        let bypass = DebugBypass::new(dir.path(), MinifierRegistry::with_defaults());
        let negotiator = Negotiator::debug("/static", bypass);
        assert!(negotiator.registry().is_none());

        let req = StaticRequest::get("/static/style.css").accept("text/css");
        let first = expect_ok(negotiator.negotiate(&req));
        assert_eq!(&first.body[..], b"body{color:red}");
        assert_eq!(first.validators, Validators::default());
        assert_eq!(first.encoding, None);

        fs::write(dir.path().join("style.css"), "p {\n  margin: 0;\n}\n").unwrap();
        let second = expect_ok(negotiator.negotiate(&req));
        assert_eq!(&second.body[..], b"p{margin:0}");
        assert!(second.validators.etag.is_none());
    }

    #[test]
    fn test_debug_not_found_and_traversal() {
        let dir = site();
        let bypass = DebugBypass::new(dir.path().join("js"), MinifierRegistry::empty());
        let negotiator = Negotiator::debug("/static", bypass);

        let missing = StaticRequest::get("/static/missing.js").accept("*/*");
        assert!(matches!(negotiator.negotiate(&missing), Outcome::NotFound));

        let escape = StaticRequest::get("/static/../style.css").accept("*/*");
        assert!(matches!(negotiator.negotiate(&escape), Outcome::NotFound));

        let encoded = StaticRequest::get("/static/%2e%2e/style.css").accept("*/*");
        assert!(matches!(negotiator.negotiate(&encoded), Outcome::NotFound));
    }

    #[test]
    fn test_debug_requires_segment_boundary_after_prefix() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("x.css"), "a{}").unwrap();
        let bypass = DebugBypass::new(dir.path(), MinifierRegistry::empty());
        let negotiator = Negotiator::debug("/static", bypass);

        let glued = StaticRequest::get("/staticx.css").accept("*/*");
        assert!(matches!(negotiator.negotiate(&glued), Outcome::NotFound));

        let bare = StaticRequest::get("/static").accept("*/*");
        assert!(matches!(negotiator.negotiate(&bare), Outcome::NotFound));

        let below = StaticRequest::get("/static/x.css").accept("*/*");
        assert_eq!(&expect_ok(negotiator.negotiate(&below)).body[..], b"a{}");
    }

    #[test]
    fn test_debug_serves_source_when_minify_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.js"), "function (").unwrap();
        let bypass = DebugBypass::new(dir.path(), MinifierRegistry::with_defaults());
        let negotiator = Negotiator::debug("/static", bypass);

        let req = StaticRequest::get("/static/broken.js").accept("*/*");
        assert_eq!(&expect_ok(negotiator.negotiate(&req)).body[..], b"function (");
    }
}
