//! Asset pipeline error types.

use std::path::PathBuf;
use thiserror::Error;

use super::Encoding;

/// Failure raised by a minification transform.
#[derive(Debug, Clone, Error)]
#[error("{reason}")]
pub struct MinifyError {
    reason: String,
}

impl MinifyError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors of the asset pipeline.
///
/// Only `Root` and `Minify` abort binding; `Read` and `Compress` are logged
/// by their callers and contained.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("resource root `{0}` is not a readable directory")]
    Root(PathBuf, #[source] std::io::Error),

    #[error("failed to read `{0}`: {1}")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("failed to minify `{path}` ({content_type}): {source}")]
    Minify {
        path: PathBuf,
        content_type: &'static str,
        #[source]
        source: MinifyError,
    },

    #[error("failed to {encoding}-compress `{url}`: {source}")]
    Compress {
        url: String,
        encoding: Encoding,
        #[source]
        source: std::io::Error,
    },
}

impl AssetError {
    /// Whether this error must abort the bind phase.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Root(..) | Self::Minify { .. })
    }
}
