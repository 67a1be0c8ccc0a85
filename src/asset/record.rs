//! One registered static file.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use super::{AssetError, Encoding, MinifierRegistry};
use crate::utils::{hash, mime};

/// Whether records carry a content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hashing {
    Enabled,
    Disabled,
}

/// Immutable content of one asset plus its lazily published variants.
///
/// `content` and the validators are fixed at construction. The compressed
/// slots go from empty to filled at most once and are never reset.
pub struct AssetRecord {
    content: Arc<[u8]>,
    gzip: OnceLock<Arc<[u8]>>,
    deflate: OnceLock<Arc<[u8]>>,
    etag: Option<String>,
    last_modified: String,
    content_type: &'static str,
}

impl AssetRecord {
    /// Read, minify and hash the file at `path`.
    ///
    /// Returns `Ok(None)` when the path vanished or is no longer a regular
    /// file by the time it is read.
    pub fn load(
        path: &Path,
        minifiers: &MinifierRegistry,
        hashing: Hashing,
    ) -> Result<Option<Self>, AssetError> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AssetError::Read(path.to_path_buf(), e)),
        };
        if !metadata.is_file() {
            return Ok(None);
        }

        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AssetError::Read(path.to_path_buf(), e)),
        };
        let modified = metadata
            .modified()
            .map_err(|e| AssetError::Read(path.to_path_buf(), e))?;

        let content_type = mime::from_path(path);
        let content = minifiers
            .apply(content_type, raw)
            .map_err(|source| AssetError::Minify {
                path: path.to_path_buf(),
                content_type,
                source,
            })?;

        Ok(Some(Self::new(
            content,
            content_type,
            httpdate::fmt_http_date(modified),
            hashing,
        )))
    }

    /// Build a record from already transformed bytes.
    pub fn new(
        content: Vec<u8>,
        content_type: &'static str,
        last_modified: String,
        hashing: Hashing,
    ) -> Self {
        let etag = match hashing {
            Hashing::Enabled => Some(hash::digest_base64(&content)),
            Hashing::Disabled => None,
        };
        Self {
            content: Arc::from(content),
            gzip: OnceLock::new(),
            deflate: OnceLock::new(),
            etag,
            last_modified,
            content_type,
        }
    }

    pub fn content(&self) -> &Arc<[u8]> {
        &self.content
    }

    pub fn gzip(&self) -> Option<&Arc<[u8]>> {
        self.gzip.get()
    }

    pub fn deflate(&self) -> Option<&Arc<[u8]>> {
        self.deflate.get()
    }

    /// Published variant for `encoding`, if compression already finished.
    pub fn variant(&self, encoding: Encoding) -> Option<&Arc<[u8]>> {
        match encoding {
            Encoding::Gzip => self.gzip(),
            Encoding::Deflate => self.deflate(),
        }
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn last_modified(&self) -> &str {
        &self.last_modified
    }

    pub const fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// Publish a compressed variant. Returns `false` if the slot was
    /// already filled; the first value stays.
    pub(crate) fn publish(&self, encoding: Encoding, bytes: Vec<u8>) -> bool {
        let slot = match encoding {
            Encoding::Gzip => &self.gzip,
            Encoding::Deflate => &self.deflate,
        };
        slot.set(Arc::from(bytes)).is_ok()
    }
}

impl fmt::Debug for AssetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetRecord")
            .field("content_len", &self.content.len())
            .field("gzip", &self.gzip.get().map(|b| b.len()))
            .field("deflate", &self.deflate.get().map(|b| b.len()))
            .field("etag", &self.etag)
            .field("last_modified", &self.last_modified)
            .field("content_type", &self.content_type)
            .finish()
    }
}
