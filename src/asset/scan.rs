//! Resource directory traversal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{AssetError, AssetRecord, AssetRegistry, Hashing, MinifierRegistry};
use crate::utils::path::bound_url;
use crate::{debug, log, warn};

/// Walks a resource root once and produces the registry for it.
///
/// ```text
/// public/                 prefix "/static"
/// ├── style.css      ->   /static/style.css
/// └── js/
///     └── app.js     ->   /static/js/app.js
/// ```
pub struct AssetScanner<'a> {
    root: &'a Path,
    prefix: &'a str,
    minifiers: &'a MinifierRegistry,
    hashing: Hashing,
}

impl<'a> AssetScanner<'a> {
    pub fn new(root: &'a Path, prefix: &'a str, minifiers: &'a MinifierRegistry) -> Self {
        Self {
            root,
            prefix,
            minifiers,
            hashing: Hashing::Enabled,
        }
    }

    pub fn hashing(mut self, hashing: Hashing) -> Self {
        self.hashing = hashing;
        self
    }

    /// Read every file below the root into a new registry.
    ///
    /// Unreadable files and sub-directories are skipped with a warning.
    /// An unreadable root or a failed minification aborts the scan.
    pub fn scan(&self) -> Result<AssetRegistry, AssetError> {
        let mut registry = AssetRegistry::new(self.prefix);
        let mut stack: Vec<PathBuf> = fs::read_dir(self.root)
            .and_then(|entries| entries.map(|entry| entry.map(|e| e.path())).collect())
            .map_err(|e| AssetError::Root(self.root.to_path_buf(), e))?;

        while let Some(path) = stack.pop() {
            let file_type = match fs::symlink_metadata(&path) {
                Ok(metadata) => metadata.file_type(),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!("assets"; "`{}` vanished during scan, skipping", path.display());
                    continue;
                }
                Err(e) => {
                    warn!("assets"; "{}, skipping", AssetError::Read(path, e));
                    continue;
                }
            };

            if file_type.is_dir() {
                match fs::read_dir(&path) {
                    Ok(entries) => stack.extend(entries.flatten().map(|e| e.path())),
                    Err(e) => {
                        warn!("assets"; "cannot read directory `{}`: {e}, skipping", path.display())
                    }
                }
                continue;
            }
            // Linked directories may point back up the tree
            if file_type.is_symlink() && path.is_dir() {
                debug!("assets"; "not following directory link `{}`", path.display());
                continue;
            }

            let Some(url) = bound_url(self.prefix, self.root, &path) else {
                continue;
            };
            match AssetRecord::load(&path, self.minifiers, self.hashing) {
                Ok(Some(record)) => {
                    debug!("assets"; "{url} ({} bytes, {})", record.content().len(), record.content_type());
                    registry.insert(url, record);
                }
                Ok(None) => {
                    warn!("assets"; "`{}` vanished during scan, skipping", path.display());
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!("assets"; "{e}, skipping"),
            }
        }

        log!("assets"; "{}", cached_summary(registry.len(), registry.total_bytes()));
        Ok(registry)
    }
}

/// Bind summary; kilobytes are truncated.
fn cached_summary(count: usize, bytes: u64) -> String {
    format!("{count} static resources ({} kB) cached", bytes / 1024)
}
