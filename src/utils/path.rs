//! Path and URL utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `request_path` - URL to decoded path (query stripped)
//! - `resolve_under` - URL remainder to a file inside a root, traversal-safe
//! - `bound_url` - registry key for a file below a resource root

use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Extract the decoded path of a request URL, dropping query and fragment.
///
/// Invalid UTF-8 after decoding falls back to the raw path.
pub fn request_path(url: &str) -> Cow<'_, str> {
    let raw = url.split(['?', '#']).next().unwrap_or(url);
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(raw),
    }
}

/// Resolve a URL remainder (the part after the bind prefix) to a regular
/// file under `root`.
///
/// Returns `None` for traversal attempts, paths that canonicalize outside
/// `root`, and anything that is not a regular file.
pub fn resolve_under(root: &Path, remainder: &str) -> Option<PathBuf> {
    let clean = remainder.trim_matches('/');
    if clean.is_empty() || clean.split('/').any(|seg| seg == "..") {
        return None;
    }

    let local = root.join(clean);

    // Canonicalize to resolve symlinks and verify path is under root
    let canonical = local.canonicalize().ok()?;
    let root_canonical = root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    canonical.is_file().then_some(canonical)
}

/// Build the registry key for `path` found below `root`.
///
/// Components are joined with `/` on every platform: `prefix + "/" + rel`.
pub fn bound_url(prefix: &str, root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut url = String::from(prefix);
    for component in rel.components() {
        match component {
            Component::Normal(name) => {
                url.push('/');
                url.push_str(&name.to_string_lossy());
            }
            _ => return None,
        }
    }
    Some(url)
}
