//! Uncached development path.
//!
//! Every request re-reads and re-minifies the file so edits show up without
//! restarting the worker. No hashing, no compression, no validators.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use super::{Outcome, Representation, Validators};
use crate::asset::MinifierRegistry;
use crate::utils::{mime, path::resolve_under};
use crate::warn;

pub struct DebugBypass {
    root: PathBuf,
    minifiers: MinifierRegistry,
}

impl DebugBypass {
    pub fn new(root: impl Into<PathBuf>, minifiers: MinifierRegistry) -> Self {
        Self {
            root: root.into(),
            minifiers,
        }
    }

    /// Serve the file named by `remainder` (the path after the bind prefix).
    pub fn serve(&self, remainder: &str) -> Outcome {
        let Some(path) = resolve_under(&self.root, remainder) else {
            return Outcome::NotFound;
        };

        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("assets"; "failed to read `{}`: {e}", path.display());
                }
                return Outcome::NotFound;
            }
        };

        let content_type = mime::from_path(&path);
        let body = if self.minifiers.contains(content_type) {
            match self.minifiers.apply(content_type, raw.clone()) {
                Ok(minified) => minified,
                Err(e) => {
                    warn!("assets"; "failed to minify `{}`: {e}, serving source", path.display());
                    raw
                }
            }
        } else {
            raw
        };

        Outcome::Ok(Representation {
            body: Arc::from(body),
            content_type,
            encoding: None,
            validators: Validators::default(),
        })
    }
}
