//! Shared helpers: MIME detection, content digests, path handling.

pub mod hash;
pub mod mime;
pub mod path;
