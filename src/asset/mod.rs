//! Static asset cache: scanning, minification, pre-compression.
//!
//! ```text
//! resource root ──scan──► AssetRecord (minified, hashed) ──► AssetRegistry
//!                                   │
//!                                   └─ rayon ─► gzip / deflate (published once)
//! ```
//!
//! The registry is built once, before the worker accepts connections, and is
//! read-only afterwards. Compression variants appear later without blocking
//! readers.

mod compress;
mod error;
pub mod minify;
mod record;
mod registry;
mod scan;

pub use compress::{CompressionPrecomputer, CompressionTicket, Encoding};
pub use error::{AssetError, MinifyError};
pub use minify::MinifierRegistry;
pub use record::{AssetRecord, Hashing};
pub use registry::AssetRegistry;
pub use scan::AssetScanner;
