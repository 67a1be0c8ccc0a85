//! Content digests for entity tags.
//!
//! Uses blake3 for fast, collision-resistant hashing of asset bodies and
//! encodes the digest with the standard base64 alphabet.
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let etag = hash::digest_base64(b"body{color:red}"); // -> "Q2x1...="
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Compute the base64-encoded blake3 digest of `data`.
#[inline]
pub fn digest_base64<T: AsRef<[u8]> + ?Sized>(data: &T) -> String {
    STANDARD.encode(blake3::hash(data.as_ref()).as_bytes())
}
