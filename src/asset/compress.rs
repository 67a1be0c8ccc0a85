//! Background pre-compression of registered assets.
//!
//! Each asset gets one job on the global rayon pool that derives the deflate
//! and gzip variants and publishes them into the record's set-once slots.
//! Readers never wait: an unpublished variant is simply absent.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver};
use flate2::Compression;
use flate2::write::{GzEncoder, ZlibEncoder};

use super::{AssetError, AssetRecord, AssetRegistry};
use crate::{debug, error};

/// Content codings the cache can precompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// zlib-wrapped DEFLATE (RFC 1950), which is what HTTP `deflate` means.
    Deflate,
    Gzip,
}

impl Encoding {
    /// Server preference order: deflate over gzip.
    pub const PREFERENCE: [Self; 2] = [Self::Deflate, Self::Gzip];

    /// `Content-Encoding` token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deflate => "deflate",
            Self::Gzip => "gzip",
        }
    }

    /// Compress `data` with this coding.
    pub fn encode(self, data: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Self::Deflate => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
                encoder.write_all(data)?;
                encoder.finish()
            }
            Self::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
                encoder.write_all(data)?;
                encoder.finish()
            }
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compression function used by the precomputer.
pub type Encoder = fn(Encoding, &[u8]) -> io::Result<Vec<u8>>;

/// Derives compressed variants off the request path.
pub struct CompressionPrecomputer {
    encoder: Encoder,
}

impl Default for CompressionPrecomputer {
    fn default() -> Self {
        Self {
            encoder: Encoding::encode,
        }
    }
}

impl CompressionPrecomputer {
    pub fn with_encoder(encoder: Encoder) -> Self {
        Self { encoder }
    }

    /// Schedule compression for every record in `registry` and return
    /// immediately.
    ///
    /// A failed encoding is logged and leaves that variant absent for good.
    pub fn precompute(&self, registry: &AssetRegistry) -> CompressionTicket {
        let (done_tx, done_rx) = channel::unbounded();

        for (url, record) in registry.iter() {
            let url = url.to_owned();
            let record = Arc::clone(record);
            let done_tx = done_tx.clone();
            let encoder = self.encoder;

            rayon::spawn(move || {
                compress_record(&url, &record, encoder);
                // The ticket may have been dropped
                let _ = done_tx.send(());
            });
        }

        debug!("assets"; "compressing {} assets in background", registry.len());
        CompressionTicket {
            done: done_rx,
            pending: registry.len(),
        }
    }
}

fn compress_record(url: &str, record: &AssetRecord, encoder: Encoder) {
    for encoding in Encoding::PREFERENCE {
        match encoder(encoding, record.content()) {
            Ok(bytes) => {
                record.publish(encoding, bytes);
            }
            Err(source) => {
                let err = AssetError::Compress {
                    url: url.to_owned(),
                    encoding,
                    source,
                };
                error!("assets"; "{err}");
            }
        }
    }
}

/// Completion handle for one `precompute` call.
///
/// Dropping it does not cancel anything.
pub struct CompressionTicket {
    done: Receiver<()>,
    pending: usize,
}

impl CompressionTicket {
    /// Number of assets not yet finished.
    pub const fn pending(&self) -> usize {
        self.pending
    }

    /// Block until every scheduled asset is finished.
    pub fn wait(mut self) {
        while self.pending > 0 && self.done.recv().is_ok() {
            self.pending -= 1;
        }
    }

    /// Block until finished or `timeout` elapses. Returns `true` when all
    /// assets finished in time.
    pub fn wait_timeout(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.pending > 0 {
            if self.done.recv_deadline(deadline).is_err() {
                return false;
            }
            self.pending -= 1;
        }
        true
    }
}
