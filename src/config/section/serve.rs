//! `[serve]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 8080                 # HTTP port number
//! workers = 0                 # Worker processes (0 = one per CPU)
//! threads = 4                 # Request threads per worker
//! max_connections = 200       # Requests held at once per worker (503 beyond)
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroUsize;
use std::thread;

use serde::{Deserialize, Serialize};

/// Server topology settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Number of worker processes. `0` picks the number of available CPUs.
    pub workers: usize,

    /// Request threads inside each worker.
    pub threads: usize,

    /// Requests a worker holds at once. Further requests get a 503.
    pub max_connections: usize,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8080,
            workers: 0,
            threads: 4,
            max_connections: 200,
        }
    }
}

impl ServeConfig {
    /// Effective worker pool size.
    pub fn worker_count(&self) -> usize {
        match self.workers {
            0 => thread::available_parallelism().map_or(1, NonZeroUsize::get),
            n => n,
        }
    }
}
