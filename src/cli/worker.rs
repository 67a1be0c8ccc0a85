//! `hearth worker`: serve one inherited listener.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::cli::Cli;
use crate::config::{AppConfig, WORKER_CONFIG_ENV, init_config};
use crate::debug;
use crate::server::{self, NotFoundApp};

/// Run a worker process until its server is unblocked.
pub fn run(cli: &Cli, listen_fd: i32) -> Result<()> {
    let config = match std::env::var(WORKER_CONFIG_ENV) {
        Ok(content) => {
            AppConfig::from_worker_env(&content).context("invalid config from supervisor")?
        }
        Err(_) => {
            debug!("serve"; "{WORKER_CONFIG_ENV} not set, reading config file");
            AppConfig::load(cli)?
        }
    };
    init_config(config);

    let listener = server::inherit(listen_fd)?;
    server::run_worker(listener, Arc::new(NotFoundApp))
}
