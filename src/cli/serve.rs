//! `hearth serve`: bind once, then supervise the worker pool.

use anyhow::{Context, Result};
use clap::ColorChoice;

use crate::cli::Cli;
use crate::config::{AppConfig, WORKER_CONFIG_ENV};
use crate::supervisor::{ExecLauncher, Supervisor};
use crate::{core, log, logger, server};

/// Run the supervisor until Ctrl+C.
pub fn run(cli: &Cli, config: &AppConfig) -> Result<()> {
    let listener = server::bind(config.serve.interface, config.serve.port)?;
    let addr = listener.local_addr()?;
    let fd = server::share(&listener)?;

    let launcher = worker_launcher(cli, config, fd)?;
    let workers = config.serve.worker_count();
    log!("serve"; "http://{addr} ({workers} workers)");
    if let Some(dir) = &config.resources.dir {
        log!("serve"; "static resources `{}` at `{}/`", dir.display(), config.resources.prefix);
    }

    let shutdown = core::register_shutdown_listener();
    let result = Supervisor::new(launcher, workers)
        .with_shutdown(shutdown)
        .run();

    // Workers share the socket; close it only after they are gone
    drop(listener);
    result
}

/// Command line re-executing this binary as a worker on `fd`.
fn worker_launcher(cli: &Cli, config: &AppConfig, fd: i32) -> Result<ExecLauncher> {
    let color = match cli.color {
        ColorChoice::Always => "always",
        ColorChoice::Never => "never",
        ColorChoice::Auto => "auto",
    };

    let mut launcher = ExecLauncher::current_exe()
        .context("failed to locate the hearth executable")?
        .arg("--color")
        .arg(color)
        .arg("--config")
        .arg(&config.config_path);
    if logger::is_verbose() {
        launcher = launcher.arg("--verbose");
    }

    Ok(launcher
        .arg("worker")
        .arg("--listen-fd")
        .arg(fd.to_string())
        .env(WORKER_CONFIG_ENV, config.to_worker_env()?))
}
