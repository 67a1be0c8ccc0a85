//! hearth - A small application server with a pre-compressed static asset
//! cache and a self-healing worker pool.

#![allow(dead_code)]

mod asset;
mod cli;
mod config;
mod core;
mod logger;
mod negotiate;
mod server;
mod supervisor;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{AppConfig, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    match &cli.command {
        Commands::Serve { .. } => {
            let config = init_config(AppConfig::load(&cli)?);
            cli::serve::run(&cli, &config)
        }
        Commands::Worker { listen_fd } => cli::worker::run(&cli, *listen_fd),
    }
}
