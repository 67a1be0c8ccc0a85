//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// hearth application server CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: hearth.toml)
    #[arg(short = 'C', long, global = true, default_value = "hearth.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the supervisor and its worker pool
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        args: ServeArgs,
    },

    /// Run a single worker on an inherited listening socket
    #[command(hide = true)]
    Worker {
        /// Descriptor of the listening socket opened by the supervisor
        #[arg(long)]
        listen_fd: i32,
    },
}

/// `serve` arguments; each one overrides `hearth.toml`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<IpAddr>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Number of worker processes (0 = one per CPU)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Request threads per worker
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Static resource directory (relative to the current directory)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub resources: Option<PathBuf>,

    /// URL prefix static resources are bound under
    #[arg(long)]
    pub prefix: Option<String>,

    /// Serve resources uncached, re-reading files on every request
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub debug: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::parse_from([
            "hearth", "serve", "-p", "9000", "-w", "2", "-r", "public", "--debug",
        ]);
        let Commands::Serve { args } = &cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, Some(9000));
        assert_eq!(args.workers, Some(2));
        assert_eq!(args.resources.as_deref(), Some(std::path::Path::new("public")));
        assert_eq!(args.debug, Some(true));
        assert!(args.prefix.is_none());
        assert_eq!(cli.config, PathBuf::from("hearth.toml"));
    }

    #[test]
    fn test_parse_worker_with_globals_after_subcommand() {
        let cli = Cli::parse_from(["hearth", "worker", "--listen-fd", "3", "-v", "--color", "never"]);
        assert!(cli.verbose);
        assert!(matches!(cli.color, ColorChoice::Never));
        assert!(matches!(cli.command, Commands::Worker { listen_fd: 3 }));
    }

    #[test]
    fn test_debug_flag_explicit_value() {
        let cli = Cli::parse_from(["hearth", "s", "--debug", "false"]);
        let Commands::Serve { args } = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.debug, Some(false));
    }
}
