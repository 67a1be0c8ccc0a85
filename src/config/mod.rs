//! Runtime configuration from `hearth.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── serve      # [serve]
//! │   └── resources  # [resources]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError
//! │   └── handle     # Global config handle
//! └── mod.rs         # AppConfig (this file)
//! ```
//!
//! The supervisor loads and validates the file once. Workers receive the
//! finalized config serialized in [`WORKER_CONFIG_ENV`] so every worker
//! sees exactly what the supervisor resolved.

pub mod section;
pub mod types;

pub use section::{ResourcesConfig, ServeConfig};
pub use types::{ConfigError, cfg, init_config};

use crate::cli::{Cli, Commands, ServeArgs};
use crate::utils::path::normalize_path;
use crate::{debug, warn};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Environment variable carrying the supervisor's config to its workers.
pub const WORKER_CONFIG_ENV: &str = "HEARTH_WORKER_CONFIG";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing hearth.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directory relative paths resolve against (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub resources: ResourcesConfig,
}

impl AppConfig {
    /// Load configuration from CLI arguments.
    ///
    /// A missing config file is not an error: defaults apply.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let config_path = normalize_path(&cwd.join(&cli.config));

        let mut config = if config_path.is_file() {
            Self::from_path(&config_path)?
        } else {
            debug!("config"; "`{}` not found, using defaults", cli.config.display());
            Self::default()
        };

        config.root = config_path
            .parent()
            .map_or_else(|| cwd.clone(), Path::to_path_buf);
        config.config_path = config_path;

        if let Commands::Serve { args } = &cli.command {
            config.apply_serve_args(args, &cwd);
        }
        config.finalize();
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            let display_path = path
                .file_name()
                .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy());
            warn!("config"; "unknown fields in {display_path} ignored: {}", ignored.join(", "));
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Config handed down by the supervisor.
    pub fn from_worker_env(content: &str) -> Result<Self, ConfigError> {
        let config = Self::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the finalized config for a worker process.
    pub fn to_worker_env(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply `hearth serve` flags. Paths given on the command line are
    /// relative to the working directory, not the config file.
    fn apply_serve_args(&mut self, args: &ServeArgs, cwd: &Path) {
        Self::update_option(&mut self.serve.interface, args.interface.as_ref());
        Self::update_option(&mut self.serve.port, args.port.as_ref());
        Self::update_option(&mut self.serve.workers, args.workers.as_ref());
        Self::update_option(&mut self.serve.threads, args.threads.as_ref());
        Self::update_option(&mut self.resources.prefix, args.prefix.as_ref());
        Self::update_option(&mut self.resources.debug, args.debug.as_ref());

        if let Some(dir) = &args.resources {
            self.resources.dir = Some(normalize_path(&cwd.join(dir)));
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve paths against the config directory and canonicalize the prefix.
    fn finalize(&mut self) {
        if let Some(dir) = self.resources.dir.take() {
            self.resources.dir = Some(normalize_path(&self.root.join(dir)));
        }
        let trimmed = self.resources.prefix.trim_end_matches('/').len();
        self.resources.prefix.truncate(trimmed);
    }

    // ========================================================================
    // validation
    // ========================================================================

    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = &self.resources.prefix;
        if !prefix.is_empty() && !prefix.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "resources.prefix `{prefix}` must start with `/`"
            )));
        }
        if self.serve.threads == 0 {
            return Err(ConfigError::Validation(
                "serve.threads must be at least 1".into(),
            ));
        }
        if self.serve.max_connections == 0 {
            return Err(ConfigError::Validation(
                "serve.max_connections must be at least 1".into(),
            ));
        }
        if let Some(dir) = &self.resources.dir
            && !dir.is_dir()
        {
            return Err(ConfigError::Validation(format!(
                "resources.dir `{}` is not a directory",
                dir.display()
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config content.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> AppConfig {
    let (parsed, ignored) = AppConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("hearth").chain(args.iter().copied()))
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result = AppConfig::from_str("[serve\nport = 1");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[serve]\nport = 9000\nwatch = true\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = AppConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.serve.port, 9000);
        assert!(ignored.iter().any(|f| f.contains("watch")));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let config = AppConfig::load(&cli(&["-C", path.to_str().unwrap(), "serve"])).unwrap();

        assert_eq!(config.serve, ServeConfig::default());
        assert_eq!(config.resources, ResourcesConfig::default());
        assert!(config.root.ends_with(dir.path().file_name().unwrap()));
    }

    #[test]
    fn test_load_resolves_dir_against_config_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("public")).unwrap();
        let path = dir.path().join("hearth.toml");
        fs::write(&path, "[resources]\ndir = \"public\"\nprefix = \"/assets/\"\n").unwrap();

        let config = AppConfig::load(&cli(&["-C", path.to_str().unwrap(), "serve"])).unwrap();
        assert_eq!(
            config.resources.dir,
            Some(normalize_path(&dir.path().join("public")))
        );
        assert_eq!(config.resources.prefix, "/assets");
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hearth.toml");
        fs::write(&path, "[serve]\nport = 9000\nthreads = 2\n").unwrap();

        let config = AppConfig::load(&cli(&[
            "-C",
            path.to_str().unwrap(),
            "serve",
            "--port",
            "7000",
            "--workers",
            "3",
            "--prefix",
            "/",
            "--debug",
        ]))
        .unwrap();
        assert_eq!(config.serve.port, 7000);
        assert_eq!(config.serve.workers, 3);
        assert_eq!(config.serve.threads, 2);
        assert_eq!(config.resources.prefix, "");
        assert!(config.resources.debug);
    }

    #[test]
    fn test_validation_errors() {
        let dir = TempDir::new().unwrap();

        let mut config = AppConfig::default();
        config.resources.prefix = "static".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = AppConfig::default();
        config.serve.threads = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = AppConfig::default();
        config.serve.max_connections = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = AppConfig::default();
        config.resources.dir = Some(dir.path().join("missing"));
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_rejects_missing_resource_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hearth.toml");
        fs::write(&path, "[resources]\ndir = \"nowhere\"\n").unwrap();
        assert!(AppConfig::load(&cli(&["-C", path.to_str().unwrap(), "serve"])).is_err());
    }

    #[test]
    fn test_worker_env_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.serve.port = 4242;
        config.serve.workers = 2;
        config.resources.dir = Some(dir.path().to_path_buf());
        config.resources.prefix = "/res".into();

        let encoded = config.to_worker_env().unwrap();
        let decoded = AppConfig::from_worker_env(&encoded).unwrap();
        assert_eq!(decoded.serve, config.serve);
        assert_eq!(decoded.resources, config.resources);
    }
}
