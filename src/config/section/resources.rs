//! `[resources]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [resources]
//! dir = "public"          # Static files root (relative to hearth.toml)
//! prefix = "/static"      # URL prefix the files are bound under
//! debug = false           # Re-read files on every request, no caching
//! ```
//!
//! Without `dir` nothing is intercepted and every request reaches the
//! application.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Static asset cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcesConfig {
    pub dir: Option<PathBuf>,

    /// URL bind prefix. Empty binds at the site root.
    pub prefix: String,

    pub debug: bool,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            dir: None,
            prefix: "/static".into(),
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::config::test_parse_config;

    #[test]
    fn test_resources_config() {
        let config =
            test_parse_config("[resources]\ndir = \"assets\"\nprefix = \"/res\"\ndebug = true");
        assert_eq!(config.resources.dir.as_deref(), Some(Path::new("assets")));
        assert_eq!(config.resources.prefix, "/res");
        assert!(config.resources.debug);
    }

    #[test]
    fn test_resources_config_defaults() {
        let config = test_parse_config("");
        assert!(config.resources.dir.is_none());
        assert_eq!(config.resources.prefix, "/static");
        assert!(!config.resources.debug);
    }
}
