//! Logging utilities with colored, module-prefixed output.
//!
//! This module provides:
//! - `log!` macro for informational lines
//! - `warn!` / `error!` macros for contained and fatal failures
//! - `debug!` macro, printed only when `--verbose` is set
//!
//! # Example
//!
//! ```ignore
//! log!("assets"; "{} static resources ({} kB) cached", count, kb);
//! warn!("supervisor"; "worker {} died ({}), restarting", pid, status);
//! ```
//!
//! Every process (supervisor and workers) writes to its own stdout; lines are
//! written under the stdout lock so concurrent request threads never interleave
//! within a line.

use owo_colors::OwoColorize;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

// ============================================================================
// Log Macros
// ============================================================================

/// Log an informational message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($crate::logger::Level::Info, $module, &format!($($arg)*))
    }};
}

/// Log a warning (a failure that was contained)
#[macro_export]
macro_rules! warn {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($crate::logger::Level::Warn, $module, &format!($($arg)*))
    }};
}

/// Log an error
#[macro_export]
macro_rules! error {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($crate::logger::Level::Error, $module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($crate::logger::Level::Debug, $module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Write one log line.
#[inline]
pub fn log(level: Level, module: &str, message: &str) {
    let line = format_line(level, module, message);
    let mut stdout = stdout().lock();
    writeln!(stdout, "{line}").ok();
    stdout.flush().ok();
}

fn format_line(level: Level, module: &str, message: &str) -> String {
    let prefix = colorize_prefix(level, module);
    match level {
        Level::Warn => format!("{prefix} {} {message}", "warning:".yellow()),
        Level::Error => format!("{prefix} {} {message}", "error:".red()),
        Level::Debug => format!("{prefix} {}", message.dimmed()),
        Level::Info => format!("{prefix} {message}"),
    }
}

/// Apply color to a module prefix based on severity and module
#[inline]
fn colorize_prefix(level: Level, module: &str) -> String {
    let prefix = format!("[{module}]");
    match level {
        Level::Error => prefix.bright_red().bold().to_string(),
        Level::Warn => prefix.bright_yellow().bold().to_string(),
        Level::Debug => prefix.dimmed().to_string(),
        Level::Info => match module {
            "serve" => prefix.bright_blue().bold().to_string(),
            "supervisor" => prefix.bright_green().bold().to_string(),
            _ => prefix.bright_cyan().bold().to_string(),
        },
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line_info() {
        owo_colors::set_override(false);
        assert_eq!(
            format_line(Level::Info, "assets", "3 static resources (1 kB) cached"),
            "[assets] 3 static resources (1 kB) cached"
        );
    }

    #[test]
    fn test_format_line_severity_markers() {
        owo_colors::set_override(false);
        assert_eq!(
            format_line(Level::Warn, "assets", "skipping a.css"),
            "[assets] warning: skipping a.css"
        );
        assert_eq!(
            format_line(Level::Error, "serve", "bind failed"),
            "[serve] error: bind failed"
        );
    }

    #[test]
    fn test_verbose_toggle() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }
}
