//! Command-line interface module.

mod args;
pub mod serve;
pub mod worker;

pub use args::{Cli, Commands, ServeArgs};
