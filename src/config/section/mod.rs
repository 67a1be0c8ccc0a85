//! Configuration section definitions.
//!
//! | Module      | TOML Section    | Purpose                          |
//! |-------------|-----------------|----------------------------------|
//! | `serve`     | `[serve]`       | Listener and process topology    |
//! | `resources` | `[resources]`   | Static asset cache               |

mod resources;
mod serve;

pub use resources::ResourcesConfig;
pub use serve::ServeConfig;
