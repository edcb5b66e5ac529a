//! Configuration: TOML file on disk, [`SessionConfig`] at runtime.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{Config, MothurConfig, SessionConfig, SessionDefaults, Verbosity};
