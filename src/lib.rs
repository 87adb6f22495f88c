//! Layered YAML configuration: load an app config, apply optional user
//! overrides, validate both and cache the merged result.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod manager;
pub mod result;
pub mod telemetry;
pub mod types;
pub mod validation;

pub use cache::{CacheStats, ConfigCache};
pub use config::{AppConfig, MergedConfig, UserConfig};
pub use error::{ConfigError, ConfigResult, ErrorKind};
pub use manager::{ConfigManager, ConfigPaths};

#[cfg(test)]
mod test_utils;
