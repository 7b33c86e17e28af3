//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading
//! - Environment variable overrides
//! - Configuration validation

pub mod loader;

pub use loader::{config_dir, ConfigError, ConfigLoader, CONFIG_DIR, ENV_PREFIX};
