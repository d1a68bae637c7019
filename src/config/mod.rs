//! Configuration Module
//!
//! Loads and validates configuration from TOML files and the environment.

pub mod loader;

pub use loader::{
    load_config, load_config_or_default, load_with_env, write_default_config, Config,
    ConfigError, DEFAULT_CONFIG_PATH,
};
