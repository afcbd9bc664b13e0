//! Configuration module for CRM-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Command-line flags are layered on top of the loaded values by the binary.
//!
//! # Example
//!
//! ```no_run
//! use crm_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Fetching ids {}..={}", config.range.start, config.range.end);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FetchConfig, OutputConfig, RangeConfig, SinkFormat, DEFAULT_BASE_URL,
    DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
