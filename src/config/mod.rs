//! Configuration module for specsweep
//!
//! Handles loading, parsing, and validating the optional TOML configuration
//! file. Every setting has a default, so the binary runs without one.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{Config, CrawlConfig, DelayRange, OutputConfig, SessionConfig};
