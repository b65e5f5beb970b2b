//! Configuration module for cdn-mirror
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every section and key has a default, so an empty file
//! (or no file at all) yields a working configuration.
//!
//! # Example
//!
//! ```no_run
//! use cdn_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Downloads per directory: {}", config.crawler.max_concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FetchConfig, RetryConfig};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
pub use validation::validate;
