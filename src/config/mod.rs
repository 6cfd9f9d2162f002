//! Configuration module for Polite Crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files
//! and turning them into a [`CrawlProfile`](crate::CrawlProfile).
//!
//! # Example
//!
//! ```no_run
//! use polite_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Crawler will use parallelism: {}", config.engine.parallelism);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlSection, EngineSection, FiltersSection};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::MAX_PARALLELISM;
