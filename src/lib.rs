//! Polite Crawler: a politeness controller for single-site web crawls
//!
//! This crate wraps a page-fetching engine with the logic needed to crawl one
//! site respectfully: it honors robots.txt for every token embedded in the
//! crawler's user agent, adapts its request rate to throttling signals, visits
//! each URL at most once, and bounds the whole run by a deadline.

pub mod config;
pub mod crawler;
pub mod engine;
pub mod filters;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Run-level error returned by [`crawler::Crawler::run`]
///
/// Only failures before the first page is fetched end up here. Problems with
/// individual links or requests are reported through hooks and logs instead.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid site URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Site URL has no host: {0}")]
    MissingHost(String),

    #[error("Robots.txt error: {0}")]
    Robots(#[from] RobotsError),

    #[error("User agent '{user_agent}' is not allowed to visit {url}")]
    PolicyViolation { url: String, user_agent: String },

    #[error("Fetch engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Maximum runtime of {max_runtime:?} reached before the seed was dispatched")]
    DeadlineBeforeDispatch { max_runtime: std::time::Duration },
}

/// Errors raised while fetching or reading robots.txt
#[derive(Debug, Error)]
pub enum RobotsError {
    #[error("Invalid robots.txt URL: {0}")]
    Url(#[from] ::url::ParseError),

    #[error("HTTP error fetching robots.txt: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {url} returned {status}")]
    Status {
        method: &'static str,
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("robots.txt body is not valid UTF-8: {0}")]
    Body(#[from] std::string::FromUtf8Error),
}

/// Errors raised by a fetch engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Engine worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for crawl runs
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for robots.txt operations
pub type RobotsResult<T> = std::result::Result<T, RobotsError>;

/// Result type alias for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlProfile, Crawler};
pub use engine::{EngineOptions, FetchEngine, HttpEngine};
pub use output::RunSummary;
pub use robots::RobotsPolicy;
pub use state::{RateLimiter, VisitSet};
