use crate::crawler::CrawlProfile;
use crate::engine::EngineOptions;
use crate::filters::banned_extensions;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for a crawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlSection,
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub filters: FiltersSection,
}

impl Config {
    /// Converts the file settings into a run profile
    ///
    /// The banned-extensions filter is installed as the first URL predicate
    /// when the list is non-empty.
    pub fn into_profile(self) -> CrawlProfile {
        let Config {
            crawl,
            engine,
            filters,
        } = self;

        let options = EngineOptions {
            user_agent: crawl.user_agent.clone(),
            parallelism: engine.parallelism,
            request_timeout: Duration::from_secs(engine.request_timeout_secs),
            allowed_domains: engine.allowed_domains,
            max_depth: None,
        };

        let profile = CrawlProfile::new(crawl.website, crawl.user_agent)
            .max_runtime(Duration::from_secs(crawl.max_runtime_secs))
            .initial_delay(Duration::from_secs(crawl.initial_delay_secs))
            .delay_step(Duration::from_millis(crawl.delay_step_ms))
            .honor_crawl_delay(crawl.honor_crawl_delay)
            .engine_options(options);

        if filters.banned_extensions.is_empty() {
            profile
        } else {
            profile.url_filter(banned_extensions(filters.banned_extensions))
        }
    }
}

/// Site and politeness settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlSection {
    /// Site to crawl, also the seed URL
    pub website: String,

    /// Declared identification string sent as User-Agent
    pub user_agent: String,

    /// Maximum duration of the run (seconds)
    #[serde(default = "default_max_runtime_secs")]
    pub max_runtime_secs: u64,

    /// Starting delay between requests and limiter floor (seconds)
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,

    /// Adjustment of one throttling or healthy signal (milliseconds)
    #[serde(default = "default_delay_step_ms")]
    pub delay_step_ms: u64,

    /// Raise the floor to the site's Crawl-delay when it is higher
    #[serde(default = "default_true")]
    pub honor_crawl_delay: bool,
}

/// Fetch engine settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EngineSection {
    /// Maximum number of requests in flight
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// Timeout of a single request (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Domain globs the engine may fetch from (e.g., "*.example.com")
    #[serde(default)]
    pub allowed_domains: Vec<String>,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            request_timeout_secs: default_request_timeout_secs(),
            allowed_domains: Vec::new(),
        }
    }
}

/// Built-in URL filters
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FiltersSection {
    /// Path extensions that are never followed (e.g., ".zip")
    #[serde(default = "crate::filters::default_banned_extensions")]
    pub banned_extensions: Vec<String>,
}

impl Default for FiltersSection {
    fn default() -> Self {
        Self {
            banned_extensions: crate::filters::default_banned_extensions(),
        }
    }
}

fn default_max_runtime_secs() -> u64 {
    3600
}

fn default_initial_delay_secs() -> u64 {
    2
}

fn default_delay_step_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_parallelism() -> usize {
    2
}

fn default_request_timeout_secs() -> u64 {
    30
}
