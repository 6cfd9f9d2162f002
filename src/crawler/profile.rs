//! Crawl profile: everything a single run needs to know up front

use crate::engine::{EngineOptions, PageResponse};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Called once per successfully fetched page
pub type ResponseObserver = Arc<dyn Fn(&PageResponse) + Send + Sync>;

/// Called once per discovered URL; every predicate must return true for the URL to be followed
pub type UrlPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Called once per discovered URL before any filtering
pub type UrlObserver = Arc<dyn Fn(&str) + Send + Sync>;

/// Default maximum duration of a run
pub const DEFAULT_MAX_RUNTIME: Duration = Duration::from_secs(3600);

/// Default delay between requests, also the rate limiter's floor
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(2);

/// Immutable configuration of one crawl run
///
/// Built with [`CrawlProfile::new`] and the chained setters, then handed to a
/// [`Crawler`](crate::crawler::Crawler). Extension points run in the order
/// they were added.
///
/// # Example
///
/// ```
/// use polite_crawler::CrawlProfile;
/// use std::time::Duration;
///
/// let profile = CrawlProfile::new("https://example.com", "MyBot/1.0 (+https://example.com/bot)")
///     .max_runtime(Duration::from_secs(60))
///     .url_filter(|url| !url.ends_with(".zip"))
///     .on_url(|url| println!("found {}", url));
/// assert_eq!(profile.url_predicates.len(), 1);
/// ```
#[derive(Clone)]
pub struct CrawlProfile {
    /// Site to crawl; also the seed URL
    pub website: String,

    /// Declared identification string (User-Agent)
    pub user_agent: String,

    /// The run stops once this much time has passed since it started
    pub max_runtime: Duration,

    /// Starting delay between requests and floor of the rate limiter
    pub initial_delay: Duration,

    /// How far one throttling or healthy signal moves the delay
    pub delay_step: Duration,

    /// Raise the delay floor to the site's Crawl-delay when it is higher
    pub honor_crawl_delay: bool,

    /// Options passed through to the fetch engine
    pub engine: EngineOptions,

    /// Observers of fetched pages
    pub response_observers: Vec<ResponseObserver>,

    /// Predicates every discovered URL must pass
    pub url_predicates: Vec<UrlPredicate>,

    /// Observers of every discovered URL
    pub url_observers: Vec<UrlObserver>,
}

impl CrawlProfile {
    /// Creates a profile with default limits and no extension points
    pub fn new(website: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            website: website.into(),
            user_agent: user_agent.into(),
            max_runtime: DEFAULT_MAX_RUNTIME,
            initial_delay: DEFAULT_INITIAL_DELAY,
            delay_step: crate::state::DEFAULT_DELAY_STEP,
            honor_crawl_delay: true,
            engine: EngineOptions::default(),
            response_observers: Vec::new(),
            url_predicates: Vec::new(),
            url_observers: Vec::new(),
        }
    }

    /// Sets the maximum run duration
    pub fn max_runtime(mut self, max_runtime: Duration) -> Self {
        self.max_runtime = max_runtime;
        self
    }

    /// Sets the starting delay between requests
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the rate limiter's adjustment step
    pub fn delay_step(mut self, step: Duration) -> Self {
        self.delay_step = step;
        self
    }

    /// Enables or disables honoring robots.txt Crawl-delay
    pub fn honor_crawl_delay(mut self, honor: bool) -> Self {
        self.honor_crawl_delay = honor;
        self
    }

    /// Sets the engine options
    pub fn engine_options(mut self, options: EngineOptions) -> Self {
        self.engine = options;
        self
    }

    /// Adds a response observer
    pub fn on_response<F>(mut self, observer: F) -> Self
    where
        F: Fn(&PageResponse) + Send + Sync + 'static,
    {
        self.response_observers.push(Arc::new(observer));
        self
    }

    /// Adds a URL predicate
    pub fn url_filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.url_predicates.push(Arc::new(predicate));
        self
    }

    /// Adds a URL observer
    pub fn on_url<F>(mut self, observer: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.url_observers.push(Arc::new(observer));
        self
    }
}

impl fmt::Debug for CrawlProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrawlProfile")
            .field("website", &self.website)
            .field("user_agent", &self.user_agent)
            .field("max_runtime", &self.max_runtime)
            .field("initial_delay", &self.initial_delay)
            .field("delay_step", &self.delay_step)
            .field("honor_crawl_delay", &self.honor_crawl_delay)
            .field("engine", &self.engine)
            .field("response_observers", &self.response_observers.len())
            .field("url_predicates", &self.url_predicates.len())
            .field("url_observers", &self.url_observers.len())
            .finish()
    }
}
