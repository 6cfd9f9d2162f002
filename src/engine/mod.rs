//! Fetch engine capability
//!
//! The crawler does not fetch or parse pages itself. It drives an engine that,
//! starting from a seed URL, fetches pages, extracts anchors and reports back
//! through four hook points:
//! - `before_request`: a page is about to be requested
//! - `on_response`: a page was fetched with a success status
//! - `on_link`: an anchor was discovered; the hook decides whether to follow it
//! - `on_error`: a request failed or answered with a non-success status
//!
//! Engines may call hooks concurrently from any number of tasks.
//!
//! [`HttpEngine`] is the default implementation (reqwest + scraper).

mod http;
mod links;

pub use http::{build_http_client, HttpEngine, HttpEngineFactory};
pub use links::extract_links;

use crate::EngineResult;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A page the engine is about to request
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// URL to fetch
    pub url: Url,

    /// Number of links followed from the seed to reach this page
    pub depth: usize,
}

/// A fetched page
#[derive(Debug, Clone)]
pub struct PageResponse {
    /// URL that was requested
    pub url: Url,

    /// URL after redirects
    pub final_url: Url,

    /// HTTP status code
    pub status: StatusCode,

    /// Response headers
    pub headers: HeaderMap,

    /// Raw body
    pub body: Vec<u8>,

    /// Depth of the page that was requested
    pub depth: usize,
}

impl PageResponse {
    /// Returns the body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Returns the Content-Type header value, if present
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Returns true if the response declares an HTML body
    pub fn is_html(&self) -> bool {
        self.content_type()
            .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
            .unwrap_or(false)
    }
}

/// An anchor found on a fetched page
#[derive(Debug, Clone)]
pub struct DiscoveredLink {
    /// Absolute target URL; empty when the href could not be resolved
    pub url: String,

    /// Raw `href` attribute
    pub href: String,

    /// Raw `rel` attribute, if any
    pub rel: Option<String>,

    /// Page the anchor was found on
    pub source: Url,

    /// Depth the target would have if followed
    pub depth: usize,
}

impl DiscoveredLink {
    /// Returns true if the anchor carries a `nofollow` rel token
    pub fn is_nofollow(&self) -> bool {
        self.rel
            .as_deref()
            .map(|rel| {
                rel.split_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("nofollow"))
            })
            .unwrap_or(false)
    }
}

/// A request that did not produce a successful response
#[derive(Debug, Clone)]
pub struct FetchFailure {
    /// URL that was requested
    pub url: Url,

    /// Status code, when the server answered
    pub status: Option<StatusCode>,

    /// Description of the failure
    pub error: String,
}

impl FetchFailure {
    /// Returns true if the server asked the crawler to slow down
    pub fn is_throttled(&self) -> bool {
        self.status == Some(StatusCode::TOO_MANY_REQUESTS)
    }
}

/// Decision returned by [`EngineHooks::on_link`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkVerdict {
    /// Fetch this URL next
    Follow(Url),

    /// Do not fetch the link
    Skip,
}

/// Callbacks an engine invokes while it runs
#[async_trait]
pub trait EngineHooks: Send + Sync {
    /// Called before every request
    async fn before_request(&self, request: &PageRequest);

    /// Called once per successfully fetched page
    async fn on_response(&self, response: &PageResponse);

    /// Called once per anchor found on a fetched page
    async fn on_link(&self, link: &DiscoveredLink) -> LinkVerdict;

    /// Called when a request fails or answers with a non-success status
    async fn on_error(&self, failure: &FetchFailure);
}

/// A page-fetching and link-extracting engine
#[async_trait]
pub trait FetchEngine: Send + Sync {
    /// Crawls from `seed`, reporting through `hooks`
    ///
    /// Resolves once every followed page has been processed. Dropping the
    /// returned future abandons in-flight work.
    async fn run(&self, seed: Url, hooks: Arc<dyn EngineHooks>) -> EngineResult<()>;
}

/// Options handed to an engine when it is built
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Value of the User-Agent header
    pub user_agent: String,

    /// Maximum number of requests in flight
    pub parallelism: usize,

    /// Timeout of a single request
    pub request_timeout: Duration,

    /// Domain globs the engine may fetch from; empty means any
    pub allowed_domains: Vec<String>,

    /// Maximum link depth from the seed; `None` means unbounded
    pub max_depth: Option<usize>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            user_agent: concat!("polite-crawler/", env!("CARGO_PKG_VERSION")).to_string(),
            parallelism: 2,
            request_timeout: Duration::from_secs(30),
            allowed_domains: Vec::new(),
            max_depth: None,
        }
    }
}

/// Builds an engine for a run
pub trait EngineFactory: Send + Sync {
    /// Creates an engine configured with `options`
    fn build(&self, options: EngineOptions) -> EngineResult<Box<dyn FetchEngine>>;
}

impl<F> EngineFactory for F
where
    F: Fn(EngineOptions) -> EngineResult<Box<dyn FetchEngine>> + Send + Sync,
{
    fn build(&self, options: EngineOptions) -> EngineResult<Box<dyn FetchEngine>> {
        self(options)
    }
}
