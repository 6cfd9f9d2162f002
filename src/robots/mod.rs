//! Robots.txt handling module
//!
//! This module fetches a site's robots.txt once per run and answers whether a
//! URL may be visited by the crawler's user agent and by every agent token
//! embedded in it.

mod agent;
mod parser;

pub use agent::agent_variants;
pub use parser::ParsedRobots;

use crate::state::RateLimiter;
use crate::{RobotsError, RobotsResult};
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Well-known location of the crawling rules document
pub const ROBOTS_TXT: &str = "robots.txt";

/// Crawling policy of one site for one user agent
///
/// Built once per run and read-only afterwards, so it can be shared between
/// concurrent engine callbacks behind an `Arc`.
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    rules: ParsedRobots,
    user_agent: String,
    variants: Vec<String>,
}

impl RobotsPolicy {
    /// Creates a policy from already fetched robots.txt content
    pub fn from_content(content: &str, user_agent: &str) -> Self {
        Self {
            rules: ParsedRobots::from_content(content),
            user_agent: user_agent.to_string(),
            variants: agent_variants(user_agent),
        }
    }

    /// Fetches robots.txt for `website` and builds the policy
    ///
    /// A HEAD request must answer 200 before the document is downloaded with
    /// GET; the limiter paces the two requests. Any non-200 status, transport
    /// failure or non UTF-8 body is an error. Nothing is retried.
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for both requests
    /// * `website` - Site origin, e.g. `https://example.com` or `https://example.com/`
    /// * `user_agent` - Sent in the `User-Agent` header and used for matching
    /// * `limiter` - Paces the GET after the HEAD
    pub async fn fetch(
        client: &Client,
        website: &str,
        user_agent: &str,
        limiter: &RateLimiter,
    ) -> RobotsResult<Self> {
        let robots_url = robots_url(website)?;

        let head = client
            .head(robots_url.clone())
            .header(USER_AGENT, user_agent)
            .send()
            .await?;
        if head.status() != StatusCode::OK {
            return Err(RobotsError::Status {
                method: "HEAD",
                url: robots_url.to_string(),
                status: head.status(),
            });
        }

        limiter.sleep().await;

        let response = client
            .get(robots_url.clone())
            .header(USER_AGENT, user_agent)
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(RobotsError::Status {
                method: "GET",
                url: robots_url.to_string(),
                status: response.status(),
            });
        }

        let body = response.bytes().await?;
        let content = String::from_utf8(body.to_vec())?;

        tracing::info!(
            "Fetched {} ({} bytes) for agent variants {:?}",
            robots_url,
            content.len(),
            agent_variants(user_agent)
        );

        Ok(Self::from_content(&content, user_agent))
    }

    /// Checks whether `url` may be visited by `user_agent`
    ///
    /// The URL must be allowed for the literal user agent string and for every
    /// variant derived from it by [`agent_variants`]; a single refusal wins.
    pub fn allows(&self, url: &str, user_agent: &str) -> bool {
        if !self.rules.is_allowed(url, user_agent) {
            return false;
        }

        if user_agent == self.user_agent {
            self.variants
                .iter()
                .all(|variant| self.rules.is_allowed(url, variant))
        } else {
            agent_variants(user_agent)
                .iter()
                .all(|variant| self.rules.is_allowed(url, variant))
        }
    }

    /// Returns the crawl delay that applies to `user_agent`, if declared
    pub fn crawl_delay(&self, user_agent: &str) -> Option<Duration> {
        self.rules
            .crawl_delay(user_agent)
            .or_else(|| {
                agent_variants(user_agent)
                    .iter()
                    .filter_map(|variant| self.rules.crawl_delay(variant))
                    .reduce(f64::max)
            })
            .map(Duration::from_secs_f64)
    }

    /// Returns the user agent the policy was built for
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the agent variants checked alongside the user agent
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Returns the parsed rules
    pub fn rules(&self) -> &ParsedRobots {
        &self.rules
    }
}

/// Builds the robots.txt URL for a site root
///
/// `website` is expected to be an origin such as `https://example.com:8080`;
/// the crawler passes the seed's origin, so a seed of
/// `https://example.com/wiki/` reads `https://example.com/robots.txt`. One
/// trailing `/` is dropped before `/robots.txt` is appended; any other path
/// is kept as given.
pub fn robots_url(website: &str) -> RobotsResult<Url> {
    let base = website.strip_suffix('/').unwrap_or(website);
    Ok(Url::parse(&format!("{}/{}", base, ROBOTS_TXT))?)
}
