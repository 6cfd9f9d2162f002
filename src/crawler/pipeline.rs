//! Admission pipeline
//!
//! [`RunHooks`] is what the crawler injects into the fetch engine. It owns no
//! state of its own: the policy, limiter, visit set and counters of the run
//! are shared with the coordinator by reference.
//!
//! # Admission order
//!
//! Every discovered anchor goes through these steps, stopping at the first
//! rejection:
//! 1. URL observers (always, when the URL is non-empty)
//! 2. `rel="nofollow"`
//! 3. malformed URL
//! 4. already visited
//! 5. different host than the seed
//! 6. disallowed by robots.txt
//! 7. user predicates
//! 8. atomic test-and-mark in the visit set

use crate::crawler::CrawlProfile;
use crate::engine::{
    DiscoveredLink, EngineHooks, FetchFailure, LinkVerdict, PageRequest, PageResponse,
};
use crate::output::RunStats;
use crate::robots::RobotsPolicy;
use crate::state::{RateLimiter, VisitSet};
use crate::url::same_host;
use async_trait::async_trait;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use url::Url;

/// Why a discovered link was not followed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    NoFollow,
    Malformed,
    AlreadyVisited,
    CrossHost,
    Robots,
    Filtered,
}

impl RejectReason {
    /// Number of variants
    pub const COUNT: usize = 6;

    /// Every variant, in pipeline order
    pub const ALL: [RejectReason; Self::COUNT] = [
        RejectReason::NoFollow,
        RejectReason::Malformed,
        RejectReason::AlreadyVisited,
        RejectReason::CrossHost,
        RejectReason::Robots,
        RejectReason::Filtered,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            RejectReason::NoFollow => 0,
            RejectReason::Malformed => 1,
            RejectReason::AlreadyVisited => 2,
            RejectReason::CrossHost => 3,
            RejectReason::Robots => 4,
            RejectReason::Filtered => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::NoFollow => "nofollow",
            RejectReason::Malformed => "malformed",
            RejectReason::AlreadyVisited => "already visited",
            RejectReason::CrossHost => "cross host",
            RejectReason::Robots => "robots.txt",
            RejectReason::Filtered => "filtered",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of running a link through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The link passed every check and is now marked visited
    Admit(Url),

    /// The link was rejected
    Reject(RejectReason),
}

/// Engine hooks of one run
pub struct RunHooks {
    profile: Arc<CrawlProfile>,
    seed: Url,
    robots: Arc<RobotsPolicy>,
    limiter: Arc<RateLimiter>,
    visited: Arc<VisitSet>,
    stats: Arc<RunStats>,
}

impl RunHooks {
    pub fn new(
        profile: Arc<CrawlProfile>,
        seed: Url,
        robots: Arc<RobotsPolicy>,
        limiter: Arc<RateLimiter>,
        visited: Arc<VisitSet>,
        stats: Arc<RunStats>,
    ) -> Self {
        Self {
            profile,
            seed,
            robots,
            limiter,
            visited,
            stats,
        }
    }

    /// Runs `link` through the admission pipeline
    ///
    /// On admission the URL is already marked visited; the caller only has to
    /// pace itself and hand the URL to the engine.
    pub fn admit(&self, link: &DiscoveredLink) -> Admission {
        if !link.url.is_empty() {
            self.notify_url_observers(&link.url);
        }

        if link.is_nofollow() {
            return Admission::Reject(RejectReason::NoFollow);
        }

        let url = match Url::parse(&link.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Malformed link '{}' on {}: {}", link.href, link.source, e);
                return Admission::Reject(RejectReason::Malformed);
            }
        };

        if self.visited.is_visited(&link.url) {
            return Admission::Reject(RejectReason::AlreadyVisited);
        }

        if !same_host(&url, &self.seed) {
            return Admission::Reject(RejectReason::CrossHost);
        }

        if !self.robots.allows(&link.url, &self.profile.user_agent) {
            return Admission::Reject(RejectReason::Robots);
        }

        if !self.passes_predicates(&link.url) {
            return Admission::Reject(RejectReason::Filtered);
        }

        if !self.visited.insert_if_absent(&link.url) {
            return Admission::Reject(RejectReason::AlreadyVisited);
        }

        Admission::Admit(url)
    }

    fn notify_url_observers(&self, url: &str) {
        for observer in &self.profile.url_observers {
            if catch_unwind(AssertUnwindSafe(|| observer(url))).is_err() {
                tracing::warn!("URL observer panicked on {}", url);
            }
        }
    }

    fn passes_predicates(&self, url: &str) -> bool {
        self.profile.url_predicates.iter().all(|predicate| {
            match catch_unwind(AssertUnwindSafe(|| predicate(url))) {
                Ok(passed) => passed,
                Err(_) => {
                    tracing::warn!("URL predicate panicked on {}, rejecting", url);
                    false
                }
            }
        })
    }

    fn notify_response_observers(&self, response: &PageResponse) {
        for observer in &self.profile.response_observers {
            if catch_unwind(AssertUnwindSafe(|| observer(response))).is_err() {
                tracing::warn!("Response observer panicked on {}", response.url);
            }
        }
    }
}

#[async_trait]
impl EngineHooks for RunHooks {
    async fn before_request(&self, request: &PageRequest) {
        tracing::debug!("Requesting {} (depth {})", request.url, request.depth);
    }

    async fn on_response(&self, response: &PageResponse) {
        self.stats.record_page();
        self.notify_response_observers(response);

        if response.status.is_success() {
            self.limiter.decrease();
        }
    }

    async fn on_link(&self, link: &DiscoveredLink) -> LinkVerdict {
        self.stats.record_link();

        match self.admit(link) {
            Admission::Admit(url) => {
                self.limiter.sleep().await;
                self.stats.record_admission();
                tracing::debug!("Following {}", url);
                LinkVerdict::Follow(url)
            }
            Admission::Reject(reason) => {
                self.stats.record_rejection(reason);
                tracing::debug!("Rejected {} ({})", link.href, reason);
                LinkVerdict::Skip
            }
        }
    }

    async fn on_error(&self, failure: &FetchFailure) {
        let throttled = failure.is_throttled();
        self.stats.record_failure(throttled);

        if throttled {
            self.limiter.increase();
            tracing::warn!(
                "Throttled on {}, delay now {:?}",
                failure.url,
                self.limiter.current_delay()
            );
        } else {
            tracing::warn!("Request to {} failed: {}", failure.url, failure.error);
        }
    }
}
