//! Crawler coordinator - run lifetime of one crawl
//!
//! A run moves through these stages and ends at the first of them to fail:
//! - parse the site URL
//! - fetch robots.txt and check the seed against it
//! - build the engine and dispatch the seed
//!
//! followed by the crawl itself, which lets the engine discover pages until
//! its queue drains. One deadline, fixed when the run starts, bounds every
//! stage after the URL is parsed.

use crate::crawler::pipeline::RunHooks;
use crate::crawler::CrawlProfile;
use crate::engine::{
    build_http_client, EngineFactory, EngineOptions, FetchEngine, HttpEngineFactory,
};
use crate::output::{RunInfo, RunStats, RunSummary};
use crate::robots::RobotsPolicy;
use crate::state::{RateLimiter, VisitSet};
use crate::{CrawlError, RobotsError};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Drives one crawl run per call to [`Crawler::run`]
///
/// The crawler keeps no state between runs: robots policy, rate limiter and
/// visit set are created fresh by every run, so a single `Crawler` can run
/// repeatedly or concurrently without cross-contamination.
#[derive(Clone)]
pub struct Crawler {
    profile: Arc<CrawlProfile>,
    factory: Arc<dyn EngineFactory>,
}

impl Crawler {
    /// Creates a crawler that fetches pages with the default HTTP engine
    pub fn new(profile: CrawlProfile) -> Self {
        Self::with_engine(profile, HttpEngineFactory)
    }

    /// Creates a crawler that builds its engine with `factory`
    pub fn with_engine(profile: CrawlProfile, factory: impl EngineFactory + 'static) -> Self {
        Self {
            profile: Arc::new(profile),
            factory: Arc::new(factory),
        }
    }

    /// Returns the profile runs are configured with
    pub fn profile(&self) -> &CrawlProfile {
        &self.profile
    }

    /// Crawls the profile's site
    ///
    /// Returns once the engine has nothing left to fetch or the profile's
    /// maximum runtime has elapsed, whichever comes first. The deadline is
    /// computed when the call starts and also bounds the robots.txt fetch and
    /// the pacing before the seed. In-flight requests are abandoned at the
    /// deadline.
    ///
    /// # Errors
    ///
    /// Only failures before the seed is dispatched are returned: a malformed
    /// site URL, an unavailable robots.txt, a seed the robots rules forbid,
    /// an engine that cannot be built, or a deadline that fires first.
    /// Failures of individual pages and links are logged and counted in the
    /// summary.
    pub async fn run(&self) -> Result<RunSummary, CrawlError> {
        let profile = &self.profile;
        let started_at = Utc::now();
        let start = Instant::now();
        let deadline = start + profile.max_runtime;

        let seed = parse_seed(&profile.website)?;
        let user_agent = profile.user_agent.as_str();

        let Dispatch {
            robots,
            limiter,
            engine,
        } = tokio::time::timeout_at(deadline, self.prepare(&seed))
            .await
            .map_err(|_| {
                tracing::warn!(
                    "Maximum runtime of {:?} reached before dispatching {}",
                    profile.max_runtime,
                    seed
                );
                CrawlError::DeadlineBeforeDispatch {
                    max_runtime: profile.max_runtime,
                }
            })??;

        let visited = Arc::new(VisitSet::new());
        let stats = Arc::new(RunStats::new());
        visited.add(seed.as_str());

        let hooks = Arc::new(RunHooks::new(
            Arc::clone(profile),
            seed.clone(),
            Arc::new(robots),
            Arc::clone(&limiter),
            Arc::clone(&visited),
            Arc::clone(&stats),
        ));

        tracing::info!(
            "Crawling {} as '{}' (delay {:?}, max runtime {:?})",
            seed,
            user_agent,
            limiter.current_delay(),
            profile.max_runtime
        );

        let deadline_reached =
            match tokio::time::timeout_at(deadline, engine.run(seed.clone(), hooks)).await {
                Ok(Ok(())) => {
                    tracing::info!("No more pages to crawl on {}", seed);
                    false
                }
                Ok(Err(e)) => {
                    tracing::warn!("Engine stopped early: {}", e);
                    false
                }
                Err(_) => {
                    tracing::info!("Maximum runtime of {:?} reached", profile.max_runtime);
                    true
                }
            };

        let summary = stats.snapshot(RunInfo {
            website: profile.website.clone(),
            started_at,
            elapsed: start.elapsed(),
            deadline_reached,
            final_delay: limiter.current_delay(),
        });

        tracing::info!(
            "Run finished: {} pages fetched, {} URLs visited, {} failures in {:.1}s",
            summary.pages_fetched,
            visited.len(),
            summary.fetch_failures,
            summary.elapsed.as_secs_f64()
        );

        Ok(summary)
    }

    /// Fetches the policy, checks the seed and builds the engine
    async fn prepare(&self, seed: &Url) -> Result<Dispatch, CrawlError> {
        let profile = &self.profile;
        let user_agent = profile.user_agent.as_str();

        // The robots requests are paced like page requests
        let client = build_http_client(user_agent, profile.engine.request_timeout)
            .map_err(RobotsError::from)?;
        let bootstrap = RateLimiter::with_step(profile.initial_delay, profile.delay_step);
        let robots = RobotsPolicy::fetch(
            &client,
            &seed.origin().ascii_serialization(),
            user_agent,
            &bootstrap,
        )
        .await?;

        if !robots.allows(seed.as_str(), user_agent) {
            return Err(CrawlError::PolicyViolation {
                url: seed.to_string(),
                user_agent: user_agent.to_string(),
            });
        }

        let limiter = Arc::new(RateLimiter::with_step(
            run_floor(profile, &robots),
            profile.delay_step,
        ));
        limiter.sleep().await;

        let engine = self.factory.build(EngineOptions {
            user_agent: user_agent.to_string(),
            max_depth: None,
            ..profile.engine.clone()
        })?;

        Ok(Dispatch {
            robots,
            limiter,
            engine,
        })
    }
}

/// Everything a run needs once the seed is cleared for dispatch
struct Dispatch {
    robots: RobotsPolicy,
    limiter: Arc<RateLimiter>,
    engine: Box<dyn FetchEngine>,
}

/// Parses the site URL into the seed of a run
fn parse_seed(website: &str) -> Result<Url, CrawlError> {
    let seed = Url::parse(website).map_err(|source| CrawlError::InvalidUrl {
        url: website.to_string(),
        source,
    })?;

    if seed.host_str().is_none() {
        return Err(CrawlError::MissingHost(website.to_string()));
    }

    Ok(seed)
}

/// Picks the delay floor of a run
///
/// The site's Crawl-delay replaces the configured delay when honored and
/// higher.
fn run_floor(profile: &CrawlProfile, robots: &RobotsPolicy) -> Duration {
    if !profile.honor_crawl_delay {
        return profile.initial_delay;
    }

    match robots.crawl_delay(&profile.user_agent) {
        Some(crawl_delay) if crawl_delay > profile.initial_delay => {
            tracing::info!("Honoring robots.txt Crawl-delay of {:?}", crawl_delay);
            crawl_delay
        }
        _ => profile.initial_delay,
    }
}
