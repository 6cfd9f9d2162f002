//! Crawler module: the politeness layer around a fetch engine
//!
//! This module contains:
//! - the per-run profile and its extension points
//! - the admission pipeline injected into the engine as hooks
//! - the coordinator owning the lifetime of a run

mod coordinator;
mod pipeline;
mod profile;

pub use coordinator::Crawler;
pub use pipeline::{Admission, RejectReason, RunHooks};
pub use profile::{
    CrawlProfile, ResponseObserver, UrlObserver, UrlPredicate, DEFAULT_INITIAL_DELAY,
    DEFAULT_MAX_RUNTIME,
};

use crate::output::RunSummary;
use crate::CrawlError;

/// Runs a complete crawl with the default HTTP engine
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Fetch the site's robots.txt and check the seed against it
/// 2. Build the engine and dispatch the seed
/// 3. Follow admitted links until the site is exhausted or time runs out
///
/// # Arguments
///
/// * `profile` - The run configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - The run ended, by exhaustion or by deadline
/// * `Err(CrawlError)` - The run could not start
pub async fn crawl(profile: CrawlProfile) -> Result<RunSummary, CrawlError> {
    Crawler::new(profile).run().await
}
