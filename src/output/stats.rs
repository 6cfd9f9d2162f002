//! Run statistics
//!
//! Counters updated concurrently by the engine hooks and the summary built
//! from them when a run ends.

use crate::crawler::RejectReason;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Live counters of a run
#[derive(Debug, Default)]
pub struct RunStats {
    pages_fetched: AtomicU64,
    fetch_failures: AtomicU64,
    throttle_signals: AtomicU64,
    links_discovered: AtomicU64,
    links_admitted: AtomicU64,
    rejected: [AtomicU64; RejectReason::COUNT],
}

impl RunStats {
    /// Creates zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self, throttled: bool) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
        if throttled {
            self.throttle_signals.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_link(&self) {
        self.links_discovered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_admission(&self) {
        self.links_admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejection(&self, reason: RejectReason) {
        self.rejected[reason.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// Returns how many links were rejected for `reason`
    pub fn rejections(&self, reason: RejectReason) -> u64 {
        self.rejected[reason.index()].load(Ordering::Relaxed)
    }

    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched.load(Ordering::Relaxed)
    }

    pub fn links_admitted(&self) -> u64 {
        self.links_admitted.load(Ordering::Relaxed)
    }

    /// Freezes the counters into a summary
    pub fn snapshot(&self, run: RunInfo) -> RunSummary {
        RunSummary {
            website: run.website,
            started_at: run.started_at,
            finished_at: Utc::now(),
            elapsed: run.elapsed,
            deadline_reached: run.deadline_reached,
            final_delay: run.final_delay,
            pages_fetched: self.pages_fetched(),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            throttle_signals: self.throttle_signals.load(Ordering::Relaxed),
            links_discovered: self.links_discovered.load(Ordering::Relaxed),
            links_admitted: self.links_admitted(),
            rejections: RejectReason::ALL
                .iter()
                .map(|reason| (*reason, self.rejections(*reason)))
                .filter(|(_, count)| *count > 0)
                .collect(),
        }
    }
}

/// Run facts that are not counters
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub website: String,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub deadline_reached: bool,
    pub final_delay: Duration,
}

/// Outcome of a finished run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Site that was crawled
    pub website: String,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run ended
    pub finished_at: DateTime<Utc>,

    /// Wall time of the run
    pub elapsed: Duration,

    /// True if the run was cut off by its maximum runtime
    pub deadline_reached: bool,

    /// Rate limiter delay when the run ended
    pub final_delay: Duration,

    /// Pages fetched with a success status
    pub pages_fetched: u64,

    /// Requests that failed or returned a non-success status
    pub fetch_failures: u64,

    /// HTTP 429 responses
    pub throttle_signals: u64,

    /// Anchors reported by the engine
    pub links_discovered: u64,

    /// Links handed back to the engine
    pub links_admitted: u64,

    /// Rejected links by reason, zero counts omitted
    pub rejections: Vec<(RejectReason, u64)>,
}

/// Prints a run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Site: {}", summary.website);
    println!(
        "Started: {}  Finished: {}",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        summary.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "Elapsed: {:.1}s{}",
        summary.elapsed.as_secs_f64(),
        if summary.deadline_reached {
            " (maximum runtime reached)"
        } else {
            ""
        }
    );
    println!();

    println!("Requests:");
    println!("  Pages fetched: {}", summary.pages_fetched);
    println!("  Failures: {}", summary.fetch_failures);
    println!("  Throttle signals (429): {}", summary.throttle_signals);
    println!("  Final delay: {:?}", summary.final_delay);
    println!();

    println!("Links:");
    println!("  Discovered: {}", summary.links_discovered);
    println!("  Followed: {}", summary.links_admitted);

    if !summary.rejections.is_empty() {
        let mut rejections = summary.rejections.clone();
        rejections.sort_by(|a, b| b.1.cmp(&a.1));
        for (reason, count) in rejections {
            println!("  Rejected ({}): {}", reason, count);
        }
    }
}
