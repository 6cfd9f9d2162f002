//! Run output
//!
//! Counters collected while a run is in progress and the summary printed
//! when it ends.

mod stats;

pub use stats::{print_summary, RunInfo, RunStats, RunSummary};
