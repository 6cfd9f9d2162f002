//! Run-scoped shared state
//!
//! The two structures mutated concurrently by engine callbacks during a run.
//!
//! # Components
//!
//! - `RateLimiter`: adaptive request delay adjusted by server feedback
//! - `VisitSet`: at-most-once admission gate for discovered URLs

mod limiter;
mod visited;

// Re-export main types
pub use limiter::{RateLimiter, DEFAULT_DELAY_STEP};
pub use visited::VisitSet;
