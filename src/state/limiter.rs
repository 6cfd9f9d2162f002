use parking_lot::RwLock;
use std::time::Duration;

/// Default adjustment applied by a single throttling or healthy signal
pub const DEFAULT_DELAY_STEP: Duration = Duration::from_secs(1);

/// Delay values shared by every dispatch path of a run
#[derive(Debug, Clone, Copy)]
struct LimiterState {
    /// Delay applied before the next request
    current: Duration,

    /// Lowest value `current` may reach, fixed at construction
    floor: Duration,
}

/// Adaptive delay shared across a crawl run
///
/// Every dispatch path sleeps for the current delay before issuing a request.
/// Throttling responses (HTTP 429) push the delay up by one step and healthy
/// responses pull it back down, never below the delay the limiter was created
/// with. There is no ceiling: sustained throttling keeps slowing the run down.
///
/// Reads (sleeping) take a shared lock and writes (feedback) an exclusive one,
/// so concurrent sleepers never block each other.
#[derive(Debug)]
pub struct RateLimiter {
    state: RwLock<LimiterState>,
    step: Duration,
}

impl RateLimiter {
    /// Creates a limiter whose floor and starting delay are `initial_delay`
    pub fn new(initial_delay: Duration) -> Self {
        Self::with_step(initial_delay, DEFAULT_DELAY_STEP)
    }

    /// Creates a limiter that moves by `step` on every feedback signal
    pub fn with_step(initial_delay: Duration, step: Duration) -> Self {
        Self {
            state: RwLock::new(LimiterState {
                current: initial_delay,
                floor: initial_delay,
            }),
            step,
        }
    }

    /// Blocks the calling task for the current delay
    ///
    /// The lock is only held long enough to read the delay, so feedback
    /// arriving while tasks sleep is applied to the next sleep.
    pub async fn sleep(&self) {
        let delay = self.current_delay();
        if delay.is_zero() {
            return;
        }
        tracing::trace!("Pacing request for {:?}", delay);
        tokio::time::sleep(delay).await;
    }

    /// Slows the run down by one step
    pub fn increase(&self) {
        let mut state = self.state.write();
        state.current = state.current.saturating_add(self.step);
        tracing::debug!("Rate limiter backing off to {:?}", state.current);
    }

    /// Speeds the run up by one step, stopping at the floor
    pub fn decrease(&self) {
        let mut state = self.state.write();
        state.current = state.current.saturating_sub(self.step).max(state.floor);
    }

    /// Returns the delay the next sleep will use
    pub fn current_delay(&self) -> Duration {
        self.state.read().current
    }

    /// Returns the construction-time delay
    pub fn floor(&self) -> Duration {
        self.state.read().floor
    }

    /// Returns the amount a single feedback signal moves the delay
    pub fn step(&self) -> Duration {
        self.step
    }
}
