//! Poll interval policy for non-terminal executions.

use std::time::Duration;

/// First delay after a non-terminal observation.
pub const INITIAL_POLL_INTERVAL: Duration = Duration::from_millis(500);
/// Upper bound on the delay between two polls.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Exponential backoff settings used by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial: INITIAL_POLL_INTERVAL,
            max: MAX_POLL_INTERVAL,
        }
    }
}

impl PollPolicy {
    /// Fresh delay sequence for one wait.
    pub fn backoff(&self) -> Backoff {
        Backoff {
            next: self.initial.min(self.max),
            max: self.max,
        }
    }
}

/// Doubling delay sequence. Never resets and has no jitter.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max: Duration,
}

impl Backoff {
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = delay.saturating_mul(2).min(self.max);
        delay
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.next_delay())
    }
}
