//! Linear reconnect backoff, bounded and jittered.

use std::time::Duration;

use rand::Rng;

/// Upper bound on the random jitter added to every delay, in milliseconds.
/// Keeps a fleet of clients from reconnecting in lockstep after an outage.
const JITTER_MS: u64 = 250;

/// Linear backoff: the n-th consecutive failure waits `min * n`, capped at
/// `max`, plus random jitter. The attempt counter only ever resets on a
/// successful connection — retries continue indefinitely.
#[derive(Debug)]
pub struct LinearBackoff {
    min: Duration,
    max: Duration,
    attempt: u32,
}

impl LinearBackoff {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
            attempt: 0,
        }
    }

    /// Number of consecutive failures recorded so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Records a failure and returns how long to wait before the next try.
    pub fn next_delay(&mut self) -> Duration {
        self.attempt = self.attempt.saturating_add(1);
        let base = self.min.saturating_mul(self.attempt).min(self.max);
        let jitter = rand::thread_rng().gen_range(0..=JITTER_MS);
        base + Duration::from_millis(jitter)
    }

    /// Clears the failure streak after a successful connection.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}
