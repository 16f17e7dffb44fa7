//! Reconnect delay schedule.
//!
//! Doubling delay from `initial_delay`, capped at `max_delay`, with a
//! symmetric random jitter of `randomization` times the delay. The jittered
//! value is clamped to the cap as well, so no wait ever exceeds it. There is
//! no attempt limit; the connection task retries until it is shut down.

#[cfg(test)]
#[path = "backoff_test.rs"]
mod backoff_test;

use std::time::Duration;

use rand::Rng;

use crate::config::ReconnectPolicy;

#[derive(Debug, Clone)]
pub struct Backoff {
    policy: ReconnectPolicy,
    attempt: u32,
}

impl Backoff {
    #[must_use]
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    /// Consecutive failures since the last healthy session.
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Called once a session has received its first server event.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Un-jittered delay for the current attempt.
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        let factor = 1_u32.checked_shl(self.attempt).unwrap_or(u32::MAX);
        self.policy
            .initial_delay
            .saturating_mul(factor)
            .min(self.policy.max_delay)
    }

    /// Delay to wait before the next attempt; advances the attempt counter.
    pub fn next_delay(&mut self) -> Duration {
        let sample = rand::rng().random_range(0.0..1.0);
        let delay = jittered(self.base_delay(), self.policy.randomization, sample).min(self.policy.max_delay);
        self.attempt = self.attempt.saturating_add(1);
        delay
    }
}

/// Scale `base` by `1 ± randomization`, picking the point given by `sample` in `[0, 1)`.
fn jittered(base: Duration, randomization: f64, sample: f64) -> Duration {
    let spread = randomization.clamp(0.0, 1.0);
    let offset = spread * (2.0 * sample.clamp(0.0, 1.0) - 1.0);
    base.mul_f64(1.0 + offset)
}
