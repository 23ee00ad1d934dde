//! Retry timing and credential-rotation policy, isolated from the HTTP
//! client so it can be exercised without a network.
//!
//! `max_retries` attempts,
//! exponential delay `base * 2^attempt`, and the provider key only rotates
//! once the caller has burned through most of its attempts against a rate
//! limit (HTTP 429).

use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub base_secs: u64,
}

impl BackoffPolicy {
    pub fn new(max_attempts: u32, base_secs: u64) -> Self {
        Self {
            max_attempts,
            base_secs,
        }
    }

    /// Delay before retry attempt `attempt` (0-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        Duration::from_secs(self.base_secs.saturating_mul(1 << attempt))
    }

    /// Whether `attempt` is still within the retry budget.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Whether a 429 on this attempt should rotate to the next credential.
    ///
    /// Rotation only kicks in once the caller is on its last couple
    /// of attempts, so a single transient rate limit early on doesn't burn
    /// through the whole credential pool.
    pub fn should_rotate_credential(&self, attempt: u32, status: u16) -> bool {
        status == 429 && attempt >= self.max_attempts.saturating_sub(1)
    }
}
