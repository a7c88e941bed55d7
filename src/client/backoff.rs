//! # Reconnection Backoff
//!
//! Bounded exponential backoff for reconnection attempts after a
//! handshake failure or a dropped connection. Delays double per attempt
//! and are capped, so a long outage cannot turn into a reconnect storm
//! when the server comes back.

use std::time::Duration;

/// Default first retry delay
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default delay cap
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Bounded exponential backoff state
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    attempt: u32,
}

impl Backoff {
    /// Create a backoff doubling from `base` up to `max`
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max, attempt: 0 }
    }

    /// Delay before the next attempt; advances the attempt counter
    pub fn next_delay(&mut self) -> Duration {
        // Exponent clamp keeps the shift well inside u32 range
        let exponent = self.attempt.min(16);
        let delay = self.base.saturating_mul(2u32.saturating_pow(exponent));
        self.attempt = self.attempt.saturating_add(1);
        delay.min(self.max)
    }

    /// Reset after a successful connection
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Number of delays handed out since the last reset
    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY)
    }
}
