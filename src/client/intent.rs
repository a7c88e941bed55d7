//! # Sync Intent
//!
//! A client-local, transient marker meaning "local state changed, must
//! push". Created on the first unacknowledged mutation, refreshed by
//! further mutations, cleared only by a successful push acknowledgment.
//! At most one intent exists per client; overlapping mutations extend it
//! rather than queueing separate pushes.

use chrono::{DateTime, Utc};

/// Pending-push marker for unacknowledged local mutations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncIntent {
    /// When the first unacknowledged mutation happened
    pub created_at: DateTime<Utc>,
    /// When the most recent mutation extended this intent
    pub last_mutation_at: DateTime<Utc>,
    /// Push attempts made for this intent so far
    pub attempts: u32,
    /// Error message from the last failed attempt
    pub last_error: Option<String>,
}

impl SyncIntent {
    /// Create an intent for a mutation that just happened
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            last_mutation_at: now,
            attempts: 0,
            last_error: None,
        }
    }

    /// Extend the intent with another mutation
    pub fn touch(&mut self) {
        self.last_mutation_at = Utc::now();
    }

    /// Record the start of a push attempt
    pub fn mark_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    /// Record a failed push attempt
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
    }
}

impl Default for SyncIntent {
    fn default() -> Self {
        Self::new()
    }
}
