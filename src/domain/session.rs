//! Session claims carried by a signed token.

use chrono::{DateTime, Utc};

/// Verified facts about a session. Never persisted; expiry is the only way a session ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject of the session
    pub email: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Compact signed representation
    pub token: String,
}

impl SessionClaims {
    /// Seconds until expiry, never negative.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}
