//! Token blacklist entry - an access token revoked before its natural expiry

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBlacklistEntry {
    pub token_jti: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl TokenBlacklistEntry {
    pub fn new(token_jti: impl Into<String>, user_id: Uuid, expires_at: DateTime<Utc>) -> Self {
        Self {
            token_jti: token_jti.into(),
            user_id,
            expires_at,
        }
    }

    /// Entries past the token's own expiry no longer block anything and can be purged
    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
