//! Session entity - one logged-in device, tracked by the hash of its refresh token

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::value_objects::{ClientMeta, RefreshTokenHash};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub refresh_token_hash: RefreshTokenHash,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(
        id: Uuid,
        user_id: Uuid,
        refresh_token_hash: RefreshTokenHash,
        expires_at: DateTime<Utc>,
        client: ClientMeta,
    ) -> Self {
        Self {
            id,
            user_id,
            refresh_token_hash,
            user_agent: client.user_agent,
            ip_address: client.ip_address,
            expires_at,
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        }
    }

    #[inline]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// A session is honored only while neither revoked nor expired
    #[inline]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked() && !self.is_expired(now)
    }

    /// Eligible for the periodic sweep
    #[inline]
    pub fn is_sweepable(&self, now: DateTime<Utc>) -> bool {
        self.is_revoked() || self.expires_at < now
    }
}
