//! Repository traits (ports) - define the interface for data access
//!
//! These traits follow the Repository pattern from Domain-Driven Design.
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::{LookupEntry, Session, TokenBlacklistEntry};
use crate::error::DomainError;
use crate::value_objects::RefreshTokenHash;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Lookup Repository
// ============================================================================

/// Cross-tenant `user_tenant_lookup` table.
///
/// Emails are compared in normalized form; usernames are compared exactly.
#[async_trait]
pub trait LookupRepository: Send + Sync {
    /// Find the entry for an email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<LookupEntry>>;

    /// Find the entry for a username inside one tenant
    async fn find_by_username(
        &self,
        username: &str,
        tenant_slug: &str,
    ) -> RepoResult<Option<LookupEntry>>;

    /// All entries that point at a user id
    async fn find_by_user_id(&self, user_id: Uuid) -> RepoResult<Vec<LookupEntry>>;

    /// Insert, or overwrite the row with the same email
    async fn upsert(&self, entry: &LookupEntry) -> RepoResult<()>;

    /// Move a user to a new email in one step: drop `old_email`, upsert `entry`
    async fn replace_email(&self, old_email: &str, entry: &LookupEntry) -> RepoResult<()>;

    /// Delete by email, returning the number of rows removed
    async fn delete_by_email(&self, email: &str) -> RepoResult<u64>;

    /// Delete every row for a user id, returning the number of rows removed
    async fn delete_by_user_id(&self, user_id: Uuid) -> RepoResult<u64>;
}

// ============================================================================
// Session Repository
// ============================================================================

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session
    async fn create(&self, session: &Session) -> RepoResult<()>;

    /// Find a session that is neither revoked nor expired by its current refresh hash
    async fn find_active_by_token_hash(
        &self,
        hash: &RefreshTokenHash,
    ) -> RepoResult<Option<Session>>;

    /// Find a session by id regardless of state
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Session>>;

    /// Swap the refresh hash of an active session, only if it still holds `current`.
    ///
    /// Returns `false` when another refresh already rotated the session, or it is no
    /// longer active.
    async fn rotate_token_hash(
        &self,
        id: Uuid,
        current: &RefreshTokenHash,
        next: &RefreshTokenHash,
    ) -> RepoResult<bool>;

    /// Revoke one session by id
    async fn revoke(&self, id: Uuid) -> RepoResult<bool>;

    /// Revoke the session holding a refresh hash
    async fn revoke_by_token_hash(&self, hash: &RefreshTokenHash) -> RepoResult<bool>;

    /// Revoke every live session of a user
    async fn revoke_all_for_user(&self, user_id: Uuid) -> RepoResult<u64>;

    /// Delete sessions that are expired or revoked
    async fn delete_expired(&self) -> RepoResult<u64>;
}

// ============================================================================
// Token Blacklist Repository
// ============================================================================

#[async_trait]
pub trait TokenBlacklistRepository: Send + Sync {
    /// Blacklist a token id; adding the same jti twice is a no-op
    async fn add(&self, entry: &TokenBlacklistEntry) -> RepoResult<()>;

    /// Whether a token id is blacklisted and the entry has not yet expired
    async fn contains(&self, token_jti: &str) -> RepoResult<bool>;

    /// Drop entries whose tokens have expired anyway
    async fn purge_expired(&self) -> RepoResult<u64>;
}
