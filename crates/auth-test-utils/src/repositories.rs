//! In-memory repositories.
//!
//! Each one enforces the constraints of its table, so service tests see the same
//! conflicts and compare-and-swap outcomes the Postgres implementations produce.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use auth_core::entities::{LookupEntry, Session, TokenBlacklistEntry};
use auth_core::error::DomainError;
use auth_core::traits::{
    LookupRepository, RepoResult, SessionRepository, TokenBlacklistRepository,
};
use auth_core::value_objects::{normalize_email, RefreshTokenHash};

// ============================================================================
// Lookup
// ============================================================================

/// `user_tenant_lookup` keyed by normalized email
#[derive(Debug, Default)]
pub struct InMemoryLookupRepository {
    rows: RwLock<HashMap<String, LookupEntry>>,
}

impl InMemoryLookupRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed rows directly, bypassing the trait
    pub fn with_entries(entries: impl IntoIterator<Item = LookupEntry>) -> Self {
        let repo = Self::new();
        {
            let mut rows = repo.rows.write();
            for entry in entries {
                rows.insert(entry.email.clone(), entry);
            }
        }
        repo
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    pub fn all(&self) -> Vec<LookupEntry> {
        self.rows.read().values().cloned().collect()
    }

    fn upsert_locked(rows: &mut HashMap<String, LookupEntry>, entry: &LookupEntry) -> RepoResult<()> {
        let email = normalize_email(&entry.email);

        if let Some(username) = entry.username.as_deref() {
            let taken = rows.values().any(|row| {
                row.email != email
                    && row.tenant_slug == entry.tenant_slug
                    && row.username.as_deref() == Some(username)
            });
            if taken {
                return Err(DomainError::UsernameAlreadyExists {
                    username: username.to_string(),
                    tenant_slug: entry.tenant_slug.clone(),
                });
            }
        }

        let now = Utc::now();
        let created_at = rows.get(&email).map_or(now, |row| row.created_at);
        rows.insert(
            email.clone(),
            LookupEntry {
                email,
                created_at,
                updated_at: now,
                ..entry.clone()
            },
        );
        Ok(())
    }
}

#[async_trait]
impl LookupRepository for InMemoryLookupRepository {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<LookupEntry>> {
        Ok(self.rows.read().get(&normalize_email(email)).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
        tenant_slug: &str,
    ) -> RepoResult<Option<LookupEntry>> {
        let (username, tenant_slug) = (username.trim(), tenant_slug.trim());
        Ok(self
            .rows
            .read()
            .values()
            .find(|row| row.tenant_slug == tenant_slug && row.username.as_deref() == Some(username))
            .cloned())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> RepoResult<Vec<LookupEntry>> {
        let mut rows: Vec<_> = self
            .rows
            .read()
            .values()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.created_at);
        Ok(rows)
    }

    async fn upsert(&self, entry: &LookupEntry) -> RepoResult<()> {
        Self::upsert_locked(&mut self.rows.write(), entry)
    }

    async fn replace_email(&self, old_email: &str, entry: &LookupEntry) -> RepoResult<()> {
        let mut rows = self.rows.write();
        let removed = rows.remove(&normalize_email(old_email));
        if let Err(e) = Self::upsert_locked(&mut rows, entry) {
            // Roll back like the transaction would.
            if let Some(row) = removed {
                rows.insert(row.email.clone(), row);
            }
            return Err(e);
        }
        Ok(())
    }

    async fn delete_by_email(&self, email: &str) -> RepoResult<u64> {
        Ok(u64::from(self.rows.write().remove(&normalize_email(email)).is_some()))
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> RepoResult<u64> {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|_, row| row.user_id != user_id);
        Ok((before - rows.len()) as u64)
    }
}

// ============================================================================
// Sessions
// ============================================================================

/// `sessions` keyed by id, with a unique refresh-token hash
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Snapshot of one session regardless of state
    pub fn get(&self, id: Uuid) -> Option<Session> {
        self.sessions.read().get(&id).cloned()
    }

    /// Push a session's expiry into the past
    pub fn expire(&self, id: Uuid) {
        if let Some(session) = self.sessions.write().get_mut(&id) {
            session.expires_at = Utc::now() - chrono::Duration::seconds(1);
        }
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: &Session) -> RepoResult<()> {
        let mut sessions = self.sessions.write();
        let clash = sessions.contains_key(&session.id)
            || sessions
                .values()
                .any(|s| s.refresh_token_hash == session.refresh_token_hash);
        if clash {
            return Err(DomainError::InternalError(
                "session id or token hash already in use".to_string(),
            ));
        }
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn find_active_by_token_hash(
        &self,
        hash: &RefreshTokenHash,
    ) -> RepoResult<Option<Session>> {
        let now = Utc::now();
        Ok(self
            .sessions
            .read()
            .values()
            .find(|s| &s.refresh_token_hash == hash && s.is_active(now))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Session>> {
        Ok(self.get(id))
    }

    async fn rotate_token_hash(
        &self,
        id: Uuid,
        current: &RefreshTokenHash,
        next: &RefreshTokenHash,
    ) -> RepoResult<bool> {
        let now = Utc::now();
        let mut sessions = self.sessions.write();
        match sessions.get_mut(&id) {
            Some(s) if &s.refresh_token_hash == current && s.is_active(now) => {
                s.refresh_token_hash = next.clone();
                s.last_used_at = Some(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke(&self, id: Uuid) -> RepoResult<bool> {
        let mut sessions = self.sessions.write();
        match sessions.get_mut(&id) {
            Some(s) if !s.is_revoked() => {
                s.revoked_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_by_token_hash(&self, hash: &RefreshTokenHash) -> RepoResult<bool> {
        let mut sessions = self.sessions.write();
        let target = sessions
            .values_mut()
            .find(|s| &s.refresh_token_hash == hash && !s.is_revoked());
        match target {
            Some(s) => {
                s.revoked_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> RepoResult<u64> {
        let now = Utc::now();
        let mut revoked = 0;
        for s in self.sessions.write().values_mut() {
            if s.user_id == user_id && !s.is_revoked() {
                s.revoked_at = Some(now);
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn delete_expired(&self) -> RepoResult<u64> {
        let now = Utc::now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_sweepable(now));
        Ok((before - sessions.len()) as u64)
    }
}

// ============================================================================
// Token blacklist
// ============================================================================

/// `token_blacklist` keyed by jti
#[derive(Debug, Default)]
pub struct InMemoryBlacklistRepository {
    entries: RwLock<HashMap<String, TokenBlacklistEntry>>,
}

impl InMemoryBlacklistRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl TokenBlacklistRepository for InMemoryBlacklistRepository {
    async fn add(&self, entry: &TokenBlacklistEntry) -> RepoResult<()> {
        self.entries
            .write()
            .entry(entry.token_jti.clone())
            .or_insert_with(|| entry.clone());
        Ok(())
    }

    async fn contains(&self, token_jti: &str) -> RepoResult<bool> {
        let now = Utc::now();
        Ok(self
            .entries
            .read()
            .get(token_jti)
            .is_some_and(|e| !e.is_expired(now)))
    }

    async fn purge_expired(&self) -> RepoResult<u64> {
        let now = Utc::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        Ok((before - entries.len()) as u64)
    }
}
