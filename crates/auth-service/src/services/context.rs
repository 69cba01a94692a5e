//! Service context - dependency container for services
//!
//! Holds the repositories, the user-service client and the token manager.

use std::sync::Arc;

use auth_common::auth::JwtService;
use auth_core::traits::{
    LookupRepository, SessionRepository, TokenBlacklistRepository, UserDirectory,
};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// Storage and the user service sit behind trait objects, so production wiring
/// (Postgres, HTTP) and tests (in-memory, scripted) share every service.
#[derive(Clone)]
pub struct ServiceContext {
    lookup_repo: Arc<dyn LookupRepository>,
    session_repo: Arc<dyn SessionRepository>,
    blacklist_repo: Arc<dyn TokenBlacklistRepository>,
    user_directory: Arc<dyn UserDirectory>,
    jwt_service: Arc<JwtService>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        lookup_repo: Arc<dyn LookupRepository>,
        session_repo: Arc<dyn SessionRepository>,
        blacklist_repo: Arc<dyn TokenBlacklistRepository>,
        user_directory: Arc<dyn UserDirectory>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            lookup_repo,
            session_repo,
            blacklist_repo,
            user_directory,
            jwt_service,
        }
    }

    /// Get the tenant lookup repository
    pub fn lookup_repo(&self) -> &dyn LookupRepository {
        self.lookup_repo.as_ref()
    }

    /// Get the session repository
    pub fn session_repo(&self) -> &dyn SessionRepository {
        self.session_repo.as_ref()
    }

    /// Get the token blacklist repository
    pub fn blacklist_repo(&self) -> &dyn TokenBlacklistRepository {
        self.blacklist_repo.as_ref()
    }

    /// Get the user service client
    pub fn user_directory(&self) -> &dyn UserDirectory {
        self.user_directory.as_ref()
    }

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("user_directory", &"...")
            .field("jwt_service", &self.jwt_service)
            .finish()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    lookup_repo: Option<Arc<dyn LookupRepository>>,
    session_repo: Option<Arc<dyn SessionRepository>>,
    blacklist_repo: Option<Arc<dyn TokenBlacklistRepository>>,
    user_directory: Option<Arc<dyn UserDirectory>>,
    jwt_service: Option<Arc<JwtService>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup_repo(mut self, repo: Arc<dyn LookupRepository>) -> Self {
        self.lookup_repo = Some(repo);
        self
    }

    pub fn session_repo(mut self, repo: Arc<dyn SessionRepository>) -> Self {
        self.session_repo = Some(repo);
        self
    }

    pub fn blacklist_repo(mut self, repo: Arc<dyn TokenBlacklistRepository>) -> Self {
        self.blacklist_repo = Some(repo);
        self
    }

    pub fn user_directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.user_directory = Some(directory);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.lookup_repo
                .ok_or_else(|| ServiceError::validation("lookup_repo is required"))?,
            self.session_repo
                .ok_or_else(|| ServiceError::validation("session_repo is required"))?,
            self.blacklist_repo
                .ok_or_else(|| ServiceError::validation("blacklist_repo is required"))?,
            self.user_directory
                .ok_or_else(|| ServiceError::validation("user_directory is required"))?,
            self.jwt_service
                .ok_or_else(|| ServiceError::validation("jwt_service is required"))?,
        ))
    }
}
