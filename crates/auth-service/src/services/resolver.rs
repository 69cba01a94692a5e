//! Login resolver
//!
//! Maps a login identifier onto exactly one lookup row, and through it onto the tenant
//! whose user service must check the password.

use tracing::{error, instrument, warn};

use auth_common::AppError;
use auth_core::entities::LookupEntry;
use auth_core::traits::LookupRepository;
use auth_core::value_objects::LoginIdentifier;
use auth_core::DomainError;

use super::error::{ServiceError, ServiceResult};

pub struct LoginResolver<'a> {
    lookup: &'a dyn LookupRepository,
}

impl<'a> LoginResolver<'a> {
    pub fn new(lookup: &'a dyn LookupRepository) -> Self {
        Self { lookup }
    }

    /// Resolve an identifier, optionally constrained to a tenant slug.
    ///
    /// - email: globally unique; a supplied slug must agree with the owning tenant
    /// - username: only unique inside a tenant, so the slug is mandatory
    ///
    /// Unknown identifiers and usernames living in another tenant both yield
    /// `InvalidCredentials`.
    #[instrument(skip(self, identifier), fields(is_email = identifier.is_email()))]
    pub async fn resolve(
        &self,
        identifier: &LoginIdentifier,
        tenant_slug: Option<&str>,
    ) -> ServiceResult<LookupEntry> {
        let tenant_slug = tenant_slug.map(str::trim).filter(|s| !s.is_empty());

        match identifier {
            LoginIdentifier::Email(email) => {
                let entry = self
                    .lookup
                    .find_by_email(email)
                    .await
                    .map_err(lookup_failed)?
                    .ok_or_else(|| {
                        warn!("Login failed: email not in lookup table");
                        ServiceError::invalid_credentials()
                    })?;

                if let Some(slug) = tenant_slug {
                    if !entry.tenant().matches_slug(slug) {
                        warn!(
                            requested = slug,
                            resolved = %entry.tenant_slug,
                            "Login failed: tenant mismatch"
                        );
                        return Err(AppError::TenantMismatch.into());
                    }
                }
                Ok(entry)
            }
            LoginIdentifier::Username(username) => {
                let slug = tenant_slug.ok_or(AppError::UsernameRequiresSubdomain)?;
                self.lookup
                    .find_by_username(username, slug)
                    .await
                    .map_err(lookup_failed)?
                    .ok_or_else(|| {
                        warn!(tenant_slug = slug, "Login failed: username not in tenant");
                        ServiceError::invalid_credentials()
                    })
            }
        }
    }
}

fn lookup_failed(err: DomainError) -> ServiceError {
    error!(error = %err, "Tenant lookup failed");
    ServiceError::internal("tenant lookup failed")
}
