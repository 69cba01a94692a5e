//! HTTP client for the user service's internal endpoints

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

use auth_common::UserServiceConfig;
use auth_core::entities::UserProfile;
use auth_core::error::DirectoryError;
use auth_core::traits::UserDirectory;
use auth_core::value_objects::TenantContext;

use super::error::{ServiceError, ServiceResult};

pub const TENANT_ID_HEADER: &str = "X-Tenant-ID";
pub const TENANT_SLUG_HEADER: &str = "X-Tenant-Slug";
pub const TENANT_SCHEMA_HEADER: &str = "X-Tenant-Schema";

#[derive(Debug, Serialize)]
struct ValidateCredentialsBody<'a> {
    identifier: &'a str,
    password: &'a str,
}

/// `{ "success": true, "data": {...} }`
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
}

/// [`UserDirectory`] backed by the user service over HTTP
#[derive(Debug, Clone)]
pub struct UserServiceClient {
    http: Client,
    base_url: String,
}

impl UserServiceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ServiceResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &UserServiceConfig) -> ServiceResult<Self> {
        Self::new(config.base_url.clone(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/internal/{}", self.base_url, path)
    }

    fn with_tenant(request: RequestBuilder, tenant: &TenantContext) -> RequestBuilder {
        request
            .header(TENANT_ID_HEADER, tenant.tenant_id().to_string())
            .header(TENANT_SLUG_HEADER, tenant.tenant_slug())
            .header(TENANT_SCHEMA_HEADER, tenant.tenant_schema())
    }

    async fn send(request: RequestBuilder) -> Result<Response, DirectoryError> {
        request.send().await.map_err(|e| {
            error!(error = %e, "Failed to call user service");
            DirectoryError::Unavailable(e.to_string())
        })
    }

    async fn decode_profile(response: Response) -> Result<UserProfile, DirectoryError> {
        let envelope: Envelope<UserProfile> = response
            .json()
            .await
            .map_err(|e| DirectoryError::Decode(e.to_string()))?;

        match envelope.data {
            Some(profile) if envelope.success => Ok(profile),
            _ => Err(DirectoryError::Decode("response carried no user".to_string())),
        }
    }
}

#[async_trait]
impl UserDirectory for UserServiceClient {
    #[instrument(skip(self, identifier, password), fields(tenant = %tenant))]
    async fn validate_credentials(
        &self,
        tenant: &TenantContext,
        identifier: &str,
        password: &str,
    ) -> Result<UserProfile, DirectoryError> {
        let request = self
            .http
            .post(self.url("validate-credentials"))
            .json(&ValidateCredentialsBody { identifier, password });
        let response = Self::send(Self::with_tenant(request, tenant)).await?;

        match response.status() {
            StatusCode::OK => Self::decode_profile(response).await,
            StatusCode::UNAUTHORIZED => Err(DirectoryError::InvalidCredentials),
            status => {
                warn!(status = status.as_u16(), "User service rejected credential check");
                Err(DirectoryError::UnexpectedStatus(status.as_u16()))
            }
        }
    }

    #[instrument(skip(self), fields(tenant = %tenant))]
    async fn get_user(
        &self,
        tenant: &TenantContext,
        user_id: Uuid,
    ) -> Result<UserProfile, DirectoryError> {
        let request = self.http.get(self.url(&format!("users/{user_id}")));
        let response = Self::send(Self::with_tenant(request, tenant)).await?;

        match response.status() {
            StatusCode::OK => {
                debug!("Fetched user from user service");
                Self::decode_profile(response).await
            }
            StatusCode::NOT_FOUND => Err(DirectoryError::NotFound),
            status => {
                error!(status = status.as_u16(), "User service returned error");
                Err(DirectoryError::UnexpectedStatus(status.as_u16()))
            }
        }
    }
}
