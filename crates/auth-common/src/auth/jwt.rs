//! JWT utilities for authentication
//!
//! Mints and validates tenant-scoped access/refresh token pairs using the `jsonwebtoken`
//! crate. Both claim sets share [`RegisteredClaims`] and [`TenantClaims`] through
//! `#[serde(flatten)]`, so the wire format stays flat.

use auth_core::{TenantContext, UserProfile};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::AppError;

/// Allowed clock skew when checking `exp` and `nbf`
const LEEWAY_SECS: u64 = 5;

/// Token type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Standard JWT claims present on every token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredClaims {
    pub iss: String,
    /// Subject (user ID)
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    /// Unique token id, used for blacklisting
    pub jti: String,
}

impl RegisteredClaims {
    /// Expiry as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_default()
    }
}

/// Tenant the token is bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantClaims {
    pub tenant_id: Uuid,
    pub tenant_slug: String,
    pub tenant_schema: String,
}

impl TenantClaims {
    pub fn context(&self) -> TenantContext {
        TenantContext::new(self.tenant_id, &self.tenant_slug, &self.tenant_schema)
    }
}

impl From<&TenantContext> for TenantClaims {
    fn from(tenant: &TenantContext) -> Self {
        Self {
            tenant_id: tenant.tenant_id(),
            tenant_slug: tenant.tenant_slug().to_string(),
            tenant_schema: tenant.tenant_schema().to_string(),
        }
    }
}

/// Claims carried by access tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    #[serde(flatten)]
    pub registered: RegisteredClaims,
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
    pub is_manager: bool,
    #[serde(flatten)]
    pub tenant: TenantClaims,
    #[serde(rename = "typ")]
    pub token_type: TokenType,
}

impl AccessClaims {
    pub fn jti(&self) -> &str {
        &self.registered.jti
    }
}

/// Claims carried by refresh tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    #[serde(flatten)]
    pub registered: RegisteredClaims,
    pub user_id: Uuid,
    pub session_id: Uuid,
    #[serde(flatten)]
    pub tenant: TenantClaims,
    #[serde(rename = "typ")]
    pub token_type: TokenType,
}

/// Token pair handed to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiry
    pub expires_at: DateTime<Utc>,
    pub token_type: String,
}

/// A freshly minted pair plus what the caller needs to persist the session
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub pair: TokenPair,
    pub refresh_expires_at: DateTime<Utc>,
}

/// JWT service for encoding and decoding tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
    validation: Validation,
}

impl JwtService {
    /// Create a new JWT service with the given secret, issuer and expiry times (seconds)
    #[must_use]
    pub fn new(
        secret: &str,
        issuer: &str,
        access_token_expiry: i64,
        refresh_token_expiry: i64,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // HMAC family only: asymmetric algorithms in the header are rejected.
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);
        validation.validate_nbf = true;
        validation.leeway = LEEWAY_SECS;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            access_token_expiry,
            refresh_token_expiry,
            validation,
        }
    }

    #[must_use]
    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(
            &config.secret,
            &config.issuer,
            config.access_token_expiry,
            config.refresh_token_expiry,
        )
    }

    /// Mint an access/refresh pair for a user inside a tenant
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn generate_token_pair(
        &self,
        user: &UserProfile,
        tenant: &TenantContext,
        session_id: Uuid,
    ) -> Result<IssuedTokens, AppError> {
        let now = Utc::now();
        let access_expires_at = now + Duration::seconds(self.access_token_expiry);
        let refresh_expires_at = now + Duration::seconds(self.refresh_token_expiry);

        let access = AccessClaims {
            registered: self.registered(user.id, now, access_expires_at),
            user_id: user.id,
            email: user.email.clone(),
            name: user.full_name(),
            role: user.role.clone(),
            permissions: user.permissions.clone(),
            is_manager: user.is_manager,
            tenant: TenantClaims::from(tenant),
            token_type: TokenType::Access,
        };

        let refresh = RefreshClaims {
            registered: self.registered(user.id, now, refresh_expires_at),
            user_id: user.id,
            session_id,
            tenant: TenantClaims::from(tenant),
            token_type: TokenType::Refresh,
        };

        Ok(IssuedTokens {
            pair: TokenPair {
                access_token: self.encode_claims(&access)?,
                refresh_token: self.encode_claims(&refresh)?,
                expires_at: access_expires_at,
                token_type: "Bearer".to_string(),
            },
            refresh_expires_at,
        })
    }

    fn registered(
        &self,
        user_id: Uuid,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> RegisteredClaims {
        RegisteredClaims {
            iss: self.issuer.clone(),
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    fn encode_claims<T: Serialize>(&self, claims: &T) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode JWT: {e}")))
    }

    /// Decode and validate a JWT token
    ///
    /// # Errors
    /// `TokenExpired` for an expired signature, `InvalidToken` for anything else
    fn decode_token<T: DeserializeOwned>(&self, token: &str) -> Result<T, AppError> {
        decode::<T>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })
    }

    /// Validate an access token and return the claims
    ///
    /// # Errors
    /// Returns an error if the token is invalid, expired, or not an access token
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        let claims: AccessClaims = self.decode_token(token)?;

        if claims.token_type != TokenType::Access {
            return Err(AppError::InvalidToken);
        }

        Ok(claims)
    }

    /// Validate a refresh token and return the claims
    ///
    /// # Errors
    /// Returns an error if the token is invalid, expired, or not a refresh token
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, AppError> {
        let claims: RefreshClaims = self.decode_token(token)?;

        if claims.token_type != TokenType::Refresh {
            return Err(AppError::InvalidToken);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.issuer)
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough";

    fn create_test_service() -> JwtService {
        JwtService::new(SECRET, "tenant-auth", 900, 604_800)
    }

    fn tenant() -> TenantContext {
        TenantContext::new(Uuid::new_v4(), "clinic-a", "tenant_clinic_a")
    }

    fn user() -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            email: "admin@clinic-a.de".to_string(),
            username: Some("admin".to_string()),
            first_name: "Clara".to_string(),
            last_name: "Admin".to_string(),
            avatar_url: None,
            role: "admin".to_string(),
            permissions: vec!["users.manage".to_string()],
            is_manager: true,
            tenant_id: None,
            tenant_slug: None,
            tenant_schema: None,
        }
    }

    #[test]
    fn test_generate_token_pair() {
        let service = create_test_service();
        let issued = service
            .generate_token_pair(&user(), &tenant(), Uuid::new_v4())
            .unwrap();

        assert!(!issued.pair.access_token.is_empty());
        assert!(!issued.pair.refresh_token.is_empty());
        assert_eq!(issued.pair.token_type, "Bearer");
        assert!(issued.refresh_expires_at > issued.pair.expires_at);
    }

    #[test]
    fn test_access_claims_carry_user_and_tenant() {
        let service = create_test_service();
        let user = user();
        let tenant = tenant();
        let issued = service
            .generate_token_pair(&user, &tenant, Uuid::new_v4())
            .unwrap();

        let claims = service.validate_access_token(&issued.pair.access_token).unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.registered.sub, user.id.to_string());
        assert_eq!(claims.name, "Clara Admin");
        assert_eq!(claims.tenant.context(), tenant);
        assert!(claims.is_manager);
        assert!(claims.registered.expires_at() > Utc::now());
    }

    #[test]
    fn test_refresh_claims_carry_session() {
        let service = create_test_service();
        let session_id = Uuid::new_v4();
        let tenant = tenant();
        let issued = service.generate_token_pair(&user(), &tenant, session_id).unwrap();

        let claims = service.validate_refresh_token(&issued.pair.refresh_token).unwrap();
        assert_eq!(claims.session_id, session_id);
        assert_eq!(claims.tenant.context(), tenant);
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let service = create_test_service();
        let issued = service
            .generate_token_pair(&user(), &tenant(), Uuid::new_v4())
            .unwrap();

        assert!(matches!(
            service.validate_access_token(&issued.pair.refresh_token),
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(
            service.validate_refresh_token(&issued.pair.access_token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_every_token_gets_a_fresh_jti() {
        let service = create_test_service();
        let (user, tenant, sid) = (user(), tenant(), Uuid::new_v4());
        let first = service.generate_token_pair(&user, &tenant, sid).unwrap();
        let second = service.generate_token_pair(&user, &tenant, sid).unwrap();

        let a = service.validate_access_token(&first.pair.access_token).unwrap();
        let b = service.validate_access_token(&second.pair.access_token).unwrap();
        assert_ne!(a.jti(), b.jti());
        assert_ne!(first.pair.refresh_token, second.pair.refresh_token);
    }

    #[test]
    fn test_expired_token() {
        let service = create_test_service();
        let issued = service
            .generate_token_pair(&user(), &tenant(), Uuid::new_v4())
            .unwrap();
        let mut claims = service.validate_access_token(&issued.pair.access_token).unwrap();
        claims.registered.iat -= 7_200;
        claims.registered.nbf -= 7_200;
        claims.registered.exp = Utc::now().timestamp() - 3_600;
        let token = service.encode_claims(&claims).unwrap();

        assert!(matches!(
            service.validate_access_token(&token),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn test_wrong_issuer_or_secret() {
        let issued = create_test_service()
            .generate_token_pair(&user(), &tenant(), Uuid::new_v4())
            .unwrap();

        let other_issuer = JwtService::new(SECRET, "someone-else", 900, 604_800);
        assert!(matches!(
            other_issuer.validate_access_token(&issued.pair.access_token),
            Err(AppError::InvalidToken)
        ));

        let other_secret = JwtService::new("another-secret-key-entirely", "tenant-auth", 900, 604_800);
        assert!(matches!(
            other_secret.validate_access_token(&issued.pair.access_token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_hs512_is_accepted() {
        let service = create_test_service();
        let issued = service
            .generate_token_pair(&user(), &tenant(), Uuid::new_v4())
            .unwrap();
        let claims = service.validate_access_token(&issued.pair.access_token).unwrap();
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(service.validate_access_token(&token).is_ok());
    }

    #[test]
    fn test_unsigned_and_asymmetric_headers_are_rejected() {
        let service = create_test_service();
        let issued = service
            .generate_token_pair(&user(), &tenant(), Uuid::new_v4())
            .unwrap();
        let parts: Vec<&str> = issued.pair.access_token.split('.').collect();
        assert_eq!(parts.len(), 3);

        // {"alg":"none","typ":"JWT"}
        let unsigned = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}.", parts[1]);
        assert!(matches!(
            service.validate_access_token(&unsigned),
            Err(AppError::InvalidToken)
        ));

        // {"alg":"RS256","typ":"JWT"} over the original HMAC signature
        let swapped = format!("eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.{}.{}", parts[1], parts[2]);
        assert!(matches!(
            service.validate_access_token(&swapped),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_not_yet_valid_token() {
        let service = create_test_service();
        let issued = service
            .generate_token_pair(&user(), &tenant(), Uuid::new_v4())
            .unwrap();
        let mut claims = service.validate_access_token(&issued.pair.access_token).unwrap();
        claims.registered.nbf = Utc::now().timestamp() + 3_600;
        claims.registered.exp = claims.registered.nbf + 900;
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service.validate_access_token(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_invalid_token() {
        let service = create_test_service();

        let result = service.validate_access_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }
}
