//! API Integration Tests
//!
//! Most tests run against in-memory storage and a stub user service, so they need
//! nothing external. Tests in the last section additionally require:
//! - Running PostgreSQL instance
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL, JWT_SECRET
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_error, assert_json, assert_status, check_test_env, fixtures::*, StaticProbe,
    TestServer,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

async fn login(server: &TestServer, request: &LoginRequest) -> LoginResponse {
    let response = server.post("/api/v1/auth/login", request).await.unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_ready() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_health_not_ready_when_database_down() {
    let server = TestServer::start_with_probe(StaticProbe {
        database: false,
        redis: true,
    })
    .await
    .expect("Failed to start server");

    let response = server.get("/health/ready").await.unwrap();
    let body: Value = assert_json(response, StatusCode::SERVICE_UNAVAILABLE)
        .await
        .unwrap();
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["checks"]["database"], "unhealthy");
    assert_eq!(body["checks"]["redis"], "healthy");
}

// ============================================================================
// Login Tests
// ============================================================================

#[tokio::test]
async fn test_login_with_email_resolves_tenant() {
    let server = TestServer::start().await.unwrap();
    let tenant = unique_tenant("clinic");
    let user = unique_user(&tenant, None);
    server.seed_user(&tenant, &user, TEST_PASSWORD).await.unwrap();

    let auth = login(&server, &LoginRequest::email(&user)).await;

    assert!(!auth.access_token.is_empty());
    assert!(!auth.refresh_token.is_empty());
    assert!(!auth.expires_at.is_empty());
    assert!(auth.token_type.eq_ignore_ascii_case("bearer"));
    assert_eq!(auth.user.id, user.id);
    assert_eq!(auth.user.tenant_id, Some(tenant.tenant_id()));
    assert_eq!(auth.user.tenant_slug.as_deref(), Some(tenant.tenant_slug()));
    assert_eq!(auth.user.tenant_schema.as_deref(), Some(tenant.tenant_schema()));
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let server = TestServer::start().await.unwrap();
    let tenant = unique_tenant("clinic");
    let user = unique_user(&tenant, None);
    server.seed_user(&tenant, &user, TEST_PASSWORD).await.unwrap();

    let mut request = LoginRequest::email(&user);
    request.identifier = format!("  {}  ", user.email.to_uppercase());
    let auth = login(&server, &request).await;
    assert_eq!(auth.user.id, user.id);
}

#[tokio::test]
async fn test_same_username_in_two_tenants() {
    let server = TestServer::start().await.unwrap();
    let clinic_a = unique_tenant("clinic-a");
    let clinic_b = unique_tenant("clinic-b");
    let admin_a = unique_user(&clinic_a, Some("admin"));
    let admin_b = unique_user(&clinic_b, Some("admin"));
    server.seed_user(&clinic_a, &admin_a, TEST_PASSWORD).await.unwrap();
    server.seed_user(&clinic_b, &admin_b, TEST_PASSWORD).await.unwrap();

    let auth_a = login(
        &server,
        &LoginRequest::username("admin", Some(clinic_a.tenant_slug())),
    )
    .await;
    let auth_b = login(
        &server,
        &LoginRequest::username("admin", Some(clinic_b.tenant_slug())),
    )
    .await;

    assert_eq!(auth_a.user.id, admin_a.id);
    assert_eq!(auth_a.user.tenant_id, Some(clinic_a.tenant_id()));
    assert_eq!(auth_b.user.id, admin_b.id);
    assert_eq!(auth_b.user.tenant_id, Some(clinic_b.tenant_id()));
}

#[tokio::test]
async fn test_username_requires_subdomain() {
    let server = TestServer::start().await.unwrap();
    let tenant = unique_tenant("clinic");
    let user = unique_user(&tenant, Some("admin"));
    server.seed_user(&tenant, &user, TEST_PASSWORD).await.unwrap();

    let response = server
        .post("/api/v1/auth/login", &LoginRequest::username("admin", None))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "USERNAME_REQUIRES_SUBDOMAIN");
}

#[tokio::test]
async fn test_email_with_foreign_subdomain_is_rejected() {
    let server = TestServer::start().await.unwrap();
    let clinic_a = unique_tenant("clinic-a");
    let clinic_b = unique_tenant("clinic-b");
    let user = unique_user(&clinic_a, None);
    server.seed_user(&clinic_a, &user, TEST_PASSWORD).await.unwrap();

    let request = LoginRequest::email(&user).with_slug(clinic_b.tenant_slug());
    let response = server.post("/api/v1/auth/login", &request).await.unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "TENANT_MISMATCH");
}

#[tokio::test]
async fn test_email_with_own_subdomain_is_accepted() {
    let server = TestServer::start().await.unwrap();
    let tenant = unique_tenant("clinic");
    let user = unique_user(&tenant, None);
    server.seed_user(&tenant, &user, TEST_PASSWORD).await.unwrap();

    let request = LoginRequest::email(&user).with_slug(tenant.tenant_slug());
    let auth = login(&server, &request).await;
    assert_eq!(auth.user.id, user.id);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let server = TestServer::start().await.unwrap();
    let tenant = unique_tenant("clinic");
    let user = unique_user(&tenant, None);
    server.seed_user(&tenant, &user, TEST_PASSWORD).await.unwrap();

    let request = LoginRequest::email(&user).with_password("WrongPassword!");
    let response = server.post("/api/v1/auth/login", &request).await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_unknown_email() {
    let server = TestServer::start().await.unwrap();
    let tenant = unique_tenant("clinic");
    let stranger = unique_user(&tenant, None);

    let response = server
        .post("/api/v1/auth/login", &LoginRequest::email(&stranger))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_username_from_other_tenant() {
    let server = TestServer::start().await.unwrap();
    let clinic_a = unique_tenant("clinic-a");
    let clinic_b = unique_tenant("clinic-b");
    let user = unique_user(&clinic_a, Some("nurse"));
    server.seed_user(&clinic_a, &user, TEST_PASSWORD).await.unwrap();

    let request = LoginRequest::username("nurse", Some(clinic_b.tenant_slug()));
    let response = server.post("/api/v1/auth/login", &request).await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_validation_errors() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .post(
            "/api/v1/auth/login",
            &json!({ "identifier": "", "password": "x" }),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "VALIDATION_ERROR");

    let response = server
        .post("/api/v1/auth/login", &json!({ "identifier": "a@b.de" }))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_login_when_user_service_is_down() {
    let server = TestServer::start_without_user_service().await.unwrap();
    let tenant = unique_tenant("clinic");
    let user = unique_user(&tenant, None);
    server.seed_user(&tenant, &user, TEST_PASSWORD).await.unwrap();

    let response = server
        .post("/api/v1/auth/login", &LoginRequest::email(&user))
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::SERVICE_UNAVAILABLE)
        .await
        .unwrap();
    assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
    assert_eq!(body["error"]["message"], "Service temporarily unavailable");
}

// ============================================================================
// Session Tests
// ============================================================================

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let server = TestServer::start().await.unwrap();
    let tenant = unique_tenant("clinic");
    let user = unique_user(&tenant, None);
    server.seed_user(&tenant, &user, TEST_PASSWORD).await.unwrap();
    let auth = login(&server, &LoginRequest::email(&user)).await;

    let response = server
        .post("/api/v1/auth/refresh", &RefreshRequest::new(&auth.refresh_token))
        .await
        .unwrap();
    let refreshed: TokenResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_ne!(refreshed.refresh_token, auth.refresh_token);
    assert_ne!(refreshed.access_token, auth.access_token);
    assert!(refreshed.token_type.eq_ignore_ascii_case("bearer"));

    // The old refresh token is spent
    let response = server
        .post("/api/v1/auth/refresh", &RefreshRequest::new(&auth.refresh_token))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "UNAUTHORIZED");

    // The new one still works
    let response = server
        .post(
            "/api/v1/auth/refresh",
            &RefreshRequest::new(&refreshed.refresh_token),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_refresh_with_garbage_token() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .post("/api/v1/auth/refresh", &RefreshRequest::new("not-a-jwt"))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "TOKEN_INVALID");
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let server = TestServer::start().await.unwrap();
    let tenant = unique_tenant("clinic");
    let user = unique_user(&tenant, None);
    server.seed_user(&tenant, &user, TEST_PASSWORD).await.unwrap();
    let auth = login(&server, &LoginRequest::email(&user)).await;

    let response = server
        .post("/api/v1/auth/refresh", &RefreshRequest::new(&auth.access_token))
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let server = TestServer::start().await.unwrap();
    let tenant = unique_tenant("clinic");
    let user = unique_user(&tenant, None);
    server.seed_user(&tenant, &user, TEST_PASSWORD).await.unwrap();
    let auth = login(&server, &LoginRequest::email(&user)).await;

    let response = server
        .post("/api/v1/auth/logout", &RefreshRequest::new(&auth.refresh_token))
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .post("/api/v1/auth/refresh", &RefreshRequest::new(&auth.refresh_token))
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_logout_with_bearer_refresh_token() {
    let server = TestServer::start().await.unwrap();
    let tenant = unique_tenant("clinic");
    let user = unique_user(&tenant, None);
    server.seed_user(&tenant, &user, TEST_PASSWORD).await.unwrap();
    let auth = login(&server, &LoginRequest::email(&user)).await;

    let response = server
        .post_bearer("/api/v1/auth/logout", &auth.refresh_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .post("/api/v1/auth/refresh", &RefreshRequest::new(&auth.refresh_token))
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_logout_without_token_is_no_content() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .post("/api/v1/auth/logout", &json!({}))
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .post("/api/v1/auth/logout", &RefreshRequest::new("not-a-jwt"))
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
}

#[tokio::test]
async fn test_logout_all_revokes_every_session() {
    let server = TestServer::start().await.unwrap();
    let tenant = unique_tenant("clinic");
    let user = unique_user(&tenant, None);
    server.seed_user(&tenant, &user, TEST_PASSWORD).await.unwrap();
    let first = login(&server, &LoginRequest::email(&user)).await;
    let second = login(&server, &LoginRequest::email(&user)).await;

    let response = server
        .post_as("/api/v1/auth/logout-all", user.id, &tenant)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    for token in [&first.refresh_token, &second.refresh_token] {
        let response = server
            .post("/api/v1/auth/refresh", &RefreshRequest::new(token))
            .await
            .unwrap();
        assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
    }
}

#[tokio::test]
async fn test_logout_all_requires_gateway_identity() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .post("/api/v1/auth/logout-all", &json!({}))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "UNAUTHORIZED");
}

// ============================================================================
// Current User Tests
// ============================================================================

#[tokio::test]
async fn test_me_with_gateway_headers() {
    let server = TestServer::start().await.unwrap();
    let tenant = unique_tenant("clinic");
    let user = unique_user(&tenant, Some("doc"));
    server.seed_user(&tenant, &user, TEST_PASSWORD).await.unwrap();

    let response = server
        .get_as("/api/v1/auth/me", user.id, &tenant)
        .await
        .unwrap();
    let me: UserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me.id, user.id);
    assert_eq!(me.email, user.email);
    assert_eq!(me.username.as_deref(), Some("doc"));
    assert_eq!(me.role, "staff");
    assert_eq!(me.tenant_slug.as_deref(), Some(tenant.tenant_slug()));
}

#[tokio::test]
async fn test_me_without_gateway_headers() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/api/v1/auth/me").await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_me_for_user_unknown_to_tenant() {
    let server = TestServer::start().await.unwrap();
    let clinic_a = unique_tenant("clinic-a");
    let clinic_b = unique_tenant("clinic-b");
    let user = unique_user(&clinic_a, None);
    server.seed_user(&clinic_a, &user, TEST_PASSWORD).await.unwrap();

    let response = server
        .get_as("/api/v1/auth/me", user.id, &clinic_b)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server
        .get_as("/api/v1/auth/me", Uuid::new_v4(), &clinic_a)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

// ============================================================================
// Token Verification Tests
// ============================================================================

#[tokio::test]
async fn test_verify_access_token() {
    let server = TestServer::start().await.unwrap();
    let tenant = unique_tenant("clinic");
    let user = unique_user(&tenant, None);
    server.seed_user(&tenant, &user, TEST_PASSWORD).await.unwrap();
    let auth = login(&server, &LoginRequest::email(&user)).await;

    let response = server
        .post_bearer("/api/v1/auth/verify", &auth.access_token)
        .await
        .unwrap();
    let verified: VerifyResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(verified.valid);
    assert_eq!(verified.user_id, user.id);
    assert_eq!(verified.email, user.email);
    assert_eq!(verified.tenant_id, tenant.tenant_id());
    assert_eq!(verified.tenant_slug, tenant.tenant_slug());
    assert_eq!(verified.tenant_schema, tenant.tenant_schema());
}

#[tokio::test]
async fn test_verify_rejects_refresh_token() {
    let server = TestServer::start().await.unwrap();
    let tenant = unique_tenant("clinic");
    let user = unique_user(&tenant, None);
    server.seed_user(&tenant, &user, TEST_PASSWORD).await.unwrap();
    let auth = login(&server, &LoginRequest::email(&user)).await;

    let response = server
        .post_bearer("/api/v1/auth/verify", &auth.refresh_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_verify_without_authorization_header() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .post("/api/v1/auth/verify", &json!({}))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_revoked_access_token_fails_verification() {
    let server = TestServer::start().await.unwrap();
    let tenant = unique_tenant("clinic");
    let user = unique_user(&tenant, None);
    server.seed_user(&tenant, &user, TEST_PASSWORD).await.unwrap();
    let auth = login(&server, &LoginRequest::email(&user)).await;

    let response = server
        .post_bearer("/api/v1/auth/revoke", &auth.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .post_bearer("/api/v1/auth/verify", &auth.access_token)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/health").await.unwrap();
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert!(request_id.is_some_and(|id| !id.is_empty()));
}

// ============================================================================
// Live Backend Tests
// ============================================================================

#[tokio::test]
async fn test_live_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start_with_backends()
        .await
        .expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_live_login_refresh_logout() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start_with_backends()
        .await
        .expect("Failed to start server");
    let tenant = unique_tenant("live");
    let user = unique_user(&tenant, Some(&format!("live{}", unique_suffix())));
    server.seed_user(&tenant, &user, TEST_PASSWORD).await.unwrap();

    let auth = login(&server, &LoginRequest::email(&user)).await;
    assert_eq!(auth.user.tenant_id, Some(tenant.tenant_id()));

    let response = server
        .post("/api/v1/auth/refresh", &RefreshRequest::new(&auth.refresh_token))
        .await
        .unwrap();
    let refreshed: TokenResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let response = server
        .post("/api/v1/auth/refresh", &RefreshRequest::new(&auth.refresh_token))
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server
        .post(
            "/api/v1/auth/logout",
            &RefreshRequest::new(&refreshed.refresh_token),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .post(
            "/api/v1/auth/refresh",
            &RefreshRequest::new(&refreshed.refresh_token),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}
