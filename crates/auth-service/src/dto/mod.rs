//! Data transfer objects for API requests and responses
//!
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers from domain and token types to response DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{LoginRequest, LogoutRequest, RefreshTokenRequest};
pub use responses::{
    HealthChecks, HealthResponse, LoginResponse, ReadinessResponse, TokenResponse, UserResponse,
    VerifyResponse,
};
