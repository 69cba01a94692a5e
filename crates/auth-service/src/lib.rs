//! # auth-service
//!
//! Application layer: the login resolver, the token/session lifecycle, the
//! user-service client and the consumer that keeps the tenant lookup table in sync.

pub mod dto;
pub mod services;

pub use services::{
    AuthService, DeliveryOutcome, LoginResolver, LookupSyncConsumer, LookupSyncHandler, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, SessionService, SessionSweeper,
    SyncOutcome, UserServiceClient,
};
