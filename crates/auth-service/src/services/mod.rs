//! Business logic services
//!
//! Services borrow a [`ServiceContext`] for the duration of one use case; the
//! long-running workers (consumer, sweeper) own an `Arc` of it instead.

pub mod auth;
pub mod context;
pub mod error;
pub mod lookup_sync;
pub mod resolver;
pub mod session;
pub mod sweeper;
pub mod user_client;

pub use auth::AuthService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use lookup_sync::{DeliveryOutcome, LookupSyncConsumer, LookupSyncHandler, SyncOutcome};
pub use resolver::LoginResolver;
pub use session::SessionService;
pub use sweeper::SessionSweeper;
pub use user_client::UserServiceClient;
