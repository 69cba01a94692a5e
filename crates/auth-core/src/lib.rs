//! # auth-core
//!
//! Domain layer for the tenant-aware authentication service: lookup entries, sessions,
//! user lifecycle events and the ports (repository, directory and event-source traits)
//! the service layer is written against.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod events;
mod serde_util;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{LookupEntry, Session, TokenBlacklistEntry, UserProfile};
pub use error::{BusError, DirectoryError, DomainError};
pub use events::{
    EventEnvelope, UserCreatedEvent, UserDeletedEvent, UserEvent, UserUpdatedEvent,
    USER_CREATED, USER_DELETED, USER_UPDATED,
};
pub use traits::{
    Delivery, EventSource, LookupRepository, RepoResult, SessionRepository,
    TokenBlacklistRepository, UserDirectory,
};
pub use value_objects::{
    normalize_email, ClientMeta, LoginIdentifier, RefreshTokenHash, TenantContext,
};
