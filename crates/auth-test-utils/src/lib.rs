//! Shared test utilities for the tenant-auth crates.
//!
//! - [`InMemoryLookupRepository`], [`InMemorySessionRepository`],
//!   [`InMemoryBlacklistRepository`] - storage honoring the same uniqueness rules as Postgres
//! - [`InMemoryEventSource`] - at-least-once source that redelivers unacked messages
//! - [`FakeUserDirectory`] - scripted user service
//! - [`fixtures`] - tenants, profiles, events and a token manager
//! - [`assert_eventually`] - poll a condition until it holds or times out

mod assertions;
mod directory;
mod event_source;
pub mod fixtures;
mod repositories;

pub use assertions::assert_eventually;
pub use directory::{DirectoryCall, FakeUserDirectory};
pub use event_source::InMemoryEventSource;
pub use repositories::{
    InMemoryBlacklistRepository, InMemoryLookupRepository, InMemorySessionRepository,
};
