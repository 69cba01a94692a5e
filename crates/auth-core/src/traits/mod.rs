//! Ports - traits implemented by the infrastructure crates

mod directory;
mod event_source;
mod repositories;

pub use directory::UserDirectory;
pub use event_source::{Delivery, EventSource};
pub use repositories::{
    LookupRepository, RepoResult, SessionRepository, TokenBlacklistRepository,
};
