//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in auth-core.

mod blacklist;
mod error;
mod lookup;
mod session;

pub use blacklist::PgTokenBlacklistRepository;
pub use lookup::PgLookupRepository;
pub use session::PgSessionRepository;
