//! Database models - SQLx-compatible structs for PostgreSQL tables

mod lookup;
mod session;

pub use lookup::LookupModel;
pub use session::SessionModel;
