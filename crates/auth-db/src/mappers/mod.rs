//! Entity to model mappers
//!
//! Conversions from database rows (`*Model`) to domain entities (auth-core).

mod lookup;
mod session;
