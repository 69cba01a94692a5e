//! Value objects - immutable types that represent domain concepts

mod client_meta;
mod identifier;
mod tenant;
mod token_hash;

pub use client_meta::ClientMeta;
pub use identifier::{normalize_email, LoginIdentifier};
pub use tenant::TenantContext;
pub use token_hash::RefreshTokenHash;
