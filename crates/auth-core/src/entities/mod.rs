//! Domain entities - core business objects

mod blacklist;
mod lookup;
mod session;
mod user_profile;

pub use blacklist::TokenBlacklistEntry;
pub use lookup::LookupEntry;
pub use session::Session;
pub use user_profile::UserProfile;
