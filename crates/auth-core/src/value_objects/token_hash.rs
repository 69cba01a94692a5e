//! Refresh token hash - the only form in which a refresh token is persisted

use sha2::{Digest, Sha256};
use std::fmt;

/// Lower-case hex SHA-256 digest of a raw refresh token
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RefreshTokenHash(String);

impl RefreshTokenHash {
    /// Hash a raw token as handed out to the client.
    pub fn from_raw(raw_token: &str) -> Self {
        let digest = Sha256::digest(raw_token.as_bytes());
        Self(hex::encode(digest))
    }

    /// Wrap a digest loaded back from storage.
    pub fn from_stored(hex_digest: impl Into<String>) -> Self {
        Self(hex_digest.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

// Debug output shows only the first eight hex digits.
impl fmt::Debug for RefreshTokenHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.0.get(..8).unwrap_or(&self.0);
        write!(f, "RefreshTokenHash({prefix}..)")
    }
}
