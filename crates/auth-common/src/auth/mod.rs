//! Token minting and validation

mod jwt;

pub use jwt::{
    AccessClaims, IssuedTokens, JwtService, RefreshClaims, RegisteredClaims, TenantClaims,
    TokenPair, TokenType,
};
