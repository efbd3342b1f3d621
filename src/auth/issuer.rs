/// Token Pair Issuer
///
/// Mints an access token and a refresh token with independent lifetimes.

use crate::auth::claims::{AccessPayload, RefreshPayload};
use crate::auth::codec::TokenCodec;
use crate::error::AppError;
use crate::store::Identity;

/// A freshly minted access/refresh pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub access_expires_in: i64,
    /// Refresh token lifetime in seconds
    pub refresh_expires_in: i64,
}

#[derive(Clone)]
pub struct TokenPairIssuer {
    codec: TokenCodec,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl TokenPairIssuer {
    pub fn new(codec: TokenCodec, access_ttl: i64, refresh_ttl: i64) -> Self {
        Self {
            codec,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn access_ttl(&self) -> i64 {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> i64 {
        self.refresh_ttl
    }

    /// Issue a pair for `identity` at its current token version
    pub fn issue(&self, identity: &Identity) -> Result<TokenPair, AppError> {
        let issued_at = self.codec.now();

        let access_token = self.codec.sign_at(
            AccessPayload {
                sub: identity.id.to_string(),
                username: identity.username.clone(),
                role: identity.role,
            },
            issued_at,
            self.access_ttl,
        )?;

        let refresh_token = self.codec.sign_at(
            RefreshPayload {
                sub: identity.id.to_string(),
                ver: identity.token_version,
            },
            issued_at,
            self.refresh_ttl,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_in: self.access_ttl,
            refresh_expires_in: self.refresh_ttl,
        })
    }
}
