/// Refresh Token Rotation
///
/// Refresh tokens are single-use:
/// - each carries the identity's token version at issuance
/// - a successful refresh advances the version (compare-and-swap) and
///   issues a new pair at the new version
/// - logout advances the version too, so every outstanding refresh token
///   for the identity stops working before its natural expiry

use std::fmt;
use std::sync::Arc;

use crate::auth::claims::RefreshPayload;
use crate::auth::codec::{TokenCodec, TokenError};
use crate::auth::issuer::{TokenPair, TokenPairIssuer};
use crate::error::{AppError, DatabaseError};
use crate::store::{Identity, IdentityStore};

/// Why a refresh attempt failed
///
/// Everything except `Missing` and the infrastructure variants is reported
/// to clients as one uniform "invalid refresh token".
#[derive(Debug)]
pub enum RefreshError {
    Missing,
    Invalid(TokenError),
    UnknownSubject,
    Inactive,
    Revoked,
    Store(DatabaseError),
    Issue(AppError),
}

impl fmt::Display for RefreshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshError::Missing => write!(f, "no refresh token supplied"),
            RefreshError::Invalid(e) => write!(f, "refresh token rejected: {}", e),
            RefreshError::UnknownSubject => write!(f, "refresh token subject does not exist"),
            RefreshError::Inactive => write!(f, "refresh token subject is inactive"),
            RefreshError::Revoked => write!(f, "refresh token has been revoked"),
            RefreshError::Store(e) => write!(f, "{}", e),
            RefreshError::Issue(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RefreshError {}

impl From<DatabaseError> for RefreshError {
    fn from(err: DatabaseError) -> Self {
        RefreshError::Store(err)
    }
}

#[derive(Clone)]
pub struct RefreshRotator {
    codec: TokenCodec,
    issuer: TokenPairIssuer,
    store: Arc<dyn IdentityStore>,
}

impl RefreshRotator {
    pub fn new(codec: TokenCodec, issuer: TokenPairIssuer, store: Arc<dyn IdentityStore>) -> Self {
        Self {
            codec,
            issuer,
            store,
        }
    }

    /// Exchange a refresh token for a brand-new pair
    pub async fn rotate(
        &self,
        refresh_token: Option<&str>,
    ) -> Result<(Identity, TokenPair), RefreshError> {
        let token = refresh_token
            .filter(|token| !token.is_empty())
            .ok_or(RefreshError::Missing)?;

        let claims = self
            .codec
            .verify::<RefreshPayload>(token)
            .map_err(RefreshError::Invalid)?;
        let user_id = claims
            .user_id()
            .ok_or(RefreshError::Invalid(TokenError::Malformed))?;

        let mut identity = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(RefreshError::UnknownSubject)?;
        if !identity.is_active {
            return Err(RefreshError::Inactive);
        }
        if claims.data.ver != identity.token_version {
            tracing::warn!(user_id = %user_id, "Stale refresh token presented");
            return Err(RefreshError::Revoked);
        }

        // A concurrent rotation with the same token loses here
        identity.token_version = self
            .store
            .advance_token_version(user_id, claims.data.ver)
            .await?
            .ok_or(RefreshError::Revoked)?;

        let pair = self.issuer.issue(&identity).map_err(RefreshError::Issue)?;

        tracing::debug!(
            user_id = %user_id,
            token_version = identity.token_version,
            "Refresh token rotated"
        );

        Ok((identity, pair))
    }

    /// Revoke every outstanding refresh token of the token's subject
    ///
    /// Returns whether a revocation happened. Unverifiable tokens are
    /// ignored; there is nothing to revoke for them.
    pub async fn revoke(&self, refresh_token: &str) -> Result<bool, DatabaseError> {
        let claims = match self.codec.verify::<RefreshPayload>(refresh_token) {
            Ok(claims) => claims,
            Err(_) => return Ok(false),
        };
        let user_id = match claims.user_id() {
            Some(id) => id,
            None => return Ok(false),
        };

        let advanced = self
            .store
            .advance_token_version(user_id, claims.data.ver)
            .await?;

        if advanced.is_some() {
            tracing::info!(user_id = %user_id, "Refresh tokens revoked");
        }
        Ok(advanced.is_some())
    }
}
