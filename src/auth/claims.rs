/// JWT Claims structures
///
/// Every token carries the same envelope (`typ`, `iss`, `iat`, `exp`)
/// around a kind-specific payload. The `typ` claim keeps access and refresh
/// tokens apart even though both are signed with the same secret.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Role of an authenticated identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            other => Err(DatabaseError::CorruptRecord(format!("unknown role '{}'", other))),
        }
    }
}

/// Token kind, serialized as the `typ` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Kind-specific part of a token
pub trait TokenPayload: Serialize + DeserializeOwned {
    const KIND: TokenKind;

    /// Subject (identity UUID as string)
    fn subject(&self) -> &str;
}

/// Claims carried by access tokens: enough to authorize without a lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPayload {
    pub sub: String,
    pub username: String,
    pub role: Role,
}

impl TokenPayload for AccessPayload {
    const KIND: TokenKind = TokenKind::Access;

    fn subject(&self) -> &str {
        &self.sub
    }
}

/// Claims carried by refresh tokens: subject plus the token version the
/// identity had when the token was minted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshPayload {
    pub sub: String,
    pub ver: i64,
}

impl TokenPayload for RefreshPayload {
    const KIND: TokenKind = TokenKind::Refresh;

    fn subject(&self) -> &str {
        &self.sub
    }
}

/// Signed token envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims<P> {
    #[serde(flatten)]
    pub data: P,
    /// Token kind
    pub typ: TokenKind,
    /// Issuer
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

pub type AccessClaims = Claims<AccessPayload>;
pub type RefreshClaims = Claims<RefreshPayload>;

impl<P: TokenPayload> Claims<P> {
    /// Extract the identity id from the subject claim
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(self.data.subject()).ok()
    }

    /// Tokens are accepted strictly before `exp`
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    pub fn ttl(&self) -> i64 {
        self.exp - self.iat
    }
}
