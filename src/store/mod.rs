/// Identity store
///
/// Read access to admin identities plus the per-identity token version
/// used to revoke refresh tokens before they expire.

mod memory;
mod postgres;

use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

use crate::auth::Role;
use crate::error::DatabaseError;

pub use memory::InMemoryIdentityStore;
pub use postgres::PgIdentityStore;

/// An authenticated principal
#[derive(Clone)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub login: Option<String>,
    pub display_name: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub token_version: i64,
    password_digest: String,
}

impl Identity {
    /// New active identity at token version 0
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        password_digest: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            login: None,
            display_name: None,
            role,
            is_active: true,
            token_version: 0,
            password_digest,
        }
    }

    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub(crate) fn password_digest(&self) -> &str {
        &self.password_digest
    }

    /// Rank of the field `value` matched on, lower wins
    fn match_rank(&self, value: &str) -> Option<u8> {
        if self.email == value {
            Some(0)
        } else if self.username == value {
            Some(1)
        } else if self.login.as_deref() == Some(value) {
            Some(2)
        } else if self.display_name.as_deref() == Some(value) {
            Some(3)
        } else {
            None
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("login", &self.login)
            .field("display_name", &self.display_name)
            .field("role", &self.role)
            .field("is_active", &self.is_active)
            .field("token_version", &self.token_version)
            .field("password_digest", &"<redacted>")
            .finish()
    }
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Find the identity whose email, username, login alias or display name
    /// equals `login`.
    ///
    /// When several match, active identities come first, then matches on
    /// email, username, login alias and display name in that order, then
    /// the oldest record.
    async fn find_by_login(&self, login: &str) -> Result<Option<Identity>, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, DatabaseError>;

    /// Bump the token version if it still equals `expected`.
    ///
    /// Returns the new version, or `None` when the identity is gone or its
    /// version has already moved on.
    async fn advance_token_version(
        &self,
        id: Uuid,
        expected: i64,
    ) -> Result<Option<i64>, DatabaseError>;

    async fn insert(&self, identity: &Identity) -> Result<(), DatabaseError>;
}
