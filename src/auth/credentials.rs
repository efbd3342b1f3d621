/// Credential Validator
///
/// Checks a submitted login/password pair against stored identities.

use std::fmt;
use std::sync::Arc;

use crate::auth::password::{verify_against_dummy, verify_password};
use crate::error::DatabaseError;
use crate::store::{Identity, IdentityStore};

/// Why a credential check failed
///
/// The first three variants are reported to clients identically.
#[derive(Debug)]
pub enum CredentialError {
    NotFound,
    Inactive,
    WrongPassword,
    CorruptDigest(String),
    Store(DatabaseError),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::NotFound => write!(f, "no identity matches the submitted login"),
            CredentialError::Inactive => write!(f, "identity is inactive"),
            CredentialError::WrongPassword => write!(f, "password does not match"),
            CredentialError::CorruptDigest(msg) => write!(f, "{}", msg),
            CredentialError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CredentialError {}

impl From<DatabaseError> for CredentialError {
    fn from(err: DatabaseError) -> Self {
        CredentialError::Store(err)
    }
}

#[derive(Clone)]
pub struct CredentialValidator {
    store: Arc<dyn IdentityStore>,
}

impl CredentialValidator {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Resolve `login` (email, username, login alias or display name) to an
    /// active identity whose digest matches `password`
    pub async fn validate(&self, login: &str, password: &str) -> Result<Identity, CredentialError> {
        let identity = match self.store.find_by_login(login).await? {
            Some(identity) => identity,
            None => {
                verify_against_dummy(password);
                return Err(CredentialError::NotFound);
            }
        };

        if !identity.is_active {
            verify_against_dummy(password);
            return Err(CredentialError::Inactive);
        }

        match verify_password(password, identity.password_digest()) {
            Ok(true) => Ok(identity),
            Ok(false) => Err(CredentialError::WrongPassword),
            Err(msg) => {
                tracing::error!(user_id = %identity.id, "Stored password digest is unreadable");
                Err(CredentialError::CorruptDigest(msg))
            }
        }
    }
}
