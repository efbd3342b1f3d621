use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{Identity, IdentityStore};
use crate::error::DatabaseError;

/// Identity store kept in process memory.
///
/// Records keep insertion order, which stands in for `created_at`.
#[derive(Default)]
pub struct InMemoryIdentityStore {
    identities: Mutex<Vec<Identity>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identities(identities: Vec<Identity>) -> Self {
        Self {
            identities: Mutex::new(identities),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Identity>>, DatabaseError> {
        self.identities
            .lock()
            .map_err(|_| DatabaseError::UnexpectedError("identity store lock poisoned".to_string()))
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<Identity>, DatabaseError> {
        let identities = self.lock()?;

        // min_by_key keeps the first of equal keys, so ties go to the oldest record
        let found = identities
            .iter()
            .filter_map(|identity| {
                identity
                    .match_rank(login)
                    .map(|rank| ((!identity.is_active, rank), identity))
            })
            .min_by_key(|(key, _)| *key)
            .map(|(_, identity)| identity.clone());

        Ok(found)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, DatabaseError> {
        let identities = self.lock()?;
        Ok(identities.iter().find(|identity| identity.id == id).cloned())
    }

    async fn advance_token_version(
        &self,
        id: Uuid,
        expected: i64,
    ) -> Result<Option<i64>, DatabaseError> {
        let mut identities = self.lock()?;

        match identities.iter_mut().find(|identity| identity.id == id) {
            Some(identity) if identity.token_version == expected => {
                identity.token_version += 1;
                Ok(Some(identity.token_version))
            }
            _ => Ok(None),
        }
    }

    async fn insert(&self, identity: &Identity) -> Result<(), DatabaseError> {
        let mut identities = self.lock()?;

        let duplicate = identities.iter().any(|existing| {
            existing.id == identity.id
                || existing.username == identity.username
                || existing.email == identity.email
        });
        if duplicate {
            return Err(DatabaseError::UniqueConstraintViolation(format!(
                "identity '{}' already exists",
                identity.username
            )));
        }

        identities.push(identity.clone());
        Ok(())
    }
}
