/// Admin bootstrap
///
/// Creates the first admin identity from `admin.*` settings when the
/// store has nobody answering to that username yet.

use bcrypt::DEFAULT_COST;

use crate::auth::{hash_password_with_cost, Role};
use crate::configuration::AdminBootstrapSettings;
use crate::error::{AppError, ValidationError};
use crate::store::{Identity, IdentityStore};

/// Returns `true` when a new identity was created
///
/// # Errors
/// Fails when the configured password is too weak, the email is blank, or
/// the store rejects the insert
pub async fn ensure_admin(
    store: &dyn IdentityStore,
    settings: &AdminBootstrapSettings,
) -> Result<bool, AppError> {
    ensure_admin_with_cost(store, settings, DEFAULT_COST).await
}

pub async fn ensure_admin_with_cost(
    store: &dyn IdentityStore,
    settings: &AdminBootstrapSettings,
    cost: u32,
) -> Result<bool, AppError> {
    let username = settings.username.trim();
    let email = settings.email.trim();
    if username.is_empty() {
        return Err(ValidationError::EmptyField("admin.username".to_string()).into());
    }
    if email.is_empty() {
        return Err(ValidationError::EmptyField("admin.email".to_string()).into());
    }

    if let Some(existing) = store.find_by_login(username).await? {
        tracing::debug!(user_id = %existing.id, "Admin identity already present");
        return Ok(false);
    }

    let digest = hash_password_with_cost(&settings.password, cost)?;
    let identity = Identity::new(username, email, Role::Admin, digest);
    store.insert(&identity).await?;

    tracing::info!(user_id = %identity.id, username = %identity.username, "Bootstrapped admin identity");
    Ok(true)
}
