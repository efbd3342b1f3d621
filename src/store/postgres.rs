use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Identity, IdentityStore};
use crate::auth::Role;
use crate::error::DatabaseError;

/// Identity store backed by the `users` table
#[derive(Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: Uuid,
    username: String,
    email: String,
    login: Option<String>,
    display_name: Option<String>,
    role: String,
    password_hash: String,
    is_active: bool,
    token_version: i64,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = DatabaseError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        Ok(Identity {
            id: row.id,
            username: row.username,
            email: row.email,
            login: row.login,
            display_name: row.display_name,
            role: row.role.parse::<Role>()?,
            is_active: row.is_active,
            token_version: row.token_version,
            password_digest: row.password_hash,
        })
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<Identity>, DatabaseError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, username, email, login, display_name, role, password_hash,
                   is_active, token_version
            FROM users
            WHERE email = $1 OR username = $1 OR login = $1 OR display_name = $1
            ORDER BY
                is_active DESC,
                CASE
                    WHEN email = $1 THEN 0
                    WHEN username = $1 THEN 1
                    WHEN login = $1 THEN 2
                    ELSE 3
                END,
                created_at ASC
            LIMIT 1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Identity::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, DatabaseError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, username, email, login, display_name, role, password_hash,
                   is_active, token_version
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Identity::try_from).transpose()
    }

    async fn advance_token_version(
        &self,
        id: Uuid,
        expected: i64,
    ) -> Result<Option<i64>, DatabaseError> {
        let version = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users
            SET token_version = token_version + 1, updated_at = now()
            WHERE id = $1 AND token_version = $2
            RETURNING token_version
            "#,
        )
        .bind(id)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await?;

        Ok(version)
    }

    async fn insert(&self, identity: &Identity) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, login, display_name, role,
                               password_hash, is_active, token_version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(identity.id)
        .bind(&identity.username)
        .bind(&identity.email)
        .bind(identity.login.as_deref())
        .bind(identity.display_name.as_deref())
        .bind(identity.role.as_str())
        .bind(identity.password_digest())
        .bind(identity.is_active)
        .bind(identity.token_version)
        .execute(&self.pool)
        .await?;

        tracing::info!(user_id = %identity.id, username = %identity.username, "Identity created");
        Ok(())
    }
}
