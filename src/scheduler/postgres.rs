use async_trait::async_trait;
use sqlx::PgPool;

use super::{Article, ArticlePublisher, Character, CharacterDirectory};
use crate::error::DatabaseError;

/// Reads `characters` and writes `articles`; both tables are owned by the
/// content service
#[derive(Clone)]
pub struct PgBirthdayStore {
    pool: PgPool,
}

impl PgBirthdayStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CharacterDirectory for PgBirthdayStore {
    async fn born_on(&self, month: u32, day: u32) -> Result<Vec<Character>, DatabaseError> {
        let characters = sqlx::query_as::<_, Character>(
            r#"
            SELECT id, name, slug
            FROM characters
            WHERE birthday_month = $1 AND birthday_day = $2
            ORDER BY name
            "#,
        )
        .bind(month as i32)
        .bind(day as i32)
        .fetch_all(&self.pool)
        .await?;

        Ok(characters)
    }
}

#[async_trait]
impl ArticlePublisher for PgBirthdayStore {
    async fn exists(&self, slug: &str) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM articles WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn publish(&self, article: &Article) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO articles (id, title, slug, content, category, character_id, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(uuid::Uuid::new_v4())
        .bind(&article.title)
        .bind(&article.slug)
        .bind(&article.content)
        .bind(&article.category)
        .bind(article.character_id)
        .bind(article.published_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
