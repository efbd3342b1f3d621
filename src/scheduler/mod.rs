/// Background jobs
///
/// Currently a single one: birthday articles for the character pages.

mod birthday;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DatabaseError;

pub use birthday::BirthdayNotifier;
pub use postgres::PgBirthdayStore;

/// A character as far as the birthday job cares
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Character {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category: String,
    pub character_id: Uuid,
    pub published_at: DateTime<Utc>,
}

#[async_trait]
pub trait CharacterDirectory: Send + Sync {
    async fn born_on(&self, month: u32, day: u32) -> Result<Vec<Character>, DatabaseError>;
}

#[async_trait]
pub trait ArticlePublisher: Send + Sync {
    async fn exists(&self, slug: &str) -> Result<bool, DatabaseError>;

    async fn publish(&self, article: &Article) -> Result<(), DatabaseError>;
}
