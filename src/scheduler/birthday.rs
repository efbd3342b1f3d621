use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;

use super::{Article, ArticlePublisher, Character, CharacterDirectory};
use crate::error::{ConfigError, DatabaseError};

const CATEGORY: &str = "birthday";

/// Publishes a birthday article for every character born today
pub struct BirthdayNotifier {
    directory: Arc<dyn CharacterDirectory>,
    publisher: Arc<dyn ArticlePublisher>,
    utc_offset: FixedOffset,
}

impl BirthdayNotifier {
    /// # Errors
    /// Fails when `utc_offset_hours` is outside -23..=23
    pub fn new(
        directory: Arc<dyn CharacterDirectory>,
        publisher: Arc<dyn ArticlePublisher>,
        utc_offset_hours: i32,
    ) -> Result<Self, ConfigError> {
        let utc_offset = utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ConfigError::InvalidValue(format!(
                    "scheduler.utc_offset_hours out of range: {}",
                    utc_offset_hours
                ))
            })?;

        Ok(Self {
            directory,
            publisher,
            utc_offset,
        })
    }

    /// Publish today's birthday articles; returns how many were new
    ///
    /// Only a failed character lookup fails the run. A character whose
    /// article cannot be checked or written is logged and skipped.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<usize, DatabaseError> {
        let today = now.with_timezone(&self.utc_offset).date_naive();
        let mut published = 0;

        for (month, day) in celebrated_on(today) {
            for character in self.directory.born_on(month, day).await? {
                let article = birthday_article(&character, today.year(), now);
                match self.publish_once(&article).await {
                    Ok(true) => {
                        tracing::info!(
                            character = %character.slug,
                            article = %article.slug,
                            "Published birthday article"
                        );
                        published += 1;
                    }
                    Ok(false) => {}
                    Err(e) => tracing::error!(
                        character = %character.slug,
                        error = %e,
                        "Failed to publish birthday article"
                    ),
                }
            }
        }

        Ok(published)
    }

    async fn publish_once(&self, article: &Article) -> Result<bool, DatabaseError> {
        if self.publisher.exists(&article.slug).await? {
            return Ok(false);
        }
        self.publisher.publish(article).await?;
        Ok(true)
    }

    /// Run `run_once` on every tick of `period`, starting immediately
    pub fn spawn(self: Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);

            loop {
                interval.tick().await;
                match self.run_once(Utc::now()).await {
                    Ok(count) if count > 0 => {
                        tracing::info!(count, "Birthday notifications published")
                    }
                    Ok(_) => {}
                    Err(e) => tracing::error!(error = %e, "Birthday notification run failed"),
                }
            }
        })
    }
}

/// Month/day pairs whose birthdays fall on `date`. 29 February birthdays
/// move to 28 February in common years.
fn celebrated_on(date: NaiveDate) -> Vec<(u32, u32)> {
    let mut days = vec![(date.month(), date.day())];
    let leap_year = NaiveDate::from_ymd_opt(date.year(), 2, 29).is_some();
    if date.month() == 2 && date.day() == 28 && !leap_year {
        days.push((2, 29));
    }
    days
}

fn birthday_article(character: &Character, year: i32, now: DateTime<Utc>) -> Article {
    Article {
        title: format!("Happy Birthday, {}!", character.name),
        slug: format!("birthday-{}-{}", character.slug, year),
        content: format!(
            "Today is {}'s birthday! Celebrate with the rest of the community.",
            character.name
        ),
        category: CATEGORY.to_string(),
        character_id: character.id,
        published_at: now,
    }
}
