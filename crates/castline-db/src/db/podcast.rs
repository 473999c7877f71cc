use std::collections::HashMap;

use async_trait::async_trait;
use castline_core::models::{Platform, Podcast};
use castline_core::AppError;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::store_traits::PodcastStore;

#[derive(Clone)]
pub struct PodcastRepository {
    pool: PgPool,
}

impl PodcastRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PodcastStore for PodcastRepository {
    async fn get_podcast(&self, id: Uuid) -> Result<Option<Podcast>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, title, created_at
            FROM podcasts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let show_rows = sqlx::query(
            r#"
            SELECT platform, show_ref
            FROM podcast_platform_shows
            WHERE podcast_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut external_show_ids = HashMap::new();
        for show in show_rows {
            let platform: String = show.try_get("platform")?;
            external_show_ids.insert(platform.parse::<Platform>()?, show.try_get("show_ref")?);
        }

        Ok(Some(Podcast {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            title: row.try_get("title")?,
            external_show_ids,
            created_at: row.try_get("created_at")?,
        }))
    }

    async fn create_podcast(&self, podcast: &Podcast) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO podcasts (id, owner_id, title, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(podcast.id)
        .bind(podcast.owner_id)
        .bind(&podcast.title)
        .bind(podcast.created_at)
        .execute(&mut *tx)
        .await?;

        for (platform, show_ref) in &podcast.external_show_ids {
            sqlx::query(
                r#"
                INSERT INTO podcast_platform_shows (podcast_id, platform, show_ref)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(podcast.id)
            .bind(platform.as_str())
            .bind(show_ref)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
