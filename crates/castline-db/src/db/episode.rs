use async_trait::async_trait;
use castline_core::models::Episode;
use castline_core::AppError;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::store_traits::EpisodeStore;

pub(crate) const EPISODE_COLUMNS: &str = "id, podcast_id, source_draft_id, title, description, \
     audio_object_path, duration_sec, explicit, keywords, episode_number, season_number, \
     published_at, is_published, last_broadcast_at, created_at, updated_at";

pub(crate) fn episode_from_row(row: &PgRow) -> Result<Episode, AppError> {
    Ok(Episode {
        id: row.try_get("id")?,
        podcast_id: row.try_get("podcast_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        audio_object_path: row.try_get("audio_object_path")?,
        duration_sec: row.try_get("duration_sec")?,
        explicit: row.try_get("explicit")?,
        keywords: row.try_get("keywords")?,
        episode_number: row.try_get("episode_number")?,
        season_number: row.try_get("season_number")?,
        published_at: row.try_get("published_at")?,
        is_published: row.try_get("is_published")?,
        source_draft_id: row.try_get("source_draft_id")?,
        last_broadcast_at: row.try_get("last_broadcast_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[derive(Clone)]
pub struct EpisodeRepository {
    pool: PgPool,
}

impl EpisodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EpisodeStore for EpisodeRepository {
    async fn get_episode(&self, id: Uuid) -> Result<Option<Episode>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM episodes WHERE id = $1",
            EPISODE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(episode_from_row).transpose()
    }

    async fn find_by_source_draft(&self, draft_id: Uuid) -> Result<Option<Episode>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM episodes WHERE source_draft_id = $1",
            EPISODE_COLUMNS
        ))
        .bind(draft_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(episode_from_row).transpose()
    }

    async fn set_published(
        &self,
        id: Uuid,
        is_published: bool,
        published_at: DateTime<Utc>,
    ) -> Result<Option<Episode>, AppError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE episodes
            SET is_published = $2,
                published_at = CASE WHEN $2 THEN COALESCE(published_at, $3) ELSE published_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            EPISODE_COLUMNS
        ))
        .bind(id)
        .bind(is_published)
        .bind(published_at)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(episode_from_row).transpose()
    }

    async fn replace_audio(
        &self,
        id: Uuid,
        new_path: &str,
    ) -> Result<Option<(Episode, Option<String>)>, AppError> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<Option<String>> = sqlx::query(
            "SELECT audio_object_path FROM episodes WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .map(|row| row.try_get("audio_object_path"))
        .transpose()?;

        let Some(previous) = previous else {
            tx.rollback().await?;
            return Ok(None);
        };

        let row = sqlx::query(&format!(
            r#"
            UPDATE episodes
            SET audio_object_path = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            EPISODE_COLUMNS
        ))
        .bind(id)
        .bind(new_path)
        .fetch_one(&mut *tx)
        .await?;

        let updated = episode_from_row(&row)?;
        tx.commit().await?;

        Ok(Some((updated, previous)))
    }

    async fn record_broadcast(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE episodes
            SET last_broadcast_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
