use async_trait::async_trait;
use castline_core::models::{Draft, DraftStatus, Episode, NewEpisode};
use castline_core::AppError;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::episode::{episode_from_row, EPISODE_COLUMNS};
use crate::store_traits::DraftStore;

const DRAFT_COLUMNS: &str = "id, owner_id, podcast_id, original_object_path, edited_object_path, \
     content_type, status, created_at, updated_at";

fn draft_from_row(row: &PgRow) -> Result<Draft, AppError> {
    let status: String = row.try_get("status")?;
    Ok(Draft {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        podcast_id: row.try_get("podcast_id")?,
        original_object_path: row.try_get("original_object_path")?,
        edited_object_path: row.try_get("edited_object_path")?,
        content_type: row.try_get("content_type")?,
        status: status.parse::<DraftStatus>()?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Repository for drafts; owns the finalize transaction
#[derive(Clone)]
pub struct DraftRepository {
    pool: PgPool,
}

impl DraftRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DraftStore for DraftRepository {
    async fn insert_draft(&self, draft: &Draft) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO drafts (
                id, owner_id, podcast_id, original_object_path, edited_object_path,
                content_type, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(draft.id)
        .bind(draft.owner_id)
        .bind(draft.podcast_id)
        .bind(&draft.original_object_path)
        .bind(&draft.edited_object_path)
        .bind(&draft.content_type)
        .bind(draft.status.as_str())
        .bind(draft.created_at)
        .bind(draft.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_draft(&self, id: Uuid) -> Result<Option<Draft>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM drafts WHERE id = $1", DRAFT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(draft_from_row).transpose()
    }

    async fn advance_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        next: DraftStatus,
        edited_object_path: Option<&str>,
    ) -> Result<Option<Draft>, AppError> {
        expected.ensure_can_advance_to(next)?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE drafts
            SET status = $3,
                edited_object_path = COALESCE($4, edited_object_path),
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            DRAFT_COLUMNS
        ))
        .bind(id)
        .bind(expected.as_str())
        .bind(next.as_str())
        .bind(edited_object_path)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(draft_from_row).transpose()
    }

    async fn finalize_draft(
        &self,
        draft_id: Uuid,
        episode: NewEpisode,
    ) -> Result<Option<Episode>, AppError> {
        let mut tx = self.pool.begin().await?;

        // Conditional delete: a concurrent finalize that already removed the row wins
        let deleted = sqlx::query(
            r#"
            DELETE FROM drafts
            WHERE id = $1 AND status IN ('UPLOADED', 'EDITED')
            RETURNING id
            "#,
        )
        .bind(draft_id)
        .fetch_optional(&mut *tx)
        .await?;

        if deleted.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let metadata = &episode.metadata;
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO episodes (
                id, podcast_id, source_draft_id, title, description, audio_object_path,
                duration_sec, explicit, keywords, episode_number, season_number,
                is_published, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, FALSE, NOW(), NOW())
            RETURNING {}
            "#,
            EPISODE_COLUMNS
        ))
        .bind(episode.id)
        .bind(episode.podcast_id)
        .bind(episode.source_draft_id)
        .bind(&metadata.title)
        .bind(&metadata.description)
        .bind(&episode.audio_object_path)
        .bind(metadata.duration_sec)
        .bind(metadata.explicit)
        .bind(&metadata.keywords)
        .bind(metadata.episode_number)
        .bind(metadata.season_number)
        .fetch_one(&mut *tx)
        .await?;

        let created = episode_from_row(&row)?;
        tx.commit().await?;

        tracing::info!(
            draft_id = %draft_id,
            episode_id = %created.id,
            "Draft finalized into episode"
        );

        Ok(Some(created))
    }
}
