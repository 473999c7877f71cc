use async_trait::async_trait;
use castline_core::models::{Platform, PlatformConnection};
use castline_core::{AppError, EncryptionService};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::store_traits::ConnectionStore;

/// Repository for platform OAuth connections. Tokens are encrypted at rest.
#[derive(Clone)]
pub struct ConnectionRepository {
    pool: PgPool,
    encryption: EncryptionService,
}

impl ConnectionRepository {
    pub fn new(pool: PgPool, encryption: EncryptionService) -> Self {
        Self { pool, encryption }
    }

    fn from_row(&self, row: &PgRow) -> Result<PlatformConnection, AppError> {
        let platform: String = row.try_get("platform")?;
        let access_token: String = row.try_get("access_token_encrypted")?;
        let refresh_token: String = row.try_get("refresh_token_encrypted")?;
        Ok(PlatformConnection {
            user_id: row.try_get("user_id")?,
            platform: platform.parse::<Platform>()?,
            access_token: self.encryption.decrypt(&access_token)?,
            refresh_token: self.encryption.decrypt(&refresh_token)?,
            expires_at: row.try_get("expires_at")?,
            account_email: row.try_get("account_email")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl ConnectionStore for ConnectionRepository {
    async fn get_connection(
        &self,
        user_id: Uuid,
        platform: Platform,
    ) -> Result<Option<PlatformConnection>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, platform, access_token_encrypted, refresh_token_encrypted,
                   expires_at, account_email, created_at, updated_at
            FROM platform_connections
            WHERE user_id = $1 AND platform = $2
            "#,
        )
        .bind(user_id)
        .bind(platform.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(|r| self.from_row(r)).transpose()
    }

    async fn upsert_connection(&self, connection: &PlatformConnection) -> Result<(), AppError> {
        let access_token = self.encryption.encrypt(&connection.access_token)?;
        let refresh_token = self.encryption.encrypt(&connection.refresh_token)?;

        sqlx::query(
            r#"
            INSERT INTO platform_connections (
                user_id, platform, access_token_encrypted, refresh_token_encrypted,
                expires_at, account_email, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id, platform) DO UPDATE SET
                access_token_encrypted = EXCLUDED.access_token_encrypted,
                refresh_token_encrypted = EXCLUDED.refresh_token_encrypted,
                expires_at = EXCLUDED.expires_at,
                account_email = COALESCE(EXCLUDED.account_email, platform_connections.account_email),
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(connection.user_id)
        .bind(connection.platform.as_str())
        .bind(access_token)
        .bind(refresh_token)
        .bind(connection.expires_at)
        .bind(&connection.account_email)
        .bind(connection.created_at)
        .bind(connection.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_connection(
        &self,
        user_id: Uuid,
        platform: Platform,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM platform_connections
            WHERE user_id = $1 AND platform = $2
            "#,
        )
        .bind(user_id)
        .bind(platform.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_connection_if_unchanged(
        &self,
        user_id: Uuid,
        platform: Platform,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM platform_connections
            WHERE user_id = $1 AND platform = $2 AND updated_at = $3
            "#,
        )
        .bind(user_id)
        .bind(platform.as_str())
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_connections(&self, user_id: Uuid) -> Result<Vec<PlatformConnection>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, platform, access_token_encrypted, refresh_token_encrypted,
                   expires_at, account_email, created_at, updated_at
            FROM platform_connections
            WHERE user_id = $1
            ORDER BY platform
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|r| self.from_row(r)).collect()
    }
}
