//! PostgreSQL nanny token repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::NannyTokenRow;
use crate::repo::{CreateNannyToken, NannyTokenRepository};

/// PostgreSQL nanny token repository
#[derive(Clone)]
pub struct PgNannyTokenRepository {
    pool: PgPool,
}

impl PgNannyTokenRepository {
    /// Create a new nanny token repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NannyTokenRepository for PgNannyTokenRepository {
    async fn create(&self, token: CreateNannyToken) -> DbResult<NannyTokenRow> {
        let row = sqlx::query_as::<_, NannyTokenRow>(
            r#"
            INSERT INTO nanny_tokens (id, household_id, token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, household_id, token_hash, created_at, expires_at, used, used_at
            "#,
        )
        .bind(token.id)
        .bind(token.household_id)
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn consume(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Option<NannyTokenRow>> {
        // Check-and-mark in one statement: only one of two concurrent
        // callers can observe used = FALSE.
        let row = sqlx::query_as::<_, NannyTokenRow>(
            r#"
            UPDATE nanny_tokens
            SET used = TRUE, used_at = $2
            WHERE token_hash = $1 AND used = FALSE AND expires_at > $2
            RETURNING id, household_id, token_hash, created_at, expires_at, used, used_at
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_hash(&self, token_hash: &str) -> DbResult<Option<NannyTokenRow>> {
        let row = sqlx::query_as::<_, NannyTokenRow>(
            "SELECT id, household_id, token_hash, created_at, expires_at, used, used_at \
             FROM nanny_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM nanny_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
