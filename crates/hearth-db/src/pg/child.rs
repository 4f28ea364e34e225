//! PostgreSQL child repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::ChildRow;
use crate::repo::ChildRepository;

const SELECT_COLUMNS: &str =
    "id, household_id, display_name, avatar_url, pin_hash, device_id, created_at, updated_at";

/// PostgreSQL child repository
#[derive(Clone)]
pub struct PgChildRepository {
    pool: PgPool,
}

impl PgChildRepository {
    /// Create a new child repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChildRepository for PgChildRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ChildRow>> {
        let row = sqlx::query_as::<_, ChildRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM children WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_pin_hash(
        &self,
        household_id: Uuid,
        pin_hash: &str,
    ) -> DbResult<Option<ChildRow>> {
        let row = sqlx::query_as::<_, ChildRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM children WHERE household_id = $1 AND pin_hash = $2"
        ))
        .bind(household_id)
        .bind(pin_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_device_id(&self, device_id: &str) -> DbResult<Option<ChildRow>> {
        let row = sqlx::query_as::<_, ChildRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM children WHERE device_id = $1"
        ))
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_pin_hash(&self, id: Uuid, pin_hash: &str) -> DbResult<()> {
        sqlx::query("UPDATE children SET pin_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(pin_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
