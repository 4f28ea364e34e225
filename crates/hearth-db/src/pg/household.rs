//! PostgreSQL household repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::HouseholdRow;
use crate::repo::HouseholdRepository;

/// PostgreSQL household repository
#[derive(Clone)]
pub struct PgHouseholdRepository {
    pool: PgPool,
}

impl PgHouseholdRepository {
    /// Create a new household repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HouseholdRepository for PgHouseholdRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<HouseholdRow>> {
        let row = sqlx::query_as::<_, HouseholdRow>(
            "SELECT id, name, owner_email, created_at FROM households WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_all(&self) -> DbResult<Vec<HouseholdRow>> {
        let rows = sqlx::query_as::<_, HouseholdRow>(
            "SELECT id, name, owner_email, created_at FROM households ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
