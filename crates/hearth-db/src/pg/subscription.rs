//! PostgreSQL subscription repository implementation

use async_trait::async_trait;
use hearth_types::{PlanType, SubscriptionStatus};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::SubscriptionRow;
use crate::repo::{SubscriptionRepository, UpsertSubscription};

const SELECT_COLUMNS: &str = "id, household_id, plan, status, is_active, trial_end_date, \
     subscription_start_date, subscription_end_date, stripe_customer_id, \
     stripe_subscription_id, canceled_at, refunded_at, refund_id, created_at, updated_at";

/// PostgreSQL subscription repository
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn find_by_household(&self, household_id: Uuid) -> DbResult<Option<SubscriptionRow>> {
        let sub = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM subscriptions WHERE household_id = $1"
        ))
        .bind(household_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub)
    }

    async fn find_by_stripe_subscription_id(
        &self,
        stripe_id: &str,
    ) -> DbResult<Option<SubscriptionRow>> {
        let sub = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM subscriptions WHERE stripe_subscription_id = $1"
        ))
        .bind(stripe_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub)
    }

    async fn find_by_stripe_customer_id(
        &self,
        customer_id: &str,
    ) -> DbResult<Option<SubscriptionRow>> {
        let sub = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM subscriptions WHERE stripe_customer_id = $1"
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub)
    }

    async fn ensure_default(&self, household_id: Uuid) -> DbResult<()> {
        // Upsert-by-owner: a concurrent call cannot create a second row,
        // and an existing paid row is left untouched.
        sqlx::query(
            r#"
            INSERT INTO subscriptions (id, household_id, plan, status, is_active)
            VALUES ($1, $2, $3, $4, TRUE)
            ON CONFLICT (household_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(household_id)
        .bind(PlanType::Free.to_string())
        .bind(SubscriptionStatus::Active.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_from_provider(&self, sub: UpsertSubscription) -> DbResult<SubscriptionRow> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            INSERT INTO subscriptions (id, household_id, plan, status, is_active,
                                       stripe_customer_id, stripe_subscription_id,
                                       subscription_start_date, subscription_end_date)
            VALUES ($1, $2, $3, $4, TRUE, $5, $6, $7, $8)
            ON CONFLICT (household_id) DO UPDATE SET
                plan = EXCLUDED.plan,
                status = EXCLUDED.status,
                is_active = TRUE,
                stripe_customer_id = EXCLUDED.stripe_customer_id,
                stripe_subscription_id = EXCLUDED.stripe_subscription_id,
                subscription_start_date = EXCLUDED.subscription_start_date,
                subscription_end_date = EXCLUDED.subscription_end_date,
                updated_at = NOW()
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(sub.household_id)
        .bind(&sub.plan)
        .bind(SubscriptionStatus::Active.to_string())
        .bind(&sub.stripe_customer_id)
        .bind(&sub.stripe_subscription_id)
        .bind(sub.subscription_start_date)
        .bind(sub.subscription_end_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_stripe_customer_id(
        &self,
        household_id: Uuid,
        customer_id: &str,
    ) -> DbResult<()> {
        sqlx::query(
            "UPDATE subscriptions SET stripe_customer_id = $1, updated_at = NOW() \
             WHERE household_id = $2",
        )
        .bind(customer_id)
        .bind(household_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_canceled(&self, id: Uuid, refund_id: Option<&str>) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = $1,
                is_active = FALSE,
                canceled_at = NOW(),
                refund_id = COALESCE($2, refund_id),
                refunded_at = CASE WHEN $2 IS NULL THEN refunded_at ELSE NOW() END,
                updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(SubscriptionStatus::Canceled.to_string())
        .bind(refund_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
