//! PostgreSQL repository implementations

mod child;
mod household;
mod nanny_token;
mod subscription;
mod usage;

pub use child::PgChildRepository;
pub use household::PgHouseholdRepository;
pub use nanny_token::PgNannyTokenRepository;
pub use subscription::PgSubscriptionRepository;
pub use usage::PgUsageRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub subscriptions: PgSubscriptionRepository,
    pub nanny_tokens: PgNannyTokenRepository,
    pub children: PgChildRepository,
    pub households: PgHouseholdRepository,
    pub usage: PgUsageRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            subscriptions: PgSubscriptionRepository::new(pool.clone()),
            nanny_tokens: PgNannyTokenRepository::new(pool.clone()),
            children: PgChildRepository::new(pool.clone()),
            households: PgHouseholdRepository::new(pool.clone()),
            usage: PgUsageRepository::new(pool),
        }
    }
}
