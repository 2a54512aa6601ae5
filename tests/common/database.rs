//! Database test fixtures
//!
//! PostgreSQL tests run against `TEST_DATABASE_URL` and are skipped when it
//! is unset. Every fixture hands out fresh identities, so tests sharing one
//! database never see each other's rows.

use capsule_relay::backend::messaging::PgMessageStore;
use sqlx::PgPool;
use uuid::Uuid;

/// Environment variable naming the test database
pub const TEST_DATABASE_ENV: &str = "TEST_DATABASE_URL";

/// Test database fixture
pub struct TestDatabase {
    pool: PgPool,
}

impl TestDatabase {
    /// Connect and migrate, or `None` when no test database is configured
    pub async fn from_env() -> Option<Self> {
        let Ok(database_url) = std::env::var(TEST_DATABASE_ENV) else {
            eprintln!("{TEST_DATABASE_ENV} not set, skipping PostgreSQL test");
            return None;
        };

        let pool = PgPool::connect(&database_url)
            .await
            .expect("Failed to create test database pool");
        PgMessageStore::new(pool.clone())
            .migrate()
            .await
            .expect("Failed to run migrations");
        Some(Self { pool })
    }

    /// Get the database pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// A store over the migrated database
    pub fn store(&self) -> PgMessageStore {
        PgMessageStore::new(self.pool.clone())
    }
}

/// An identity no other test uses
pub fn unique_identity(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}
