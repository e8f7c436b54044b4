mod schema;
pub mod from_row;
pub mod queries;

pub use schema::init_db;

use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::payments::StripeClient;

pub type DbPool = Pool<SqliteConnectionManager>;

/// How long a unit of work may wait for a pooled connection before the
/// request is rejected as transiently unavailable.
const POOL_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Application state holding the database pool and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub stripe: StripeClient,
    /// Base URL for checkout redirect targets (e.g., https://api.example.com)
    pub base_url: String,
    /// Currency assumed when a notification carries none (e.g., "USD")
    pub default_currency: String,
}

/// Create a bounded connection pool.
///
/// Every connection enables foreign-key enforcement (off by default in
/// SQLite) and a bounded busy timeout so a unit of work blocked on the
/// write lock fails within a known window instead of hanging.
pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )
    });
    Pool::builder()
        .max_size(10)
        .connection_timeout(POOL_ACQUIRE_TIMEOUT)
        .build(manager)
}
