//! SQLite persistence layer for Narinyland.
//!
//! This crate provides async database operations for the shared app
//! configuration, the partners' points ledger, gallery memories, timeline
//! events, coupons, love letters and the quest log, using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{Database, ledger};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:narinyland.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Grant XP to a partner
//!     let outcome = ledger::add_xp(db.pool(), "partner1", 40).await?;
//!     println!("level {}", outcome.current.level);
//!
//!     Ok(())
//! }
//! ```

pub mod app_config;
pub mod coupon;
pub mod error;
pub mod ledger;
pub mod letter;
pub mod memory;
pub mod models;
pub mod partner;
pub mod quest;
pub mod references;
pub mod timeline;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use models::{
    AppConfig, ConfigUpdate, Coupon, LoveLetter, LoveStats, NewCoupon, NewLoveLetter,
    NewMemory, NewTimelineEvent, Partner, QuestLogEntry, TimelineEventUpdate,
};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    pub const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/narinyland.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing; keep the pool at one connection)
    /// let db = database::Database::connect_with_pool_size("sqlite::memory:", 1).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Begin a transaction that holds the SQLite write lock from its first statement.
///
/// A plain `BEGIN` is deferred: two requests could both read the same balance
/// before either writes. Touching a row up front serializes ledger mutations.
pub(crate) async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        UPDATE love_stats
        SET updated_at = updated_at
        WHERE id = 1
        "#,
    )
    .execute(&mut *tx)
    .await?;

    Ok(tx)
}

/// Generate a new record ID.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
