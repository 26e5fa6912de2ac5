//! # cadence-db
//!
//! PostgreSQL database layer for cadence.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for reminders, suggestions, and member
//!   tombstones
//!
//! No core logic lives here: the repositories are query plumbing behind the
//! trait boundary in cadence-core, and they are the only writers of the rows
//! they own.
//!
//! ## Example
//!
//! ```rust,ignore
//! use cadence_db::Database;
//! use cadence_core::{CreateReminderRequest, LifecycleStatus, ReminderRepository, TargetType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/cadence").await?;
//!
//!     let id = db.reminders.create(CreateReminderRequest {
//!         title: "weekly review".to_string(),
//!         occurrence_time: chrono::Utc::now(),
//!         target_type: TargetType::Event,
//!         target_id: uuid::Uuid::now_v7(),
//!         member_id: uuid::Uuid::now_v7(),
//!         lifecycle_status: LifecycleStatus::Active,
//!     }).await?;
//!
//!     println!("Created reminder: {id}");
//!     Ok(())
//! }
//! ```

pub mod members;
pub mod pool;
pub mod reminders;
pub mod suggestions;

// Re-export core types
pub use cadence_core::*;

// Re-export repository implementations
pub use members::PgMemberRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use reminders::PgReminderRepository;
pub use suggestions::PgSuggestionRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Reminder repository, written to only by the lifecycle manager.
    pub reminders: PgReminderRepository,
    /// Suggestion repository, written to only by the batch job and the
    /// invalidation service.
    pub suggestions: PgSuggestionRepository,
    /// Member tombstone repository for the retention sweep.
    pub members: PgMemberRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            reminders: PgReminderRepository::new(pool.clone()),
            suggestions: PgSuggestionRepository::new(pool.clone()),
            members: PgMemberRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect to the database and build the repository context.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = pool::create_pool(database_url).await?;
        Ok(Self::new(pool))
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
