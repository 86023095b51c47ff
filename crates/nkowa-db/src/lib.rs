//! # nkowa-db
//!
//! Storage layer for the Nkọwa suggestions service.
//!
//! This crate provides:
//! - Connection pool management
//! - PostgreSQL repositories for word suggestions, example suggestions, and
//!   accepted examples
//! - An in-memory store implementing the same repository traits
//!
//! ## Example
//!
//! ```rust,ignore
//! use nkowa_db::{Database, WordSuggestionRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/nkowa").await?;
//!     let suggestion = db.word_suggestions.fetch(id).await?;
//!     println!("{}", suggestion.word);
//!     Ok(())
//! }
//! ```

pub mod example_suggestions;
pub mod examples;
pub mod filter;
pub mod memory;
pub mod pool;
pub mod word_suggestions;

// Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use nkowa_core::*;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub use example_suggestions::PgExampleSuggestionRepository;
pub use examples::PgExampleRepository;
pub use filter::{QueryParam, WhereClause};
pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use word_suggestions::PgWordSuggestionRepository;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub word_suggestions: PgWordSuggestionRepository,
    pub example_suggestions: PgExampleSuggestionRepository,
    pub examples: PgExampleRepository,
}

impl Database {
    /// Create a new Database instance from an existing pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            word_suggestions: PgWordSuggestionRepository::new(pool.clone()),
            example_suggestions: PgExampleSuggestionRepository::new(pool.clone()),
            examples: PgExampleRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
