//! # vigil-db
//!
//! PostgreSQL storage layer for vigil.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for incidents, hotspot cells, clients and
//!   contact logs
//! - Source-scoped write transactions for hotspot replacement
//! - Consistent read snapshots for triage ranking
//!
//! ## Example
//!
//! ```rust,ignore
//! use vigil_db::{Database, IncidentRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/vigil").await?;
//!     let count = db.incidents.count("sdpd_demo").await?;
//!     println!("{} incidents", count);
//!     Ok(())
//! }
//! ```
pub mod clients;
pub mod contacts;
pub mod hotspots;
pub mod incidents;
pub mod pool;
pub mod snapshot;
pub mod source_scope;

// Always compiled so integration tests (in tests/) can use the fixtures.
pub mod test_fixtures;

// Re-export core types
pub use vigil_core::*;

pub use clients::PgClientRepository;
pub use contacts::PgContactRepository;
pub use hotspots::PgHotspotRepository;
pub use incidents::PgIncidentRepository;
pub use pool::{
    connect_options, create_pool, create_pool_with_config, log_pool_metrics, PoolConfig, PoolMetrics,
};
pub use snapshot::PgTriageSnapshotSource;
pub use source_scope::SourceScope;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub incidents: PgIncidentRepository,
    pub hotspots: PgHotspotRepository,
    pub clients: PgClientRepository,
    pub contacts: PgContactRepository,
    /// Consistent client + contact reads for triage.
    pub snapshots: PgTriageSnapshotSource,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            incidents: PgIncidentRepository::new(pool.clone()),
            hotspots: PgHotspotRepository::new(pool.clone()),
            clients: PgClientRepository::new(pool.clone()),
            contacts: PgContactRepository::new(pool.clone()),
            snapshots: PgTriageSnapshotSource::new(pool.clone()),
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

    /// Write context for one incident source.
    pub fn for_source(&self, source: &str) -> Result<SourceScope> {
        SourceScope::new(self.pool.clone(), source)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
