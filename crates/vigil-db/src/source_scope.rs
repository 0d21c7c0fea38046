//! Source-scoped write transactions.
//!
//! Every write to a source's derived data (its hotspot cells) goes through a
//! `SourceScope`, which serializes writers per source with a transaction-level
//! advisory lock. Writers for different sources hash to different locks and
//! proceed in parallel.

use std::future::Future;
use std::pin::Pin;

use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use vigil_core::{Error, Result};

/// Prefix mixed into the advisory lock key so source locks cannot collide
/// with locks taken for other purposes.
const LOCK_NAMESPACE: &str = "hotspots:";

/// A write context bound to one incident source.
///
/// # Examples
///
/// ```rust,ignore
/// let scope = SourceScope::new(pool.clone(), "sdpd_demo")?;
/// scope.execute(|tx| Box::pin(async move {
///     sqlx::query("DELETE FROM hotspot_cell WHERE source = $1")
///         .bind("sdpd_demo")
///         .execute(&mut **tx)
///         .await?;
///     Ok(())
/// })).await?;
/// ```
#[derive(Clone)]
pub struct SourceScope {
    pool: PgPool,
    source: String,
}

impl SourceScope {
    pub fn new(pool: PgPool, source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        if source.trim().is_empty() {
            return Err(Error::InvalidInput("source is required".to_string()));
        }
        Ok(Self { pool, source })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Run `f` inside a transaction holding this source's advisory lock.
    ///
    /// The transaction commits only when `f` succeeds. On error, or if the
    /// future is dropped before completion, the transaction is rolled back
    /// when it goes out of scope and the lock is released with it.
    pub async fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: for<'a> FnOnce(
            &'a mut Transaction<'_, Postgres>,
        ) -> Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>,
    {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1 || $2))")
            .bind(LOCK_NAMESPACE)
            .bind(&self.source)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        debug!(
            subsystem = "database",
            component = "source_scope",
            source = %self.source,
            "Acquired source lock"
        );

        let result = f(&mut tx).await?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(result)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
