//! Consistent triage snapshots.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::debug;

use vigil_core::{Error, Result, TriageSnapshot, TriageSnapshotSource};

use crate::clients::{client_from_row, CLIENT_COLUMNS};
use crate::contacts::{contact_from_row, CONTACT_COLUMNS};

/// Reads clients and contact logs from a single `REPEATABLE READ` snapshot,
/// so a contact inserted mid-read is either fully visible or not at all.
pub struct PgTriageSnapshotSource {
    pool: Pool<Postgres>,
}

impl PgTriageSnapshotSource {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TriageSnapshotSource for PgTriageSnapshotSource {
    async fn triage_snapshot(&self) -> Result<TriageSnapshot> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let clients = sqlx::query(&format!(
            "SELECT {CLIENT_COLUMNS} FROM client ORDER BY created_at, id"
        ))
        .fetch_all(&mut *tx)
        .await
        .map_err(Error::Database)?
        .iter()
        .map(client_from_row)
        .collect::<Vec<_>>();

        let contacts = sqlx::query(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_log ORDER BY contacted_at, id"
        ))
        .fetch_all(&mut *tx)
        .await
        .map_err(Error::Database)?
        .iter()
        .map(contact_from_row)
        .collect::<Vec<_>>();

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "snapshot",
            client_count = clients.len(),
            contact_count = contacts.len(),
            "Triage snapshot read"
        );
        Ok(TriageSnapshot { clients, contacts })
    }
}
