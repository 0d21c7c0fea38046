//! Contact log repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use vigil_core::{ContactLog, ContactOutcome, ContactRepository, Error, NewContactLog, Result};

pub(crate) const CONTACT_COLUMNS: &str = "id, client_id, contacted_at, outcome, note";

/// PostgreSQL implementation of ContactRepository.
pub struct PgContactRepository {
    pool: Pool<Postgres>,
}

impl PgContactRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Unknown outcome values degrade to `Other` rather than failing the read.
pub(crate) fn contact_from_row(r: &PgRow) -> ContactLog {
    let outcome: String = r.get("outcome");
    ContactLog {
        id: r.get("id"),
        client_id: r.get("client_id"),
        contacted_at: r.get("contacted_at"),
        outcome: ContactOutcome::parse_lenient(&outcome),
        note: r.get("note"),
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn log_contact(&self, client_id: Uuid, contact: NewContactLog) -> Result<ContactLog> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Lock the client row so a concurrent delete cannot slip in between
        // the existence check and the insert.
        let exists = sqlx::query("SELECT 1 FROM client WHERE id = $1 FOR SHARE")
            .bind(client_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?
            .is_some();
        if !exists {
            return Err(Error::ClientNotFound(client_id));
        }

        let log = ContactLog {
            id: Uuid::now_v7(),
            client_id,
            contacted_at: contact.contacted_at,
            outcome: contact.outcome,
            note: contact.note,
        };

        sqlx::query(&format!(
            "INSERT INTO contact_log ({CONTACT_COLUMNS}) VALUES ($1, $2, $3, $4, $5)"
        ))
        .bind(log.id)
        .bind(log.client_id)
        .bind(log.contacted_at)
        .bind(log.outcome.as_str())
        .bind(&log.note)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "database",
            component = "contacts",
            op = "log_contact",
            client_id = %client_id,
            outcome = log.outcome.as_str(),
            "Contact logged"
        );
        Ok(log)
    }

    async fn list_for_client(&self, client_id: Uuid) -> Result<Vec<ContactLog>> {
        let rows = sqlx::query(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_log
             WHERE client_id = $1
             ORDER BY contacted_at DESC, id DESC"
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(contact_from_row).collect())
    }

    async fn list_contacts(&self) -> Result<Vec<ContactLog>> {
        let rows = sqlx::query(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_log ORDER BY contacted_at, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(contact_from_row).collect())
    }
}
