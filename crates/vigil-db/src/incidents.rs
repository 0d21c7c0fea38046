//! Incident repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use vigil_core::{CreateIncidentRequest, Error, IncidentRecord, IncidentRepository, Result};

/// PostgreSQL implementation of IncidentRepository.
pub struct PgIncidentRepository {
    pool: Pool<Postgres>,
}

impl PgIncidentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn incident_from_row(r: &PgRow) -> IncidentRecord {
    IncidentRecord {
        id: r.get("id"),
        source: r.get("source"),
        incident_type: r.get("incident_type"),
        occurred_at: r.get("occurred_at"),
        lat: r.get("lat"),
        lon: r.get("lon"),
    }
}

#[async_trait]
impl IncidentRepository for PgIncidentRepository {
    async fn insert_bulk(&self, incidents: Vec<CreateIncidentRequest>) -> Result<Vec<Uuid>> {
        let incidents = incidents
            .into_iter()
            .map(CreateIncidentRequest::validate)
            .collect::<Result<Vec<_>>>()?;

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let mut ids = Vec::with_capacity(incidents.len());

        for incident in &incidents {
            let id = Uuid::now_v7();
            sqlx::query(
                "INSERT INTO incident (id, source, incident_type, occurred_at, lat, lon)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(id)
            .bind(&incident.source)
            .bind(&incident.incident_type)
            .bind(incident.occurred_at)
            .bind(incident.lat)
            .bind(incident.lon)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
            ids.push(id);
        }

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "database",
            component = "incidents",
            op = "insert_bulk",
            incident_count = ids.len(),
            "Incidents inserted"
        );
        Ok(ids)
    }

    async fn list_incidents(&self, source: &str) -> Result<Vec<IncidentRecord>> {
        let rows = sqlx::query(
            "SELECT id, source, incident_type, occurred_at, lat, lon
             FROM incident
             WHERE source = $1
             ORDER BY occurred_at DESC, id",
        )
        .bind(source)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "incidents",
            op = "list",
            source,
            result_count = rows.len(),
            "Listed incidents"
        );
        Ok(rows.iter().map(incident_from_row).collect())
    }

    async fn count(&self, source: &str) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM incident WHERE source = $1")
            .bind(source)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.get("n"))
    }
}
