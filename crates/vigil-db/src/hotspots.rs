//! Hotspot cell repository implementation.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use vigil_core::{Error, HotspotCell, HotspotRepository, Result, StoredHotspotCell};

use crate::source_scope::SourceScope;

/// PostgreSQL implementation of HotspotRepository.
pub struct PgHotspotRepository {
    pool: Pool<Postgres>,
}

impl PgHotspotRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn stored_cell_from_row(r: &PgRow) -> StoredHotspotCell {
    StoredHotspotCell {
        id: r.get("id"),
        source: r.get("source"),
        computed_at: r.get("computed_at"),
        cell: HotspotCell {
            grid_lat: r.get("grid_lat"),
            grid_lon: r.get("grid_lon"),
            recent_count: r.get("recent_count"),
            baseline_count: r.get("baseline_count"),
            risk_score: r.get("risk_score"),
        },
    }
}

#[async_trait]
impl HotspotRepository for PgHotspotRepository {
    async fn replace_cells(
        &self,
        source: &str,
        cells: &[HotspotCell],
        computed_at: DateTime<Utc>,
    ) -> Result<usize> {
        let start = Instant::now();
        let scope = SourceScope::new(self.pool.clone(), source)?;
        let source = scope.source().to_string();
        let cells = cells.to_vec();

        let (deleted, written) = scope
            .execute(move |tx| {
                Box::pin(async move {
                    let deleted = sqlx::query("DELETE FROM hotspot_cell WHERE source = $1")
                        .bind(&source)
                        .execute(&mut **tx)
                        .await
                        .map_err(Error::Database)?
                        .rows_affected();

                    for cell in &cells {
                        sqlx::query(
                            "INSERT INTO hotspot_cell
                                (id, source, grid_lat, grid_lon, recent_count, baseline_count,
                                 risk_score, computed_at)
                             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
                        )
                        .bind(Uuid::now_v7())
                        .bind(&source)
                        .bind(cell.grid_lat)
                        .bind(cell.grid_lon)
                        .bind(cell.recent_count)
                        .bind(cell.baseline_count)
                        .bind(cell.risk_score)
                        .bind(computed_at)
                        .execute(&mut **tx)
                        .await
                        .map_err(Error::Database)?;
                    }
                    Ok((deleted, cells.len()))
                })
            })
            .await?;

        info!(
            subsystem = "database",
            component = "hotspots",
            op = "replace_cells",
            source = scope.source(),
            deleted_count = deleted,
            cell_count = written,
            duration_ms = start.elapsed().as_millis() as u64,
            "Hotspot cells replaced"
        );
        Ok(written)
    }

    async fn top_cells(&self, source: &str, limit: i64) -> Result<Vec<StoredHotspotCell>> {
        let rows = sqlx::query(
            "SELECT id, source, grid_lat, grid_lon, recent_count, baseline_count, risk_score, computed_at
             FROM hotspot_cell
             WHERE source = $1
             ORDER BY risk_score DESC, grid_lat, grid_lon
             LIMIT $2",
        )
        .bind(source)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "hotspots",
            op = "top_cells",
            source,
            limit,
            result_count = rows.len(),
            "Fetched top hotspot cells"
        );
        Ok(rows.iter().map(stored_cell_from_row).collect())
    }

    async fn list_cells(&self, source: &str) -> Result<Vec<StoredHotspotCell>> {
        let rows = sqlx::query(
            "SELECT id, source, grid_lat, grid_lon, recent_count, baseline_count, risk_score, computed_at
             FROM hotspot_cell
             WHERE source = $1",
        )
        .bind(source)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(stored_cell_from_row).collect())
    }
}
