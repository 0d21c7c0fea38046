//! Hotspot HTTP handlers.
//!
//! Seeding demo incidents, recomputing a source's cells, and reading the
//! highest-risk cells back.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{default_source, require_source, SourceQuery};
use crate::{ApiError, AppState};
use vigil_core::{defaults, HotspotRepository, IncidentRepository, StoredHotspotCell};
use vigil_signals::{generate_demo_incidents, refresh_hotspots, RefreshOutcome};

/// Query parameters for seeding demo incidents.
#[derive(Debug, Deserialize)]
pub struct SeedQuery {
    #[serde(default = "default_source")]
    pub source: String,
    /// Number of incidents to generate (default 120)
    pub n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub status: &'static str,
    pub inserted: usize,
    pub source: String,
}

/// Query parameters for listing hotspot cells.
#[derive(Debug, Deserialize)]
pub struct ListHotspotsQuery {
    #[serde(default = "default_source")]
    pub source: String,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HotspotListResponse {
    pub source: String,
    pub cells: Vec<StoredHotspotCell>,
}

/// Insert synthetic incidents for a source.
///
/// # Returns
/// - 201 Created with `{status: "seeded", inserted, source}`
/// - 400 Bad Request if `n` exceeds the seed maximum or the source is blank
pub async fn seed_hotspots(
    State(state): State<AppState>,
    Query(query): Query<SeedQuery>,
) -> Result<(StatusCode, Json<SeedResponse>), ApiError> {
    let source = require_source(&query.source)?.to_string();
    let n = query.n.unwrap_or(defaults::DEMO_INCIDENT_COUNT);
    if n > defaults::DEMO_INCIDENT_MAX {
        return Err(ApiError::BadRequest(format!(
            "n must be at most {}, got {}",
            defaults::DEMO_INCIDENT_MAX,
            n
        )));
    }

    // ThreadRng is not Send; keep it out of the await below.
    let incidents = {
        let mut rng = rand::thread_rng();
        generate_demo_incidents(&mut rng, &source, n, Utc::now())
    };
    let ids = state.db.incidents.insert_bulk(incidents).await?;

    Ok((
        StatusCode::CREATED,
        Json(SeedResponse {
            status: "seeded",
            inserted: ids.len(),
            source,
        }),
    ))
}

/// Recompute and store hotspot cells for a source.
///
/// # Returns
/// - 200 OK with `{status: "no_incidents" | "computed", cells}`
pub async fn run_hotspots(
    State(state): State<AppState>,
    Query(query): Query<SourceQuery>,
) -> Result<Json<RefreshOutcome>, ApiError> {
    let source = require_source(&query.source)?;
    let outcome = refresh_hotspots(
        &state.db.incidents,
        &state.db.hotspots,
        &state.aggregator,
        source,
        Utc::now(),
    )
    .await?;
    Ok(Json(outcome))
}

/// Highest-risk stored cells for a source.
///
/// # Query Parameters
/// - `source`: incident source (default `sdpd_demo`)
/// - `limit`: number of cells, clamped to 1..=500 (default 50)
///
/// # Returns
/// - 200 OK with `{source, cells}`, cells in descending risk order
pub async fn list_hotspots(
    State(state): State<AppState>,
    Query(query): Query<ListHotspotsQuery>,
) -> Result<Json<HotspotListResponse>, ApiError> {
    let source = require_source(&query.source)?.to_string();
    let limit = query
        .limit
        .unwrap_or(defaults::HOTSPOT_TOP_LIMIT)
        .clamp(1, defaults::HOTSPOT_TOP_LIMIT_MAX);

    let cells = state.db.hotspots.top_cells(&source, limit).await?;
    tracing::debug!(
        subsystem = "api",
        component = "hotspots",
        source = %source,
        result_count = cells.len(),
        "Listed hotspot cells"
    );
    Ok(Json(HotspotListResponse { source, cells }))
}
