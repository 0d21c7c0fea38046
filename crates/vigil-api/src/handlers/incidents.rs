//! Incident intake handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiError, AppState};
use vigil_core::{defaults, CreateIncidentRequest, IncidentRepository};

/// Request body for bulk incident intake.
#[derive(Debug, Deserialize)]
pub struct BulkIncidentRequest {
    pub incidents: Vec<CreateIncidentRequest>,
}

#[derive(Debug, Serialize)]
pub struct BulkIncidentResponse {
    pub inserted: usize,
    pub ids: Vec<Uuid>,
}

/// Insert a batch of incidents.
///
/// The batch is all or nothing: one invalid incident rejects the request and
/// nothing is stored.
///
/// # Returns
/// - 201 Created with the new incident ids
/// - 400 Bad Request if the batch is too large or any incident is invalid
pub async fn create_incidents(
    State(state): State<AppState>,
    Json(body): Json<BulkIncidentRequest>,
) -> Result<(StatusCode, Json<BulkIncidentResponse>), ApiError> {
    if body.incidents.len() > defaults::INCIDENT_BATCH_MAX {
        return Err(ApiError::BadRequest(format!(
            "At most {} incidents per request, got {}",
            defaults::INCIDENT_BATCH_MAX,
            body.incidents.len()
        )));
    }

    let ids = state.db.incidents.insert_bulk(body.incidents).await?;
    Ok((
        StatusCode::CREATED,
        Json(BulkIncidentResponse {
            inserted: ids.len(),
            ids,
        }),
    ))
}
