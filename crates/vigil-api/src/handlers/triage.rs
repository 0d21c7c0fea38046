//! Triage HTTP handlers.
//!
//! Client records and their contact logs, the ranked outreach queue, and the
//! hotspot context for a client's home location.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::{require_source, SourceQuery};
use crate::{ApiError, AppState};
use vigil_core::{
    Client, ClientRepository, ContactLog, ContactRepository, CreateClientRequest,
    CreateContactRequest, HotspotRepository, QueueItem, StoredHotspotCell, TriageSnapshotSource,
    UpdateClientRequest,
};
use vigil_signals::nearest;

#[derive(Debug, Serialize)]
pub struct ClientResponse {
    pub client: Client,
}

#[derive(Debug, Serialize)]
pub struct ClientListResponse {
    pub clients: Vec<Client>,
}

#[derive(Debug, Serialize)]
pub struct ClientDetailResponse {
    pub client: Client,
    /// Newest first.
    pub contacts: Vec<ContactLog>,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub contact: ContactLog,
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub items: Vec<QueueItem>,
}

#[derive(Debug, Serialize)]
pub struct ContextResponse {
    pub nearest_hotspot: Option<StoredHotspotCell>,
}

async fn load_client(state: &AppState, id: Uuid) -> Result<Client, ApiError> {
    state
        .db
        .clients
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Client {} not found", id)))
}

/// Create a client.
///
/// # Returns
/// - 201 Created with `{client}`
/// - 400 Bad Request if `display_name` is blank or coordinates are invalid
pub async fn create_client(
    State(state): State<AppState>,
    Json(body): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientResponse>), ApiError> {
    let client = state.db.clients.create(body).await?;
    Ok((StatusCode::CREATED, Json(ClientResponse { client })))
}

/// List clients, newest first.
pub async fn list_clients(
    State(state): State<AppState>,
) -> Result<Json<ClientListResponse>, ApiError> {
    let clients = state.db.clients.list_clients().await?;
    Ok(Json(ClientListResponse { clients }))
}

/// Get a client together with its contact history.
///
/// # Returns
/// - 200 OK with `{client, contacts}`
/// - 404 Not Found if the client doesn't exist
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientDetailResponse>, ApiError> {
    let client = load_client(&state, id).await?;
    let contacts = state.db.contacts.list_for_client(id).await?;
    Ok(Json(ClientDetailResponse { client, contacts }))
}

/// Patch a client. Absent fields are left alone; `null` or `""` clears
/// optional fields.
///
/// # Returns
/// - 200 OK with `{client}`
/// - 404 Not Found if the client doesn't exist
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateClientRequest>,
) -> Result<Json<ClientResponse>, ApiError> {
    let client = state.db.clients.update(id, body).await?;
    Ok(Json(ClientResponse { client }))
}

/// Delete a client and its contact logs.
///
/// # Returns
/// - 204 No Content
/// - 404 Not Found if the client doesn't exist
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.db.clients.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Append a contact attempt to a client's log.
///
/// The outcome must be one of `reached`, `no_answer`, `referral`, `other`.
///
/// # Returns
/// - 201 Created with `{contact}`
/// - 400 Bad Request for an unknown outcome
/// - 404 Not Found if the client doesn't exist
pub async fn log_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<ContactResponse>), ApiError> {
    let contact = body.validate(Utc::now())?;
    let contact = state.db.contacts.log_contact(id, contact).await?;
    Ok((StatusCode::CREATED, Json(ContactResponse { contact })))
}

/// Every client ranked by urgency, highest first.
pub async fn triage_queue(State(state): State<AppState>) -> Result<Json<QueueResponse>, ApiError> {
    let snapshot = state.db.snapshots.triage_snapshot().await?;
    let items = state
        .scorer
        .rank(&snapshot.clients, &snapshot.contacts, Utc::now());
    Ok(Json(QueueResponse { items }))
}

/// Nearest stored hotspot cell to a client's home location.
///
/// `nearest_hotspot` is null when the client has no home location or the
/// source has no stored cells.
///
/// # Returns
/// - 200 OK with `{nearest_hotspot}`
/// - 404 Not Found if the client doesn't exist
pub async fn client_context(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SourceQuery>,
) -> Result<Json<ContextResponse>, ApiError> {
    let source = require_source(&query.source)?;
    let client = load_client(&state, id).await?;

    let Some(home) = client.home_point() else {
        debug!(subsystem = "api", component = "proximity", client_id = %id, "Client has no home location");
        return Ok(Json(ContextResponse {
            nearest_hotspot: None,
        }));
    };

    let cells = state.db.hotspots.list_cells(source).await?;
    let nearest_hotspot = nearest(Some(home), &cells).cloned();
    Ok(Json(ContextResponse { nearest_hotspot }))
}
