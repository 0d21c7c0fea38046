//! Intake screening handler.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::AppState;
use vigil_signals::ScreeningOutcome;

#[derive(Debug, Default, Deserialize)]
pub struct ScreeningRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

/// Screen free-text intake notes for high-risk keywords.
///
/// Never fails: missing notes screen as routine.
pub async fn submit_screening(
    State(state): State<AppState>,
    Json(body): Json<ScreeningRequest>,
) -> Json<ScreeningOutcome> {
    Json(state.screening.assess(body.notes.as_deref()))
}
