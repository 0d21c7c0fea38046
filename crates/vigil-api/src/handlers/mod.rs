//! HTTP handlers for vigil-api.

pub mod hotspots;
pub mod incidents;
pub mod screening;
pub mod triage;

use serde::Deserialize;
use vigil_core::defaults;

use crate::ApiError;

fn default_source() -> String {
    defaults::DEFAULT_SOURCE.to_string()
}

/// `?source=` query parameter shared by the hotspot and context endpoints.
#[derive(Debug, Deserialize)]
pub struct SourceQuery {
    #[serde(default = "default_source")]
    pub source: String,
}

/// Trim a source name, rejecting blanks.
pub(crate) fn require_source(source: &str) -> Result<&str, ApiError> {
    let source = source.trim();
    if source.is_empty() {
        return Err(ApiError::BadRequest("source is required".to_string()));
    }
    Ok(source)
}
