//! Core data models for vigil.
//!
//! These types are shared across all vigil crates: raw records owned by the
//! storage collaborator, the derived hotspot/queue records produced by the
//! engines, and the typed request payloads accepted at intake.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::timestamps;

// =============================================================================
// GEOMETRY
// =============================================================================

/// A point in (latitude, longitude) degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

fn validate_coordinates(lat: f64, lon: f64) -> Result<()> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(Error::InvalidInput(format!(
            "latitude must be a finite value in [-90, 90], got {}",
            lat
        )));
    }
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(Error::InvalidInput(format!(
            "longitude must be a finite value in [-180, 180], got {}",
            lon
        )));
    }
    Ok(())
}

/// A home location is either both coordinates or neither.
fn validate_home(lat: Option<f64>, lon: Option<f64>) -> Result<()> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => validate_coordinates(lat, lon),
        (None, None) => Ok(()),
        _ => Err(Error::InvalidInput(
            "home_lat and home_lon must be set together".to_string(),
        )),
    }
}

/// Trim a free-text field, collapsing blank values to `None`.
fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Deserialize a nullable patch field: absent stays `None` (via
/// `#[serde(default)]`), explicit null becomes `Some(None)`.
fn deserialize_patch<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// =============================================================================
// INCIDENTS & HOTSPOTS
// =============================================================================

/// A single incident report. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub id: Uuid,
    pub source: String,
    pub incident_type: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
}

impl IncidentRecord {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Request for ingesting one incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIncidentRequest {
    pub source: String,
    #[serde(default)]
    pub incident_type: Option<String>,
    #[serde(deserialize_with = "timestamps::deserialize")]
    pub occurred_at: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
}

impl CreateIncidentRequest {
    /// Validate and normalize the request.
    ///
    /// The source is trimmed and must be non-empty; coordinates must be
    /// finite and inside the valid lat/lon ranges.
    pub fn validate(mut self) -> Result<Self> {
        self.source = self.source.trim().to_string();
        if self.source.is_empty() {
            return Err(Error::InvalidInput("source is required".to_string()));
        }
        validate_coordinates(self.lat, self.lon)?;
        self.incident_type = clean_text(self.incident_type);
        Ok(self)
    }
}

/// A scored grid cell produced by one aggregation run.
///
/// `grid_lat`/`grid_lon` are the lower-left corner of the cell and are always
/// the output of grid binning for some incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotCell {
    pub grid_lat: f64,
    pub grid_lon: f64,
    pub recent_count: i64,
    pub baseline_count: i64,
    pub risk_score: i64,
}

/// A hotspot cell as persisted for one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredHotspotCell {
    pub id: Uuid,
    pub source: String,
    pub computed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub cell: HotspotCell,
}

// =============================================================================
// CLIENTS
// =============================================================================

/// An at-risk individual tracked by outreach workers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub display_name: String,
    pub neighborhood: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub follow_up_at: Option<DateTime<Utc>>,
    pub need_housing: bool,
    pub need_food: bool,
    pub need_therapy: bool,
    pub need_job: bool,
    pub need_transport: bool,
    pub home_lat: Option<f64>,
    pub home_lon: Option<f64>,
}

impl Client {
    /// Number of need flags set (0-5).
    pub fn needs_count(&self) -> i64 {
        [
            self.need_housing,
            self.need_food,
            self.need_therapy,
            self.need_job,
            self.need_transport,
        ]
        .iter()
        .filter(|flag| **flag)
        .count() as i64
    }

    /// Home location, defined only when both coordinates are present.
    pub fn home_point(&self) -> Option<GeoPoint> {
        match (self.home_lat, self.home_lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }
}

/// Request for creating a client.
///
/// Every recognized field is listed here; unknown fields in the payload are
/// ignored and missing optional fields take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateClientRequest {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "timestamps::deserialize_option")]
    pub follow_up_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub need_housing: bool,
    #[serde(default)]
    pub need_food: bool,
    #[serde(default)]
    pub need_therapy: bool,
    #[serde(default)]
    pub need_job: bool,
    #[serde(default)]
    pub need_transport: bool,
    #[serde(default)]
    pub home_lat: Option<f64>,
    #[serde(default)]
    pub home_lon: Option<f64>,
}

impl CreateClientRequest {
    /// Trim text fields and check that the display name is present.
    pub fn validate(mut self) -> Result<Self> {
        self.display_name = self.display_name.trim().to_string();
        if self.display_name.is_empty() {
            return Err(Error::InvalidInput("display_name is required".to_string()));
        }
        self.neighborhood = clean_text(self.neighborhood);
        self.notes = clean_text(self.notes);
        validate_home(self.home_lat, self.home_lon)?;
        Ok(self)
    }
}

/// Partial update for a client.
///
/// Absent fields are left untouched. For nullable fields an explicit `null`
/// clears the stored value. A blank display name is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClientRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_patch")]
    pub neighborhood: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_patch")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "timestamps::deserialize_patch")]
    pub follow_up_at: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub need_housing: Option<bool>,
    #[serde(default)]
    pub need_food: Option<bool>,
    #[serde(default)]
    pub need_therapy: Option<bool>,
    #[serde(default)]
    pub need_job: Option<bool>,
    #[serde(default)]
    pub need_transport: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_patch")]
    pub home_lat: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_patch")]
    pub home_lon: Option<Option<f64>>,
}

impl UpdateClientRequest {
    /// Apply the patch to a client in place.
    pub fn apply(self, client: &mut Client) -> Result<()> {
        if let Some(name) = self.display_name {
            let name = name.trim();
            if !name.is_empty() {
                client.display_name = name.to_string();
            }
        }
        if let Some(neighborhood) = self.neighborhood {
            client.neighborhood = clean_text(neighborhood);
        }
        if let Some(notes) = self.notes {
            client.notes = clean_text(notes);
        }
        if let Some(follow_up_at) = self.follow_up_at {
            client.follow_up_at = follow_up_at;
        }

        let flags = [
            (self.need_housing, &mut client.need_housing),
            (self.need_food, &mut client.need_food),
            (self.need_therapy, &mut client.need_therapy),
            (self.need_job, &mut client.need_job),
            (self.need_transport, &mut client.need_transport),
        ];
        for (update, flag) in flags {
            if let Some(value) = update {
                *flag = value;
            }
        }

        if let Some(lat) = self.home_lat {
            client.home_lat = lat;
        }
        if let Some(lon) = self.home_lon {
            client.home_lon = lon;
        }
        validate_home(client.home_lat, client.home_lon)
    }
}

// =============================================================================
// CONTACT LOGS
// =============================================================================

/// Outcome of an outreach contact attempt.
///
/// Intake parses outcomes strictly with [`FromStr`]; anything read back from
/// storage goes through [`ContactOutcome::parse_lenient`] so an unexpected
/// value degrades to `Other` instead of failing a whole ranking run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum ContactOutcome {
    Reached,
    NoAnswer,
    Referral,
    Other,
}

impl ContactOutcome {
    pub const ALL: [ContactOutcome; 4] = [
        ContactOutcome::Reached,
        ContactOutcome::NoAnswer,
        ContactOutcome::Referral,
        ContactOutcome::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactOutcome::Reached => "reached",
            ContactOutcome::NoAnswer => "no_answer",
            ContactOutcome::Referral => "referral",
            ContactOutcome::Other => "other",
        }
    }

    /// Parse an outcome, mapping unknown values to `Other`.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            tracing::warn!(
                subsystem = "core",
                component = "contact_outcome",
                outcome = s,
                "Unknown contact outcome treated as other"
            );
            ContactOutcome::Other
        })
    }
}

impl FromStr for ContactOutcome {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|outcome| outcome.as_str() == s)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "Invalid outcome '{}': expected one of reached, no_answer, referral, other",
                    s
                ))
            })
    }
}

impl From<String> for ContactOutcome {
    fn from(s: String) -> Self {
        Self::parse_lenient(&s)
    }
}

impl fmt::Display for ContactOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged contact attempt. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactLog {
    pub id: Uuid,
    pub client_id: Uuid,
    pub contacted_at: DateTime<Utc>,
    pub outcome: ContactOutcome,
    pub note: Option<String>,
}

/// Request for logging a contact, as received at intake.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateContactRequest {
    #[serde(default)]
    pub outcome: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, deserialize_with = "timestamps::deserialize_option")]
    pub contacted_at: Option<DateTime<Utc>>,
}

/// A validated contact ready to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContactLog {
    pub outcome: ContactOutcome,
    pub note: Option<String>,
    pub contacted_at: DateTime<Utc>,
}

impl CreateContactRequest {
    /// Validate the outcome strictly and default `contacted_at` to `now`.
    pub fn validate(self, now: DateTime<Utc>) -> Result<NewContactLog> {
        Ok(NewContactLog {
            outcome: self.outcome.parse()?,
            note: clean_text(self.note),
            contacted_at: self.contacted_at.unwrap_or(now),
        })
    }
}

// =============================================================================
// TRIAGE QUEUE
// =============================================================================

/// One ranked entry of the triage queue. Computed per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub client_id: Uuid,
    pub display_name: String,
    pub neighborhood: Option<String>,
    pub days_since_last: i64,
    pub misses_30d: i64,
    pub urgency_score: i64,
    pub follow_up_at: Option<DateTime<Utc>>,
    pub needs_count: i64,
}
