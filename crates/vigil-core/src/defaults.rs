//! Centralized default constants for vigil.
//!
//! **This module is the single source of truth** for shared default values.
//! Engines, storage and the HTTP server reference these constants instead of
//! defining their own magic numbers.

// =============================================================================
// HOTSPOT GRID
// =============================================================================

/// Grid cell edge length in degrees (≈ 500 m at mid latitudes).
pub const GRID_CELL_SIZE_DEG: f64 = 0.005;

/// Trailing window, in days, counted as recent incident activity.
pub const RECENT_WINDOW_DAYS: i64 = 7;

/// Trailing window, in days, whose older part (beyond the recent window)
/// forms the baseline.
pub const BASELINE_WINDOW_DAYS: i64 = 35;

/// Weight applied to recent incidents by the weighted-sum risk policy.
pub const RISK_RECENT_WEIGHT: i64 = 2;

/// Divisor applied to baseline incidents by the discounted-difference policy.
pub const RISK_BASELINE_DISCOUNT: i64 = 4;

/// Default number of cells returned by the top-cells query.
pub const HOTSPOT_TOP_LIMIT: i64 = 50;

/// Upper bound accepted for the top-cells limit.
pub const HOTSPOT_TOP_LIMIT_MAX: i64 = 500;

/// Default incident source name.
pub const DEFAULT_SOURCE: &str = "sdpd_demo";

// =============================================================================
// TRIAGE
// =============================================================================

/// `days_since_last` reported for clients that were never contacted.
pub const NEVER_CONTACTED_DAYS: i64 = 9999;

/// Trailing window, in days, for counting missed contacts.
pub const MISSED_CONTACT_WINDOW_DAYS: i64 = 30;

/// Urgency points per missed contact inside the window.
pub const MISSED_CONTACT_WEIGHT: i64 = 5;

/// Cap on the days-since-last-contact contribution to urgency.
pub const DAYS_SINCE_CAP: i64 = 60;

/// Base urgency for an overdue follow-up.
pub const FOLLOW_UP_OVERDUE_BASE: i64 = 50;

/// Cap on extra overdue days added to the overdue base.
pub const FOLLOW_UP_OVERDUE_CAP_DAYS: i64 = 30;

/// Follow-ups due within this many days get [`FOLLOW_UP_SOON_URGENCY`].
pub const FOLLOW_UP_SOON_DAYS: i64 = 2;

/// Urgency for a follow-up due within [`FOLLOW_UP_SOON_DAYS`].
pub const FOLLOW_UP_SOON_URGENCY: i64 = 15;

/// Follow-ups due within this many days get [`FOLLOW_UP_UPCOMING_URGENCY`].
pub const FOLLOW_UP_UPCOMING_DAYS: i64 = 7;

/// Urgency for a follow-up due within [`FOLLOW_UP_UPCOMING_DAYS`].
pub const FOLLOW_UP_UPCOMING_URGENCY: i64 = 8;

// =============================================================================
// SCREENING
// =============================================================================

/// Free-text keywords that escalate a screening.
pub const SCREENING_KEYWORDS: &[&str] = &["weapon", "kill", "gun", "danger", "suicidal", "harm"];

// =============================================================================
// DEMO DATA
// =============================================================================

/// Default number of demo incidents generated by a seed request.
pub const DEMO_INCIDENT_COUNT: usize = 120;

/// Upper bound accepted for a single seed request.
pub const DEMO_INCIDENT_MAX: usize = 5000;

/// Maximum incidents per bulk insert request.
pub const INCIDENT_BATCH_MAX: usize = 10_000;

// =============================================================================
// DATABASE
// =============================================================================

/// Default maximum connections in the PostgreSQL pool.
pub const DB_MAX_CONNECTIONS: u32 = 10;

/// Default wait, in seconds, for a free pool connection.
pub const DB_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// `application_name` reported to PostgreSQL (visible in `pg_stat_activity`).
pub const DB_APPLICATION_NAME: &str = "vigil";

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default per-request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;
