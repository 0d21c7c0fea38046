//! Structured logging schema and field name constants for vigil.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query by the same names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (incidents, cells) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across a request.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "signals", "database"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "hotspots", "triage", "proximity", "screening", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "run", "rank", "replace_cells", "top_cells"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Incident source identifier (e.g. "sdpd_demo").
pub const SOURCE: &str = "source";

/// Client UUID being operated on.
pub const CLIENT_ID: &str = "client_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a query or ranking.
pub const RESULT_COUNT: &str = "result_count";

/// Number of incidents consumed by an aggregation run.
pub const INCIDENT_COUNT: &str = "incident_count";

/// Number of hotspot cells produced or replaced.
pub const CELL_COUNT: &str = "cell_count";

/// Number of clients ranked.
pub const CLIENT_COUNT: &str = "client_count";

/// Number of contact logs in a triage snapshot.
pub const CONTACT_COUNT: &str = "contact_count";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
