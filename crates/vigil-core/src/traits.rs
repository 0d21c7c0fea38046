//! Repository traits implemented by the storage collaborator.
//!
//! The engines in `vigil-signals` are pure; these traits are the seam through
//! which raw records come in and derived records go out.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// HOTSPOTS
// =============================================================================

/// Incident storage. Incidents are immutable once inserted.
#[async_trait]
pub trait IncidentRepository: Send + Sync {
    /// Insert incidents in a single transaction.
    async fn insert_bulk(&self, incidents: Vec<CreateIncidentRequest>) -> Result<Vec<Uuid>>;

    /// All incidents recorded for a source.
    async fn list_incidents(&self, source: &str) -> Result<Vec<IncidentRecord>>;

    /// Number of incidents recorded for a source.
    async fn count(&self, source: &str) -> Result<i64>;
}

/// Hotspot cell storage, owned per source.
#[async_trait]
pub trait HotspotRepository: Send + Sync {
    /// Atomically replace every stored cell for `source` with `cells`.
    ///
    /// Readers observe either the previous set or the new one, never a mix.
    /// Concurrent replaces for the same source are serialized. Returns the
    /// number of cells written.
    async fn replace_cells(
        &self,
        source: &str,
        cells: &[HotspotCell],
        computed_at: DateTime<Utc>,
    ) -> Result<usize>;

    /// Highest-risk cells for a source, descending by risk score.
    async fn top_cells(&self, source: &str, limit: i64) -> Result<Vec<StoredHotspotCell>>;

    /// Every stored cell for a source, in no particular order.
    async fn list_cells(&self, source: &str) -> Result<Vec<StoredHotspotCell>>;
}

// =============================================================================
// TRIAGE
// =============================================================================

/// Client storage. Deleting a client deletes its contact logs.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn create(&self, req: CreateClientRequest) -> Result<Client>;

    async fn get(&self, id: Uuid) -> Result<Option<Client>>;

    async fn list_clients(&self) -> Result<Vec<Client>>;

    /// Apply a partial update and return the updated client.
    async fn update(&self, id: Uuid, req: UpdateClientRequest) -> Result<Client>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Append-only contact log storage.
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Append a contact log for an existing client.
    async fn log_contact(&self, client_id: Uuid, contact: NewContactLog) -> Result<ContactLog>;

    /// Contact logs for one client, newest first.
    async fn list_for_client(&self, client_id: Uuid) -> Result<Vec<ContactLog>>;

    async fn list_contacts(&self) -> Result<Vec<ContactLog>>;
}

/// A consistent read of everything the triage scorer needs.
#[derive(Debug, Clone, Default)]
pub struct TriageSnapshot {
    pub clients: Vec<Client>,
    pub contacts: Vec<ContactLog>,
}

/// Source of consistent triage snapshots.
#[async_trait]
pub trait TriageSnapshotSource: Send + Sync {
    /// Read clients and contacts from one snapshot so no contact insert is
    /// half-visible to a ranking run.
    async fn triage_snapshot(&self) -> Result<TriageSnapshot>;
}
