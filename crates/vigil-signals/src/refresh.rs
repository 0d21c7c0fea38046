//! Hotspot refresh: read a source's incidents, aggregate, replace stored cells.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use vigil_core::{HotspotRepository, IncidentRepository, Result};

use crate::hotspots::{HotspotAggregator, HotspotRun};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStatus {
    NoIncidents,
    Computed,
}

/// Summary of one refresh, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshOutcome {
    pub status: RefreshStatus,
    /// Number of cells now stored for the source. Zero for `NoIncidents`,
    /// in which case whatever was stored before is left in place.
    pub cells: usize,
}

/// Recompute hotspot cells for `source`.
///
/// A source with no incidents at all is a no-op: the stored cell set is not
/// touched. Otherwise the stored set is replaced atomically with the new run.
#[instrument(skip(incidents, hotspots, aggregator), fields(subsystem = "signals", component = "refresh"))]
pub async fn refresh_hotspots<I, H>(
    incidents: &I,
    hotspots: &H,
    aggregator: &HotspotAggregator,
    source: &str,
    now: DateTime<Utc>,
) -> Result<RefreshOutcome>
where
    I: IncidentRepository + ?Sized,
    H: HotspotRepository + ?Sized,
{
    let start = Instant::now();
    let records = incidents.list_incidents(source).await?;

    let outcome = match aggregator.run(&records, now) {
        HotspotRun::NoIncidents => RefreshOutcome {
            status: RefreshStatus::NoIncidents,
            cells: 0,
        },
        HotspotRun::Computed(cells) => {
            let written = hotspots.replace_cells(source, &cells, now).await?;
            RefreshOutcome {
                status: RefreshStatus::Computed,
                cells: written,
            }
        }
    };

    info!(
        source,
        status = ?outcome.status,
        incident_count = records.len(),
        cell_count = outcome.cells,
        duration_ms = start.elapsed().as_millis() as u64,
        "Hotspot refresh complete"
    );
    Ok(outcome)
}
