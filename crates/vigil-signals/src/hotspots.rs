//! Hotspot aggregation: incidents to scored grid cells.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use tracing::{debug, info, trace, warn};
use vigil_core::{HotspotCell, IncidentRecord};

use crate::config::{RiskPolicy, SignalConfig};
use crate::grid::{CellKey, GridBinner};

/// Result of one aggregation run.
#[derive(Debug, Clone, PartialEq)]
pub enum HotspotRun {
    /// The input held no incidents at all. Callers must leave any stored
    /// cells alone.
    NoIncidents,
    /// Scored cells, highest risk first. May be empty when every incident
    /// fell outside both windows.
    Computed(Vec<HotspotCell>),
}

impl HotspotRun {
    pub fn cells(&self) -> &[HotspotCell] {
        match self {
            HotspotRun::NoIncidents => &[],
            HotspotRun::Computed(cells) => cells,
        }
    }
}

/// Midnight UTC of the day containing `now`.
pub fn day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::default()))
}

#[derive(Debug, Default, Clone, Copy)]
struct WindowCounts {
    recent: i64,
    baseline: i64,
}

/// Bins incidents, counts them in the recent and baseline windows, and
/// scores each cell with the configured [`RiskPolicy`].
///
/// Windows are measured in whole UTC days back from the start of `now`'s
/// day, so every run on the same calendar day classifies incidents the same
/// way. They are disjoint: an incident on or after the day
/// `recent_window_days` back (including future-dated ones) is recent; one
/// before that but on or after the day `baseline_window_days` back is
/// baseline; anything older is ignored.
#[derive(Debug, Clone)]
pub struct HotspotAggregator {
    grid: GridBinner,
    recent_window: Duration,
    baseline_window: Duration,
    policy: RiskPolicy,
}

impl Default for HotspotAggregator {
    fn default() -> Self {
        Self::new(&SignalConfig::default())
    }
}

impl HotspotAggregator {
    pub fn new(config: &SignalConfig) -> Self {
        Self {
            grid: GridBinner::new(config.grid_cell_size),
            recent_window: Duration::days(config.recent_window_days),
            baseline_window: Duration::days(config.baseline_window_days),
            policy: config.risk_policy,
        }
    }

    pub fn grid(&self) -> &GridBinner {
        &self.grid
    }

    pub fn run(&self, incidents: &[IncidentRecord], now: DateTime<Utc>) -> HotspotRun {
        if incidents.is_empty() {
            debug!(
                subsystem = "signals",
                component = "hotspots",
                "No incidents, skipping aggregation"
            );
            return HotspotRun::NoIncidents;
        }

        let today = day_start(now);
        let recent_cutoff = today - self.recent_window;
        let baseline_cutoff = today - self.baseline_window;
        debug!(
            subsystem = "signals",
            component = "hotspots",
            %recent_cutoff,
            %baseline_cutoff,
            policy = self.policy.name(),
            incident_count = incidents.len(),
            "Aggregating incidents"
        );

        let mut counts: BTreeMap<CellKey, WindowCounts> = BTreeMap::new();
        let mut excluded = 0usize;
        for incident in incidents {
            let key = self.grid.key(incident.lat, incident.lon);
            if incident.occurred_at >= recent_cutoff {
                counts.entry(key).or_default().recent += 1;
            } else if incident.occurred_at >= baseline_cutoff {
                counts.entry(key).or_default().baseline += 1;
            } else {
                excluded += 1;
                trace!(incident_id = %incident.id, "Incident outside both windows");
            }
        }

        let mut scored: Vec<(CellKey, HotspotCell)> = counts
            .into_iter()
            .map(|(key, c)| {
                let (grid_lat, grid_lon) = self.grid.origin(key);
                let cell = HotspotCell {
                    grid_lat,
                    grid_lon,
                    recent_count: c.recent,
                    baseline_count: c.baseline,
                    risk_score: self.policy.score(c.recent, c.baseline),
                };
                (key, cell)
            })
            .collect();

        // Risk descending, then the cell key; exact integer keys make the
        // order total and stable across runs.
        scored.sort_by(|(ka, a), (kb, b)| b.risk_score.cmp(&a.risk_score).then(ka.cmp(kb)));
        let cells: Vec<HotspotCell> = scored.into_iter().map(|(_, cell)| cell).collect();

        if cells.is_empty() {
            warn!(
                subsystem = "signals",
                component = "hotspots",
                incident_count = incidents.len(),
                "Every incident fell outside the baseline window"
            );
        }
        info!(
            subsystem = "signals",
            component = "hotspots",
            incident_count = incidents.len(),
            excluded_count = excluded,
            cell_count = cells.len(),
            "Hotspot aggregation complete"
        );
        HotspotRun::Computed(cells)
    }
}
