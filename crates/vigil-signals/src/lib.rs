//! # vigil-signals
//!
//! Priority signal engines for vigil.
//!
//! This crate provides:
//! - Grid binning of incident locations
//! - Hotspot aggregation with recent/baseline windows and pluggable risk policies
//! - Nearest-hotspot lookup for client home locations
//! - Triage ranking of clients by contact urgency
//! - Keyword screening of intake notes
//! - Demo incident generation
//!
//! The engines are pure and synchronous. [`refresh_hotspots`] is the one
//! async entry point; it drives the aggregator through the repository traits
//! in `vigil-core`.
//!
//! ## Example
//!
//! ```ignore
//! use vigil_signals::{HotspotAggregator, SignalConfig, TriageScorer};
//!
//! let config = SignalConfig::load()?;
//! let aggregator = HotspotAggregator::new(&config);
//! let outcome = refresh_hotspots(&db.incidents, &db.hotspots, &aggregator, "sdpd_demo", Utc::now()).await?;
//!
//! let scorer = TriageScorer::new(config.triage.clone());
//! let queue = scorer.rank(&clients, &contacts, Utc::now());
//! ```

pub mod config;
pub mod demo;
pub mod grid;
pub mod hotspots;
pub mod proximity;
pub mod refresh;
pub mod screening;
pub mod triage;

pub use config::{RiskPolicy, SignalConfig, CONFIG_PATH_ENV};
pub use demo::generate_demo_incidents;
pub use grid::{bin, CellKey, GridBinner};
pub use hotspots::{day_start, HotspotAggregator, HotspotRun};
pub use proximity::{nearest, GridLocated};
pub use refresh::{refresh_hotspots, RefreshOutcome, RefreshStatus};
pub use screening::{ScreeningOutcome, ScreeningRules};
pub use triage::{ClientMetrics, TriagePolicy, TriageScorer};
