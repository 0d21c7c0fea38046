//! Engine configuration.
//!
//! Configuration can be loaded from:
//! - A TOML file named by `VIGIL_CONFIG`
//! - Environment variables (`VIGIL_*` prefixed), applied on top of the file
//!
//! ```toml
//! grid_cell_size = 0.005
//! recent_window_days = 7
//! baseline_window_days = 35
//! screening_keywords = ["weapon", "gun", "suicidal"]
//!
//! [risk_policy]
//! kind = "weighted_sum"
//! recent_weight = 2
//! ```

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vigil_core::defaults;
use vigil_core::{Error, Result};

use crate::triage::TriagePolicy;

/// Environment variable naming the TOML configuration file.
pub const CONFIG_PATH_ENV: &str = "VIGIL_CONFIG";

/// How a cell's recent and baseline counts combine into a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RiskPolicy {
    /// `recent * recent_weight + baseline`. Non-decreasing in both counts.
    WeightedSum { recent_weight: i64 },
    /// `recent - baseline / discount` (integer division). Non-decreasing in
    /// recent, non-increasing in baseline; a quiet cell with a busy history
    /// can score below zero.
    DiscountedDifference { discount: i64 },
}

impl Default for RiskPolicy {
    fn default() -> Self {
        RiskPolicy::WeightedSum {
            recent_weight: defaults::RISK_RECENT_WEIGHT,
        }
    }
}

impl RiskPolicy {
    /// Saturates at the `i64` bounds instead of overflowing.
    pub fn score(&self, recent_count: i64, baseline_count: i64) -> i64 {
        match *self {
            RiskPolicy::WeightedSum { recent_weight } => recent_count
                .saturating_mul(recent_weight)
                .saturating_add(baseline_count),
            RiskPolicy::DiscountedDifference { discount } => {
                recent_count.saturating_sub(baseline_count / discount)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RiskPolicy::WeightedSum { .. } => "weighted_sum",
            RiskPolicy::DiscountedDifference { .. } => "discounted_difference",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            RiskPolicy::WeightedSum { recent_weight } if recent_weight < 1 => Err(Error::Config(format!(
                "risk_policy.recent_weight must be >= 1, got {}",
                recent_weight
            ))),
            RiskPolicy::DiscountedDifference { discount } if discount < 1 => Err(Error::Config(format!(
                "risk_policy.discount must be >= 1, got {}",
                discount
            ))),
            _ => Ok(()),
        }
    }
}

/// Tunables for the hotspot, triage and screening engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Grid cell edge length in degrees.
    pub grid_cell_size: f64,
    /// Incidents at most this many days old count as recent.
    pub recent_window_days: i64,
    /// Incidents older than the recent window and at most this many days old
    /// count as baseline.
    pub baseline_window_days: i64,
    pub risk_policy: RiskPolicy,
    pub triage: TriagePolicy,
    /// Case-insensitive substrings that escalate a screening.
    pub screening_keywords: Vec<String>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            grid_cell_size: defaults::GRID_CELL_SIZE_DEG,
            recent_window_days: defaults::RECENT_WINDOW_DAYS,
            baseline_window_days: defaults::BASELINE_WINDOW_DAYS,
            risk_policy: RiskPolicy::default(),
            triage: TriagePolicy::default(),
            screening_keywords: defaults::SCREENING_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

impl SignalConfig {
    /// Load from the file named by `VIGIL_CONFIG` (or defaults when unset),
    /// apply `VIGIL_*` environment overrides, then validate.
    pub fn load() -> Result<Self> {
        let mut config = match env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                info!(path = %path, "Loading signal config");
                Self::from_file(Path::new(path.trim()))?
            }
            _ => {
                debug!("{} not set, using default signal config", CONFIG_PATH_ENV);
                Self::default()
            }
        };
        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;

        info!(
            grid_cell_size = config.grid_cell_size,
            recent_window_days = config.recent_window_days,
            baseline_window_days = config.baseline_window_days,
            risk_policy = config.risk_policy.name(),
            screening_keywords = config.screening_keywords.len(),
            "Signal config loaded"
        );
        Ok(config)
    }

    /// Load configuration from a TOML file. Missing keys take defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from a key lookup (the process environment in
    /// production). Unparseable values are ignored with a warning.
    ///
    /// Recognized keys: `VIGIL_GRID_CELL_SIZE`, `VIGIL_RECENT_WINDOW_DAYS`,
    /// `VIGIL_BASELINE_WINDOW_DAYS`, `VIGIL_RISK_POLICY`
    /// (`weighted_sum` | `discounted_difference`), `VIGIL_RISK_WEIGHT`,
    /// `VIGIL_RISK_DISCOUNT`, `VIGIL_SCREENING_KEYWORDS` (comma separated).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(key: &str, raw: Option<String>) -> Option<T> {
            let raw = raw?;
            match raw.trim().parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(key, value = %raw, "Ignoring unparseable config override");
                    None
                }
            }
        }

        if let Some(size) = parsed("VIGIL_GRID_CELL_SIZE", lookup("VIGIL_GRID_CELL_SIZE")) {
            self.grid_cell_size = size;
        }
        if let Some(days) = parsed("VIGIL_RECENT_WINDOW_DAYS", lookup("VIGIL_RECENT_WINDOW_DAYS")) {
            self.recent_window_days = days;
        }
        if let Some(days) = parsed("VIGIL_BASELINE_WINDOW_DAYS", lookup("VIGIL_BASELINE_WINDOW_DAYS")) {
            self.baseline_window_days = days;
        }

        let weight: Option<i64> = parsed("VIGIL_RISK_WEIGHT", lookup("VIGIL_RISK_WEIGHT"));
        let discount: Option<i64> = parsed("VIGIL_RISK_DISCOUNT", lookup("VIGIL_RISK_DISCOUNT"));
        let kind = lookup("VIGIL_RISK_POLICY").map(|k| k.trim().to_lowercase());
        let kind = kind.as_deref().unwrap_or(self.risk_policy.name());
        self.risk_policy = match (kind, self.risk_policy) {
            ("weighted_sum", RiskPolicy::WeightedSum { recent_weight }) => RiskPolicy::WeightedSum {
                recent_weight: weight.unwrap_or(recent_weight),
            },
            ("weighted_sum", _) => RiskPolicy::WeightedSum {
                recent_weight: weight.unwrap_or(defaults::RISK_RECENT_WEIGHT),
            },
            ("discounted_difference", RiskPolicy::DiscountedDifference { discount: current }) => {
                RiskPolicy::DiscountedDifference {
                    discount: discount.unwrap_or(current),
                }
            }
            ("discounted_difference", _) => RiskPolicy::DiscountedDifference {
                discount: discount.unwrap_or(defaults::RISK_BASELINE_DISCOUNT),
            },
            (other, current) => {
                warn!(value = other, "Ignoring unknown VIGIL_RISK_POLICY");
                current
            }
        };

        if let Some(raw) = lookup("VIGIL_SCREENING_KEYWORDS") {
            self.screening_keywords = raw
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.grid_cell_size.is_finite() || self.grid_cell_size <= 0.0 {
            return Err(Error::Config(format!(
                "grid_cell_size must be a positive number, got {}",
                self.grid_cell_size
            )));
        }
        if self.recent_window_days < 1 {
            return Err(Error::Config(format!(
                "recent_window_days must be >= 1, got {}",
                self.recent_window_days
            )));
        }
        if self.baseline_window_days <= self.recent_window_days {
            return Err(Error::Config(format!(
                "baseline_window_days ({}) must exceed recent_window_days ({})",
                self.baseline_window_days, self.recent_window_days
            )));
        }
        self.risk_policy.validate()?;
        self.triage.validate()?;
        if self.screening_keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(Error::Config(
                "screening_keywords must contain at least one keyword".to_string(),
            ));
        }
        Ok(())
    }
}
