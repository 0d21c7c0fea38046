//! Keyword screening of free-text intake notes.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const ESCALATION_REASON: &str = "High-risk keywords detected";
pub const ESCALATED_NEXT_STEPS: &str = "Immediate outreach recommended";
pub const ROUTINE_NEXT_STEPS: &str = "Routine follow-up";

/// Result of screening one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningOutcome {
    pub is_escalated: bool,
    pub escalation_reason: Option<String>,
    pub next_steps: String,
    /// Keywords found in the notes, in keyword-table order.
    pub matched_keywords: Vec<String>,
}

/// Case-insensitive substring matcher over a keyword table.
#[derive(Debug, Clone)]
pub struct ScreeningRules {
    keywords: Vec<String>,
}

impl ScreeningRules {
    /// Keywords are lowercased; blank entries are dropped.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn assess(&self, notes: Option<&str>) -> ScreeningOutcome {
        let notes = notes.unwrap_or_default().to_lowercase();
        let matched_keywords: Vec<String> = self
            .keywords
            .iter()
            .filter(|k| notes.contains(k.as_str()))
            .cloned()
            .collect();
        let is_escalated = !matched_keywords.is_empty();

        if is_escalated {
            info!(
                subsystem = "signals",
                component = "screening",
                matched = matched_keywords.len(),
                "Screening escalated"
            );
        } else {
            debug!(subsystem = "signals", component = "screening", "Screening routine");
        }

        ScreeningOutcome {
            is_escalated,
            escalation_reason: is_escalated.then(|| ESCALATION_REASON.to_string()),
            next_steps: if is_escalated {
                ESCALATED_NEXT_STEPS
            } else {
                ROUTINE_NEXT_STEPS
            }
            .to_string(),
            matched_keywords,
        }
    }
}

impl Default for ScreeningRules {
    fn default() -> Self {
        Self::new(vigil_core::defaults::SCREENING_KEYWORDS)
    }
}
