//! Triage prioritization: ranks clients by contact urgency.
//!
//! Urgency has two parts:
//!
//! - base urgency: `misses_30d * missed_contact_weight + min(days_since_last, days_since_cap)`
//! - follow-up urgency: overdue follow-ups score `overdue_base + min(days_overdue, overdue_cap_days)`,
//!   upcoming ones score a flat bump depending on how soon they are due.
//!
//! Day counts are whole days, floored, so a contact 36 hours ago is one day
//! old and a follow-up due in 12 hours is one day ahead.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;
use vigil_core::defaults;
use vigil_core::{Client, ContactLog, ContactOutcome, Error, QueueItem, Result};

const SECONDS_PER_DAY: i64 = 86_400;

/// Weights and thresholds used by [`TriageScorer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriagePolicy {
    /// `days_since_last` for clients with no contact history.
    pub never_contacted_days: i64,
    pub missed_contact_window_days: i64,
    pub missed_contact_weight: i64,
    pub days_since_cap: i64,
    pub overdue_base: i64,
    pub overdue_cap_days: i64,
    pub soon_days: i64,
    pub soon_urgency: i64,
    pub upcoming_days: i64,
    pub upcoming_urgency: i64,
}

impl Default for TriagePolicy {
    fn default() -> Self {
        Self {
            never_contacted_days: defaults::NEVER_CONTACTED_DAYS,
            missed_contact_window_days: defaults::MISSED_CONTACT_WINDOW_DAYS,
            missed_contact_weight: defaults::MISSED_CONTACT_WEIGHT,
            days_since_cap: defaults::DAYS_SINCE_CAP,
            overdue_base: defaults::FOLLOW_UP_OVERDUE_BASE,
            overdue_cap_days: defaults::FOLLOW_UP_OVERDUE_CAP_DAYS,
            soon_days: defaults::FOLLOW_UP_SOON_DAYS,
            soon_urgency: defaults::FOLLOW_UP_SOON_URGENCY,
            upcoming_days: defaults::FOLLOW_UP_UPCOMING_DAYS,
            upcoming_urgency: defaults::FOLLOW_UP_UPCOMING_URGENCY,
        }
    }
}

impl TriagePolicy {
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("missed_contact_window_days", self.missed_contact_window_days),
            ("missed_contact_weight", self.missed_contact_weight),
            ("days_since_cap", self.days_since_cap),
            ("overdue_base", self.overdue_base),
            ("overdue_cap_days", self.overdue_cap_days),
            ("soon_days", self.soon_days),
            ("soon_urgency", self.soon_urgency),
            ("upcoming_urgency", self.upcoming_urgency),
        ];
        for (name, value) in non_negative {
            if value < 0 {
                return Err(Error::Config(format!("triage.{} must be >= 0, got {}", name, value)));
            }
        }
        if self.upcoming_days < self.soon_days {
            return Err(Error::Config(format!(
                "triage.upcoming_days ({}) must be >= triage.soon_days ({})",
                self.upcoming_days, self.soon_days
            )));
        }
        Ok(())
    }
}

/// Per-client contact metrics, before urgency is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientMetrics {
    pub last_contact_at: Option<DateTime<Utc>>,
    pub misses_in_window: i64,
}

/// Whole days elapsed from `earlier` to `later`, floored.
fn floor_days(later: DateTime<Utc>, earlier: DateTime<Utc>) -> i64 {
    (later - earlier).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Stateless client ranker.
#[derive(Debug, Clone, Default)]
pub struct TriageScorer {
    policy: TriagePolicy,
}

impl TriageScorer {
    pub fn new(policy: TriagePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TriagePolicy {
        &self.policy
    }

    /// Score every client and sort by urgency, highest first. Clients with
    /// equal urgency keep their input order. Contacts for unknown clients are
    /// ignored.
    pub fn rank(&self, clients: &[Client], contacts: &[ContactLog], now: DateTime<Utc>) -> Vec<QueueItem> {
        let miss_cutoff = now - Duration::days(self.policy.missed_contact_window_days);
        debug!(
            subsystem = "signals",
            component = "triage",
            client_count = clients.len(),
            contact_count = contacts.len(),
            %miss_cutoff,
            "Ranking clients"
        );

        let mut metrics: HashMap<Uuid, ClientMetrics> = clients
            .iter()
            .map(|c| (c.id, ClientMetrics::default()))
            .collect();

        for contact in contacts {
            let Some(m) = metrics.get_mut(&contact.client_id) else {
                continue;
            };
            if m.last_contact_at.map_or(true, |last| contact.contacted_at > last) {
                m.last_contact_at = Some(contact.contacted_at);
            }
            if contact.outcome == ContactOutcome::NoAnswer && contact.contacted_at >= miss_cutoff {
                m.misses_in_window += 1;
            }
        }

        let mut items: Vec<QueueItem> = clients
            .iter()
            .map(|client| {
                let m = metrics.get(&client.id).copied().unwrap_or_default();
                self.score_client(client, m, now)
            })
            .collect();

        // sort_by is stable, so ties keep input order.
        items.sort_by(|a, b| b.urgency_score.cmp(&a.urgency_score));

        info!(
            subsystem = "signals",
            component = "triage",
            result_count = items.len(),
            "Triage queue ranked"
        );
        items
    }

    /// Build the queue item for one client from its metrics.
    pub fn score_client(&self, client: &Client, metrics: ClientMetrics, now: DateTime<Utc>) -> QueueItem {
        let days_since_last = match metrics.last_contact_at {
            Some(last) => floor_days(now, last).max(0),
            None => self.policy.never_contacted_days,
        };
        let base = metrics.misses_in_window * self.policy.missed_contact_weight
            + days_since_last.min(self.policy.days_since_cap);
        let urgency_score = base + self.follow_up_urgency(client.follow_up_at, now);

        QueueItem {
            client_id: client.id,
            display_name: client.display_name.clone(),
            neighborhood: client.neighborhood.clone(),
            days_since_last,
            misses_30d: metrics.misses_in_window,
            urgency_score,
            follow_up_at: client.follow_up_at,
            needs_count: client.needs_count(),
        }
    }

    /// Urgency contributed by a scheduled follow-up.
    pub fn follow_up_urgency(&self, follow_up_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
        let Some(due) = follow_up_at else {
            return 0;
        };
        let diff = floor_days(now, due);
        if diff >= 0 {
            return self.policy.overdue_base + diff.min(self.policy.overdue_cap_days);
        }
        let ahead = -diff;
        if ahead <= self.policy.soon_days {
            self.policy.soon_urgency
        } else if ahead <= self.policy.upcoming_days {
            self.policy.upcoming_urgency
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn client(name: &str) -> Client {
        Client {
            id: Uuid::new_v4(),
            display_name: name.to_string(),
            neighborhood: None,
            notes: None,
            created_at: now() - Duration::days(100),
            follow_up_at: None,
            need_housing: false,
            need_food: false,
            need_therapy: false,
            need_job: false,
            need_transport: false,
            home_lat: None,
            home_lon: None,
        }
    }

    fn contact(client: &Client, outcome: ContactOutcome, age: Duration) -> ContactLog {
        ContactLog {
            id: Uuid::new_v4(),
            client_id: client.id,
            contacted_at: now() - age,
            outcome,
            note: None,
        }
    }

    #[test]
    fn test_never_contacted() {
        let scorer = TriageScorer::default();
        let c = client("Alex");
        let items = scorer.rank(&[c], &[], now());
        assert_eq!(items[0].days_since_last, 9999);
        assert_eq!(items[0].misses_30d, 0);
        assert_eq!(items[0].urgency_score, 60);
    }

    #[test]
    fn test_missed_contacts_scenario() {
        let scorer = TriageScorer::default();
        let c = client("Sam");
        let contacts = vec![
            contact(&c, ContactOutcome::NoAnswer, Duration::days(10)),
            contact(&c, ContactOutcome::NoAnswer, Duration::days(15)),
            contact(&c, ContactOutcome::NoAnswer, Duration::days(25)),
        ];
        let items = scorer.rank(&[c], &contacts, now());
        assert_eq!(items[0].days_since_last, 10);
        assert_eq!(items[0].misses_30d, 3);
        assert_eq!(items[0].urgency_score, 25);
    }

    #[test]
    fn test_misses_outside_window_not_counted() {
        let scorer = TriageScorer::default();
        let c = client("Sam");
        let contacts = vec![
            contact(&c, ContactOutcome::NoAnswer, Duration::days(31)),
            contact(&c, ContactOutcome::Reached, Duration::days(2)),
            contact(&c, ContactOutcome::Other, Duration::days(3)),
        ];
        let items = scorer.rank(&[c], &contacts, now());
        assert_eq!(items[0].misses_30d, 0);
        assert_eq!(items[0].days_since_last, 2);
    }

    #[test]
    fn test_days_since_floors_and_clamps() {
        let scorer = TriageScorer::default();
        let c = client("Sam");
        let partial = vec![contact(&c, ContactOutcome::Reached, Duration::hours(36))];
        assert_eq!(scorer.rank(&[c.clone()], &partial, now())[0].days_since_last, 1);

        let future = vec![contact(&c, ContactOutcome::Reached, -Duration::hours(5))];
        assert_eq!(scorer.rank(&[c], &future, now())[0].days_since_last, 0);
    }

    #[test]
    fn test_follow_up_overdue_five_days() {
        let scorer = TriageScorer::default();
        assert_eq!(scorer.follow_up_urgency(Some(now() - Duration::days(5)), now()), 55);
    }

    #[test]
    fn test_follow_up_bands() {
        let scorer = TriageScorer::default();
        let at = |d: Duration| scorer.follow_up_urgency(Some(now() + d), now());
        assert_eq!(scorer.follow_up_urgency(None, now()), 0);
        assert_eq!(at(Duration::zero()), 50);
        assert_eq!(at(-Duration::days(45)), 80);
        assert_eq!(at(Duration::hours(12)), 15);
        assert_eq!(at(Duration::days(2)), 15);
        assert_eq!(at(Duration::days(3)), 8);
        assert_eq!(at(Duration::days(7)), 8);
        assert_eq!(at(Duration::days(8)), 0);
    }

    #[test]
    fn test_rank_sorted_desc_stable_ties() {
        let scorer = TriageScorer::default();
        let mut overdue = client("Overdue");
        overdue.follow_up_at = Some(now() - Duration::days(1));
        let first = client("First");
        let second = client("Second");
        let contacts = vec![
            contact(&first, ContactOutcome::Reached, Duration::days(4)),
            contact(&second, ContactOutcome::Reached, Duration::days(4)),
            contact(&overdue, ContactOutcome::Reached, Duration::days(1)),
        ];
        let items = scorer.rank(&[first, second, overdue], &contacts, now());
        let names: Vec<&str> = items.iter().map(|i| i.display_name.as_str()).collect();
        assert_eq!(names, vec!["Overdue", "First", "Second"]);
    }

    #[test]
    fn test_unknown_client_contacts_ignored() {
        let scorer = TriageScorer::default();
        let known = client("Known");
        let stranger = client("Stranger");
        let contacts = vec![contact(&stranger, ContactOutcome::NoAnswer, Duration::days(1))];
        let items = scorer.rank(&[known], &contacts, now());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].misses_30d, 0);
    }

    #[test]
    fn test_unrecognized_stored_outcome_ranks_as_other() {
        let scorer = TriageScorer::default();
        let c = client("Robin");
        let stored: ContactLog = serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "client_id": c.id,
            "contacted_at": now() - Duration::days(3),
            "outcome": "left_message",
            "note": null
        }))
        .unwrap();
        assert_eq!(stored.outcome, ContactOutcome::Other);

        let contacts = vec![
            contact(&c, ContactOutcome::NoAnswer, Duration::days(10)),
            stored,
        ];
        let items = scorer.rank(&[c], &contacts, now());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].days_since_last, 3);
        assert_eq!(items[0].misses_30d, 1);
        assert_eq!(items[0].urgency_score, 8);
    }

    #[test]
    fn test_needs_count_reported_not_scored() {
        let scorer = TriageScorer::default();
        let mut needy = client("Needy");
        needy.need_food = true;
        needy.need_housing = true;
        let plain = client("Plain");
        let items = scorer.rank(&[needy, plain], &[], now());
        assert_eq!(items[0].needs_count, 2);
        assert_eq!(items[0].urgency_score, items[1].urgency_score);
    }

    #[test]
    fn test_policy_validation() {
        assert!(TriagePolicy::default().validate().is_ok());
        let bad = TriagePolicy {
            missed_contact_weight: -1,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let inverted = TriagePolicy {
            soon_days: 9,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }
}
