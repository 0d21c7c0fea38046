//! Synthetic incident data for demos and local testing.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use vigil_core::CreateIncidentRequest;

/// Neighborhood centers incidents cluster around.
pub const DEMO_CENTERS: [(&str, f64, f64); 4] = [
    ("Downtown", 32.7157, -117.1611),
    ("City Heights", 32.7406, -117.0840),
    ("Southeast", 32.7007, -117.0825),
    ("Clairemont", 32.7831, -117.1192),
];

/// Maximum jitter, in degrees, applied to each coordinate.
pub const DEMO_JITTER_DEG: f64 = 0.01;

/// Day offsets incidents are dated at. One day is listed twice so the most
/// recent activity is over-represented.
pub const DEMO_DAY_OFFSETS: [i64; 10] = [1, 1, 2, 3, 5, 7, 10, 14, 21, 28];

pub const DEMO_INCIDENT_TYPE: &str = "demo";

/// Generate `n` demo incidents for `source`, clustered around
/// [`DEMO_CENTERS`] and spread over the last four weeks. Deterministic for a
/// seeded RNG.
pub fn generate_demo_incidents<R: Rng + ?Sized>(
    rng: &mut R,
    source: &str,
    n: usize,
    now: DateTime<Utc>,
) -> Vec<CreateIncidentRequest> {
    (0..n)
        .map(|_| {
            let (_, lat, lon) = *DEMO_CENTERS.choose(rng).unwrap_or(&DEMO_CENTERS[0]);
            let days = *DEMO_DAY_OFFSETS.choose(rng).unwrap_or(&1);
            let hours = rng.gen_range(0..=23);
            CreateIncidentRequest {
                source: source.to_string(),
                incident_type: Some(DEMO_INCIDENT_TYPE.to_string()),
                occurred_at: now - Duration::days(days) - Duration::hours(hours),
                lat: lat + rng.gen_range(-DEMO_JITTER_DEG..=DEMO_JITTER_DEG),
                lon: lon + rng.gen_range(-DEMO_JITTER_DEG..=DEMO_JITTER_DEG),
            }
        })
        .collect()
}
