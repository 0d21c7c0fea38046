/// Intake payload parsing as seen by HTTP clients.
///
/// The mobile client sends naive timestamps and sometimes extra fields; these
/// tests pin down how such payloads map onto the typed requests.
use chrono::{TimeZone, Utc};
use vigil_core::{
    ContactOutcome, CreateClientRequest, CreateContactRequest, CreateIncidentRequest, Error,
    UpdateClientRequest,
};

#[test]
fn test_incident_payload_accepts_naive_and_offset_timestamps() {
    let naive: CreateIncidentRequest = serde_json::from_str(
        r#"{"source": "sdpd", "occurred_at": "2026-05-30T08:15:00", "lat": 32.71, "lon": -117.16}"#,
    )
    .expect("naive timestamp should parse");
    assert_eq!(naive.occurred_at, Utc.with_ymd_and_hms(2026, 5, 30, 8, 15, 0).unwrap());
    assert_eq!(naive.incident_type, None);

    let offset: CreateIncidentRequest = serde_json::from_str(
        r#"{"source": "sdpd", "incident_type": "assault", "occurred_at": "2026-05-30T01:15:00-07:00", "lat": 32.71, "lon": -117.16}"#,
    )
    .expect("offset timestamp should parse");
    assert_eq!(offset.occurred_at, naive.occurred_at);
}

#[test]
fn test_incident_payload_rejects_bad_timestamp() {
    let result: Result<CreateIncidentRequest, _> = serde_json::from_str(
        r#"{"source": "sdpd", "occurred_at": "yesterday", "lat": 32.71, "lon": -117.16}"#,
    );
    let err = result.expect_err("garbage timestamp should fail");
    assert!(err.to_string().contains("Invalid timestamp"));
}

#[test]
fn test_client_payload_minimal() {
    let req: CreateClientRequest = serde_json::from_str(r#"{"display_name": "Robin"}"#).unwrap();
    let req = req.validate().unwrap();
    assert_eq!(req.display_name, "Robin");
    assert_eq!(req.follow_up_at, None);
    assert!(!req.need_therapy);
}

#[test]
fn test_client_payload_missing_name_fails_validation() {
    let req: CreateClientRequest = serde_json::from_str(r#"{"neighborhood": "Downtown"}"#).unwrap();
    assert!(matches!(req.validate(), Err(Error::InvalidInput(_))));
}

#[test]
fn test_client_patch_empty_follow_up_clears() {
    let patch: UpdateClientRequest = serde_json::from_str(r#"{"follow_up_at": ""}"#).unwrap();
    assert_eq!(patch.follow_up_at, Some(None));
    assert_eq!(patch.display_name, None);
}

#[test]
fn test_contact_payload_outcomes() {
    let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
    for outcome in ContactOutcome::ALL {
        let req: CreateContactRequest =
            serde_json::from_value(serde_json::json!({ "outcome": outcome.as_str() })).unwrap();
        assert_eq!(req.validate(now).unwrap().outcome, outcome);
    }

    let req: CreateContactRequest =
        serde_json::from_str(r#"{"outcome": "NO_ANSWER", "contacted_at": "2026-05-31"}"#).unwrap();
    assert!(req.validate(now).is_err());
}
