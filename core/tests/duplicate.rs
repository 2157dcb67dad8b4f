//! Duplicate detection tests: fingerprint candidates plus the 50 m
//! haversine confirmation.

use chrono::{TimeZone, Utc};
use civicroute_core::config::FingerprintConfig;
use civicroute_core::duplicate::{self, DuplicateDecision};
use civicroute_core::fingerprint::compute_fingerprint;
use civicroute_core::store::{CivicStore, NewComplaintRow};
use civicroute_core::types::ComplaintStatus;

const LAT: f64 = 26.9124;
const LON: f64 = 75.7873;
const DEPT: &str = "Public Works Department";

fn store() -> CivicStore {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = CivicStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
}

fn file_complaint(
    store: &CivicStore,
    citizen_id: i64,
    title: &str,
    lat: Option<f64>,
    lon: Option<f64>,
    smart_hash: &str,
) -> i64 {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
    store
        .insert_complaint(&NewComplaintRow {
            public_id: format!("pub-{citizen_id}-{title}"),
            citizen_id,
            title: title.to_owned(),
            description: "placeholder description for duplicate tests".to_owned(),
            latitude: lat,
            longitude: lon,
            city: "Jaipur".to_owned(),
            state: "Rajasthan".to_owned(),
            category_id: None,
            department_id: None,
            smart_hash: smart_hash.to_owned(),
            created_at: now,
        })
        .unwrap()
}

/// Same citizen reporting the same pothole ~6 m away is told they
/// already reported it.
#[test]
fn same_filer_nearby_is_already_reported() {
    let store = store();
    let config = FingerprintConfig::default();
    let hash = compute_fingerprint(&config, "Big pothole", Some(LAT), Some(LON), Some(DEPT));
    let original = file_complaint(&store, 7, "Big pothole", Some(LAT), Some(LON), &hash);

    // ~6 m north of the original.
    let check = duplicate::check(
        &store,
        &config,
        7,
        "Huge crater here",
        Some(LAT + 0.00005),
        Some(LON),
        DEPT,
    )
    .unwrap();
    match check.decision {
        DuplicateDecision::AlreadyReported { original: o } => assert_eq!(o.id, original),
        other => panic!("expected AlreadyReported, got {other:?}"),
    }
}

/// A different citizen reporting the same issue becomes an upvote, one
/// vote per citizen.
#[test]
fn different_filer_nearby_becomes_upvote() {
    let store = store();
    let config = FingerprintConfig::default();
    let hash = compute_fingerprint(&config, "Big pothole", Some(LAT), Some(LON), Some(DEPT));
    let original_id = file_complaint(&store, 7, "Big pothole", Some(LAT), Some(LON), &hash);

    let check =
        duplicate::check(&store, &config, 8, "Big pothole", Some(LAT + 0.00005), Some(LON), DEPT)
            .unwrap();
    let original = match check.decision {
        DuplicateDecision::Upvote { original } => original,
        other => panic!("expected Upvote, got {other:?}"),
    };
    assert_eq!(original.id, original_id);

    let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
    assert!(duplicate::record_upvote(&store, &original, 8, now).unwrap());
    assert!(
        !duplicate::record_upvote(&store, &original, 8, now).unwrap(),
        "second vote by the same citizen must not count"
    );
    let refreshed = store.get_complaint(original_id).unwrap();
    assert_eq!(refreshed.upvote_count, 1);
    assert_eq!(store.vote_count(original_id).unwrap(), 1);
}

/// A fingerprint collision further than 50 m apart is a different issue:
/// the distance check rejects it and a new complaint is created.
#[test]
fn distant_hash_collision_is_rejected() {
    let store = store();
    let config = FingerprintConfig::default();
    // Forge a stored complaint carrying the same hash the new submission
    // will compute, but located ~550 m away.
    let new_hash = compute_fingerprint(&config, "Big pothole", Some(LAT), Some(LON), Some(DEPT));
    file_complaint(&store, 7, "Big pothole", Some(LAT + 0.005), Some(LON), &new_hash);

    let check =
        duplicate::check(&store, &config, 8, "Big pothole", Some(LAT), Some(LON), DEPT).unwrap();
    assert!(
        matches!(check.decision, DuplicateDecision::NewComplaint),
        "collision beyond 50m must not be treated as a duplicate"
    );
}

/// Resolved complaints no longer block new reports of the same issue.
#[test]
fn closed_complaints_are_not_duplicate_targets() {
    let store = store();
    let config = FingerprintConfig::default();
    let hash = compute_fingerprint(&config, "Big pothole", Some(LAT), Some(LON), Some(DEPT));
    let id = file_complaint(&store, 7, "Big pothole", Some(LAT), Some(LON), &hash);
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
    store.set_status(id, ComplaintStatus::Resolved, now).unwrap();

    let check =
        duplicate::check(&store, &config, 8, "Big pothole", Some(LAT), Some(LON), DEPT).unwrap();
    assert!(matches!(check.decision, DuplicateDecision::NewComplaint));
}

/// When the stored complaint has no coordinates the fingerprint match
/// stands on its own.
#[test]
fn missing_coordinates_trust_the_fingerprint() {
    let store = store();
    let config = FingerprintConfig::default();
    let hash = compute_fingerprint(&config, "Open manhole", None, None, Some("Sewerage"));
    let id = file_complaint(&store, 7, "Open manhole", None, None, &hash);

    let check =
        duplicate::check(&store, &config, 9, "Open manhole", None, None, "Sewerage").unwrap();
    match check.decision {
        DuplicateDecision::Upvote { original } => assert_eq!(original.id, id),
        other => panic!("expected Upvote, got {other:?}"),
    }
}

/// A located submission cannot verify a stored candidate that has no
/// coordinates; that hash match is discarded and a new complaint is
/// created.
#[test]
fn located_submission_skips_unlocatable_candidate() {
    let store = store();
    let config = FingerprintConfig::default();
    // Forge a coordinate-less complaint carrying the hash the located
    // submission will compute.
    let new_hash = compute_fingerprint(&config, "Big pothole", Some(LAT), Some(LON), Some(DEPT));
    file_complaint(&store, 7, "Big pothole", None, None, &new_hash);

    let check =
        duplicate::check(&store, &config, 8, "Big pothole", Some(LAT), Some(LON), DEPT).unwrap();
    assert!(
        matches!(check.decision, DuplicateDecision::NewComplaint),
        "a candidate without coordinates must not match a located submission"
    );
}

/// Earliest-created complaint wins when several open candidates match.
#[test]
fn earliest_candidate_is_canonical() {
    let store = store();
    let config = FingerprintConfig::default();
    let hash = compute_fingerprint(&config, "Big pothole", Some(LAT), Some(LON), Some(DEPT));
    let first = file_complaint(&store, 7, "Big pothole", Some(LAT), Some(LON), &hash);
    file_complaint(&store, 8, "Big pothole again", Some(LAT), Some(LON), &hash);

    let check =
        duplicate::check(&store, &config, 9, "Big pothole", Some(LAT), Some(LON), DEPT).unwrap();
    match check.decision {
        DuplicateDecision::Upvote { original } => assert_eq!(original.id, first),
        other => panic!("expected Upvote, got {other:?}"),
    }
}
