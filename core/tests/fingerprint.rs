//! Smart-hash fingerprint tests.

use civicroute_core::config::FingerprintConfig;
use civicroute_core::fingerprint::{candidate_fingerprints, compute_fingerprint, haversine_m};

const JAIPUR_LAT: f64 = 26.9124;
const JAIPUR_LON: f64 = 75.7873;

/// The fingerprint is a pure function of its inputs: same report, same
/// 10-character hash, regardless of casing, punctuation, or filler words.
#[test]
fn fingerprint_is_deterministic_and_normalized() {
    let config = FingerprintConfig::default();
    let a = compute_fingerprint(
        &config,
        "Big pothole near temple",
        Some(JAIPUR_LAT),
        Some(JAIPUR_LON),
        Some("Public Works Department"),
    );
    let b = compute_fingerprint(
        &config,
        "  big POTHOLE near temple!! ",
        Some(JAIPUR_LAT),
        Some(JAIPUR_LON),
        Some("Public Works Department"),
    );
    assert_eq!(a, b, "normalization should collapse casing and punctuation");
    assert_eq!(a.len(), 10, "fingerprint is always 10 characters");
    assert!(a.starts_with("POT"), "pothole reports map to POT, got {a}");
    assert!(a.ends_with("PWD"), "public works maps to PWD, got {a}");
}

/// Synonyms resolve to the same semantic category, so two citizens
/// describing the same pothole differently still collide.
#[test]
fn synonyms_share_a_title_code() {
    let config = FingerprintConfig::default();
    let a = compute_fingerprint(&config, "Huge crater in the road", Some(JAIPUR_LAT), Some(JAIPUR_LON), Some("Public Works Department"));
    let b = compute_fingerprint(&config, "Deep pothole", Some(JAIPUR_LAT), Some(JAIPUR_LON), Some("Public Works Department"));
    assert_eq!(a, b, "crater and pothole should share the POT code");
}

/// Misspellings within the fuzzy threshold still resolve.
#[test]
fn fuzzy_match_absorbs_typos() {
    let config = FingerprintConfig::default();
    let typo = compute_fingerprint(&config, "gabrage everywhere", None, None, None);
    let clean = compute_fingerprint(&config, "garbage everywhere", None, None, None);
    assert_eq!(typo, clean, "one transposition should fuzzy-match GRB");
}

/// Titles with no recognizable keywords fall back to a deterministic
/// digest code, never an error.
#[test]
fn unknown_titles_get_a_stable_digest_code() {
    let config = FingerprintConfig::default();
    let a = compute_fingerprint(&config, "Zorblax quixotry yonder", None, None, None);
    let b = compute_fingerprint(&config, "Zorblax quixotry yonder", None, None, None);
    assert_eq!(a, b);
    assert!(
        a[..3].chars().all(|c| c.is_ascii_uppercase()),
        "digest title code must be 3 uppercase letters, got {a}"
    );
}

/// Two points ~10 m apart may land in adjacent grid cells, but their
/// 3x3 candidate sets always intersect.
#[test]
fn nearby_points_share_a_candidate_fingerprint() {
    let config = FingerprintConfig::default();
    // ~11 m north.
    let shifted_lat = JAIPUR_LAT + 0.0001;
    assert!(haversine_m(JAIPUR_LAT, JAIPUR_LON, shifted_lat, JAIPUR_LON) < 15.0);

    let here = candidate_fingerprints(
        &config,
        "Big pothole near temple",
        Some(JAIPUR_LAT),
        Some(JAIPUR_LON),
        Some("Public Works Department"),
    );
    let there = candidate_fingerprints(
        &config,
        "Big pothole near temple",
        Some(shifted_lat),
        Some(JAIPUR_LON),
        Some("Public Works Department"),
    );
    assert!(
        here.iter().any(|fp| there.contains(fp)),
        "candidate sets of points <15m apart must overlap"
    );
    assert!(here.len() <= 9, "at most 9 candidates, got {}", here.len());
}

/// Same issue and place under different departments must not collide.
#[test]
fn department_separates_fingerprints() {
    let config = FingerprintConfig::default();
    let pwd = compute_fingerprint(&config, "Water leaking", Some(JAIPUR_LAT), Some(JAIPUR_LON), Some("Public Works Department"));
    let wss = compute_fingerprint(&config, "Water leaking", Some(JAIPUR_LAT), Some(JAIPUR_LON), Some("Water Supply and Sewerage"));
    assert_ne!(pwd, wss);
}

/// Haversine sanity: one degree of latitude is about 111 km.
#[test]
fn haversine_matches_known_distance() {
    let d = haversine_m(26.0, 75.0, 27.0, 75.0);
    assert!((d - 111_195.0).abs() < 500.0, "got {d}");
}
