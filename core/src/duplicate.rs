//! Geo-semantic duplicate detection.
//!
//! A new submission is checked against open complaints whose fingerprint
//! falls in the 3x3 grid neighborhood of its own. A fingerprint match is
//! only a candidate; when the submission carries coordinates the match
//! must be confirmed within [`DUPLICATE_RADIUS_M`], and candidates whose
//! distance cannot be checked are skipped. Hash collisions further apart
//! than the radius are genuinely different issues and fall through to
//! creation.

use crate::config::FingerprintConfig;
use crate::error::CoreResult;
use crate::fingerprint::{candidate_fingerprints, compute_fingerprint, haversine_m};
use crate::store::{action, CivicStore, ComplaintRecord};
use crate::types::CitizenId;
use chrono::{DateTime, Utc};

pub const DUPLICATE_RADIUS_M: f64 = 50.0;

#[derive(Debug)]
pub enum DuplicateDecision {
    /// No open duplicate: proceed to create a new complaint.
    NewComplaint,
    /// The same citizen already filed this issue.
    AlreadyReported { original: ComplaintRecord },
    /// Someone else already filed it: count this submission as a vote.
    Upvote { original: ComplaintRecord },
}

/// Computed fingerprint plus the duplicate verdict for one submission.
#[derive(Debug)]
pub struct DuplicateCheck {
    pub fingerprint: String,
    pub decision: DuplicateDecision,
}

/// Confirm a candidate. With coordinates on both sides the real distance
/// decides. A located submission cannot verify a coordinate-less
/// candidate, so that match is discarded; a submission without
/// coordinates trusts the fingerprint.
fn confirms(
    latitude: Option<f64>,
    longitude: Option<f64>,
    candidate: &ComplaintRecord,
) -> bool {
    match (latitude, longitude, candidate.latitude, candidate.longitude) {
        (Some(lat), Some(lon), Some(c_lat), Some(c_lon)) => {
            haversine_m(lat, lon, c_lat, c_lon) <= DUPLICATE_RADIUS_M
        }
        (Some(_), Some(_), _, _) => false,
        _ => true,
    }
}

/// Run the duplicate check for a submission. Candidates come back from
/// the store earliest-created first, so the first confirmed match is the
/// canonical original.
pub fn check(
    store: &CivicStore,
    config: &FingerprintConfig,
    citizen_id: CitizenId,
    title: &str,
    latitude: Option<f64>,
    longitude: Option<f64>,
    department_name: &str,
) -> CoreResult<DuplicateCheck> {
    let fingerprint =
        compute_fingerprint(config, title, latitude, longitude, Some(department_name));
    let candidates =
        candidate_fingerprints(config, title, latitude, longitude, Some(department_name));

    let matches = store.find_active_by_fingerprints(&candidates)?;
    for candidate in matches {
        if !confirms(latitude, longitude, &candidate) {
            log::debug!(
                "complaint {} shares fingerprint {} but is out of range, skipping",
                candidate.id,
                candidate.smart_hash
            );
            continue;
        }
        let decision = if candidate.citizen_id == citizen_id {
            DuplicateDecision::AlreadyReported { original: candidate }
        } else {
            DuplicateDecision::Upvote { original: candidate }
        };
        return Ok(DuplicateCheck {
            fingerprint,
            decision,
        });
    }

    Ok(DuplicateCheck {
        fingerprint,
        decision: DuplicateDecision::NewComplaint,
    })
}

/// Register a duplicate submission as a vote on the original. One vote
/// per citizen per complaint; a repeat vote only leaves the audit entry.
pub fn record_upvote(
    store: &CivicStore,
    original: &ComplaintRecord,
    voter: CitizenId,
    now: DateTime<Utc>,
) -> CoreResult<bool> {
    let counted = store.add_vote(original.id, voter, now)?;
    let note = if counted {
        format!("duplicate submission by citizen {voter} counted as upvote")
    } else {
        format!("duplicate submission by citizen {voter}; vote already on record")
    };
    store.append_log(
        original.id,
        Some(voter),
        action::DUPLICATE_UPVOTE,
        &note,
        Some(original.status),
        Some(original.status),
        now,
    )?;
    Ok(counted)
}
