//! Classifier boundary tests: wire parsing and the fail-safe wrapper.

use civicroute_core::classifier::{classify_or_default, parse_verdict, ClassifierClient, Verdict};

struct CannedClient(&'static str);

impl ClassifierClient for CannedClient {
    fn classify(&self, _image_ref: &str, _description: &str) -> anyhow::Result<String> {
        Ok(self.0.to_owned())
    }
}

struct BrokenClient;

impl ClassifierClient for BrokenClient {
    fn classify(&self, _image_ref: &str, _description: &str) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("connection refused"))
    }
}

/// The documented wire format parses into a validated verdict.
#[test]
fn well_formed_verdict_round_trips() {
    let v = parse_verdict(
        r#"{"genuine": "YES", "sla_hours": 12, "priority": 3, "emergency": false}"#,
    )
    .unwrap();
    assert_eq!(
        v,
        Verdict {
            genuine: true,
            sla_hours: 12,
            priority: 3,
            emergency: false
        }
    );
}

/// Missing fields take the documented defaults rather than failing.
#[test]
fn missing_fields_default() {
    let v = parse_verdict(r#"{"genuine": "NO"}"#).unwrap();
    assert!(!v.genuine);
    assert_eq!(v.sla_hours, 48);
    assert_eq!(v.priority, 1);
    assert!(!v.emergency);
}

/// A model that wraps its answer in a markdown fence still parses, with
/// out-of-range values clamped.
#[test]
fn fenced_and_out_of_range_output_is_tolerated() {
    let raw = "```json\n{\"genuine\": \"yes\", \"sla_hours\": 1, \"priority\": 99, \"emergency\": true}\n```";
    let v = parse_verdict(raw).unwrap();
    assert!(v.genuine, "lowercase yes still counts");
    assert_eq!(v.sla_hours, 2, "sla_hours clamps up to 2");
    assert_eq!(v.priority, 5, "priority clamps down to 5");
}

/// Transport failure collapses to the fail-safe verdict: genuine, 48h,
/// priority 1. Intake must never block on the classifier.
#[test]
fn transport_failure_uses_fail_safe_defaults() {
    let v = classify_or_default(&BrokenClient, "img-1", "pothole on the road");
    assert_eq!(v, Verdict::fail_safe());
    assert!(v.genuine);
    assert_eq!(v.sla_hours, 48);
}

/// Unparseable output also collapses to the fail-safe verdict.
#[test]
fn garbage_output_uses_fail_safe_defaults() {
    let v = classify_or_default(
        &CannedClient("As a vision model I think this might be a road."),
        "img-1",
        "pothole on the road",
    );
    assert_eq!(v, Verdict::fail_safe());
}

/// A bare textual NO is honored as a negative verdict.
#[test]
fn bare_no_text_is_negative() {
    let v = classify_or_default(&CannedClient("NO - this is a selfie"), "img-1", "selfie");
    assert!(!v.genuine);
}
