//! Authenticity/severity classifier boundary.
//!
//! The classifier itself is an external vision service; the core only
//! owns the wire contract and the fail-safe rules around it. The verdict
//! is advisory: a classifier outage must never block intake, so parse
//! failures and transport errors collapse to documented defaults and the
//! raw failure is logged for audit.

use crate::error::{CoreError, CoreResult};
use serde::Deserialize;

/// Structured verdict: `{"genuine": "YES", "sla_hours": 6, "priority": 5,
/// "emergency": true}` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub genuine: bool,
    pub sla_hours: i64,
    pub priority: i64,
    pub emergency: bool,
}

impl Verdict {
    /// Fail-safe defaults: treat the complaint as genuine with the
    /// standard SLA rather than dropping it on the floor.
    pub fn fail_safe() -> Self {
        Self {
            genuine: true,
            sla_hours: 48,
            priority: 1,
            emergency: false,
        }
    }
}

/// External classifier transport. Implementations call the real service
/// and hand back its raw text response; the core does the parsing.
pub trait ClassifierClient {
    fn classify(&self, image_ref: &str, description: &str) -> anyhow::Result<String>;
}

#[derive(Deserialize)]
struct WireVerdict {
    #[serde(default = "default_genuine")]
    genuine: String,
    #[serde(default = "default_sla_hours")]
    sla_hours: i64,
    #[serde(default = "default_priority")]
    priority: i64,
    #[serde(default)]
    emergency: bool,
}

fn default_genuine() -> String {
    "YES".to_owned()
}
fn default_sla_hours() -> i64 {
    48
}
fn default_priority() -> i64 {
    1
}

/// Strip a leading/trailing markdown code fence, if present.
fn strip_fences(raw: &str) -> &str {
    let mut cleaned = raw.trim();
    if cleaned.starts_with("```") {
        cleaned = cleaned.split_once('\n').map_or("", |(_, rest)| rest);
    }
    if let Some(stripped) = cleaned.trim_end().strip_suffix("```") {
        cleaned = stripped;
    }
    cleaned.trim()
}

/// Parse a raw classifier response into a validated verdict.
///
/// Tolerates markdown fences and a bare YES/NO text reply. Clamps
/// sla_hours to 2..=48 and priority to 1..=5.
pub fn parse_verdict(raw: &str) -> CoreResult<Verdict> {
    let cleaned = strip_fences(raw);

    let wire: WireVerdict = match serde_json::from_str(cleaned) {
        Ok(wire) => wire,
        Err(_) => {
            // Not JSON: accept a plain YES/NO as a degenerate verdict.
            let upper = raw.trim().to_uppercase();
            if upper.starts_with("NO") {
                return Ok(Verdict {
                    genuine: false,
                    sla_hours: 48,
                    priority: 1,
                    emergency: false,
                });
            }
            if upper.starts_with("YES") {
                return Ok(Verdict::fail_safe());
            }
            return Err(CoreError::Classifier(raw.to_owned()));
        }
    };

    let genuine_norm = wire.genuine.trim().to_uppercase();
    let genuine = genuine_norm == "YES" || (genuine_norm != "NO" && genuine_norm.contains("YES"));

    Ok(Verdict {
        genuine,
        sla_hours: wire.sla_hours.clamp(2, 48),
        priority: wire.priority.clamp(1, 5),
        emergency: wire.emergency,
    })
}

/// Call the classifier and parse its answer, applying fail-safe defaults
/// on any error. This is the only place classifier failures are allowed
/// to disappear.
pub fn classify_or_default(
    client: &dyn ClassifierClient,
    image_ref: &str,
    description: &str,
) -> Verdict {
    match client.classify(image_ref, description) {
        Ok(raw) => match parse_verdict(&raw) {
            Ok(verdict) => verdict,
            Err(err) => {
                log::warn!("classifier output unparseable, using defaults: {err}");
                Verdict::fail_safe()
            }
        },
        Err(err) => {
            log::warn!("classifier call failed, using defaults: {err:#}");
            Verdict::fail_safe()
        }
    }
}
