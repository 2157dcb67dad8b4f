//! Shared primitive types used across the routing core.

use serde::{Deserialize, Serialize};

/// Row id of any directory entity (department, office, worker, officer).
pub type EntityId = i64;

/// Row id of a complaint. Creation order equals id order, which backs
/// every "earliest-created wins" rule in the pipeline.
pub type ComplaintId = i64;

/// Citizen identity as seen by the excluded web layer.
pub type CitizenId = i64;

/// Complaint lifecycle state.
///
/// SUBMITTED → FILTERING → {DECLINED | SORTING} → PENDING → ASSIGNED →
/// IN_PROGRESS → {RESOLVED → COMPLETED | REJECTED}. The escalation sweep
/// may force any non-terminal pre-resolution state back to PENDING.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    Submitted,
    Filtering,
    Declined,
    Sorting,
    Pending,
    Assigned,
    InProgress,
    Resolved,
    Completed,
    Rejected,
}

impl ComplaintStatus {
    /// Stable string form stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "SUBMITTED",
            Self::Filtering => "FILTERING",
            Self::Declined => "DECLINED",
            Self::Sorting => "SORTING",
            Self::Pending => "PENDING",
            Self::Assigned => "ASSIGNED",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Completed => "COMPLETED",
            Self::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "SUBMITTED" => Self::Submitted,
            "FILTERING" => Self::Filtering,
            "DECLINED" => Self::Declined,
            "SORTING" => Self::Sorting,
            "PENDING" => Self::Pending,
            "ASSIGNED" => Self::Assigned,
            "IN_PROGRESS" => Self::InProgress,
            "RESOLVED" => Self::Resolved,
            "COMPLETED" => Self::Completed,
            "REJECTED" => Self::Rejected,
            _ => return None,
        })
    }

    /// States that count toward a worker's or officer's current workload.
    pub const WORKLOAD_ACTIVE: &'static [ComplaintStatus] =
        &[Self::Pending, Self::Assigned, Self::InProgress];

    /// Non-terminal states considered "still open" by duplicate matching.
    pub const DUPLICATE_ACTIVE: &'static [ComplaintStatus] = &[
        Self::Submitted,
        Self::Filtering,
        Self::Sorting,
        Self::Pending,
        Self::Assigned,
        Self::InProgress,
    ];

    /// States the escalation sweep scans. Resolved, completed, and the
    /// terminal rejections are excluded.
    pub const SWEEP_SCANNED: &'static [ComplaintStatus] = &[
        Self::Submitted,
        Self::Pending,
        Self::Assigned,
        Self::InProgress,
        Self::Sorting,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Declined | Self::Rejected | Self::Resolved | Self::Completed
        )
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
