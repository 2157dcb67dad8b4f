//! Append-only audit trail: the decision log and escalation records.
//!
//! Rows written here are never updated or deleted; every automated
//! decision in the pipeline leaves one behind.

use super::{parse_ts, ts, CivicStore};
use crate::error::CoreResult;
use crate::types::{CitizenId, ComplaintId, ComplaintStatus, EntityId};
use chrono::{DateTime, Utc};
use rusqlite::params;

/// Log action kinds. Typed (instead of free-text matching) so the
/// warning-idempotence window query is exact.
pub mod action {
    pub const INTAKE: &str = "intake";
    pub const FILTER: &str = "filter";
    pub const DUPLICATE_UPVOTE: &str = "duplicate_upvote";
    pub const CLASSIFIER: &str = "classifier";
    pub const SORTING: &str = "sorting";
    pub const ASSIGNMENT: &str = "assignment";
    pub const SLA_WARNING: &str = "sla_warning";
    pub const ESCALATION: &str = "escalation";
    pub const STATUS_CHANGE: &str = "status_change";
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub id: i64,
    pub complaint_id: ComplaintId,
    pub actor_id: Option<CitizenId>,
    pub action: String,
    pub note: String,
    pub old_status: Option<ComplaintStatus>,
    pub new_status: Option<ComplaintStatus>,
    pub created_at: DateTime<Utc>,
}

impl CivicStore {
    /// Append one audit entry. Old/new status are passed explicitly by
    /// the caller — the caller snapshots status before mutating, there is
    /// no hidden pre-write cache.
    #[allow(clippy::too_many_arguments)]
    pub fn append_log(
        &self,
        complaint_id: ComplaintId,
        actor_id: Option<CitizenId>,
        action: &str,
        note: &str,
        old_status: Option<ComplaintStatus>,
        new_status: Option<ComplaintStatus>,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.conn().execute(
            "INSERT INTO complaint_log
                (complaint_id, actor_id, action, note, old_status, new_status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                complaint_id,
                actor_id,
                action,
                note,
                old_status.map(ComplaintStatus::as_str),
                new_status.map(ComplaintStatus::as_str),
                ts(now),
            ],
        )?;
        Ok(())
    }

    /// True if a warning was already logged for this complaint at or
    /// after `since`. RFC 3339 strings compare chronologically.
    pub fn warning_logged_since(
        &self,
        complaint_id: ComplaintId,
        since: DateTime<Utc>,
    ) -> CoreResult<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM complaint_log
             WHERE complaint_id = ?1 AND action = ?2 AND created_at >= ?3",
            params![complaint_id, action::SLA_WARNING, ts(since)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn logs_for_complaint(&self, complaint_id: ComplaintId) -> CoreResult<Vec<LogEntry>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, complaint_id, actor_id, action, note, old_status, new_status, created_at
             FROM complaint_log WHERE complaint_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![complaint_id], |row| {
            Ok(LogEntry {
                id: row.get(0)?,
                complaint_id: row.get(1)?,
                actor_id: row.get(2)?,
                action: row.get(3)?,
                note: row.get(4)?,
                old_status: row
                    .get::<_, Option<String>>(5)?
                    .and_then(|s| ComplaintStatus::parse(&s)),
                new_status: row
                    .get::<_, Option<String>>(6)?
                    .and_then(|s| ComplaintStatus::parse(&s)),
                created_at: parse_ts(7, row.get(7)?)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn insert_escalation(
        &self,
        complaint_id: ComplaintId,
        escalated_from: Option<EntityId>,
        escalated_to: EntityId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<i64> {
        self.conn().execute(
            "INSERT INTO escalation
                (complaint_id, escalated_from, escalated_to, reason, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![complaint_id, escalated_from, escalated_to, reason, ts(now)],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    /// A complaint's escalation count is derived, never stored.
    pub fn escalation_count(&self, complaint_id: ComplaintId) -> CoreResult<i64> {
        self.conn()
            .query_row(
                "SELECT COUNT(*) FROM escalation WHERE complaint_id = ?1",
                params![complaint_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}
