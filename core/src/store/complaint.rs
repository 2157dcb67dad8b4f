//! Complaint rows and the status/workload queries the pipeline runs on
//! them.

use super::{parse_status, parse_ts, status_list, ts, CivicStore};
use crate::error::{CoreError, CoreResult};
use crate::types::{CitizenId, ComplaintId, ComplaintStatus, EntityId};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, OptionalExtension};

#[derive(Debug, Clone)]
pub struct ComplaintRecord {
    pub id: ComplaintId,
    pub public_id: String,
    pub citizen_id: CitizenId,
    pub title: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: String,
    pub state: String,
    pub category_id: Option<EntityId>,
    pub department_id: Option<EntityId>,
    pub office_id: Option<EntityId>,
    pub status: ComplaintStatus,
    pub priority: i64,
    pub upvote_count: i64,
    pub smart_hash: String,
    pub filter_checked: bool,
    pub filter_passed: bool,
    pub filter_reason: String,
    pub sorted: bool,
    pub assigned: bool,
    pub ai_genuine: Option<bool>,
    pub ai_sla_hours: Option<i64>,
    pub ai_priority: Option<i64>,
    pub ai_emergency: Option<bool>,
    pub current_worker_id: Option<EntityId>,
    pub current_officer_id: Option<EntityId>,
    pub sla_deadline: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub is_spam: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields the intake pipeline supplies when creating a complaint.
#[derive(Debug, Clone)]
pub struct NewComplaintRow {
    pub public_id: String,
    pub citizen_id: CitizenId,
    pub title: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: String,
    pub state: String,
    pub category_id: Option<EntityId>,
    pub department_id: Option<EntityId>,
    pub smart_hash: String,
    pub created_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, public_id, citizen_id, title, description, latitude, longitude, \
     city, state, category_id, department_id, office_id, status, priority, upvote_count, \
     smart_hash, filter_checked, filter_passed, filter_reason, sorted, assigned, \
     ai_genuine, ai_sla_hours, ai_priority, ai_emergency, current_worker_id, \
     current_officer_id, sla_deadline, is_deleted, is_spam, created_at, updated_at";

fn complaint_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ComplaintRecord> {
    Ok(ComplaintRecord {
        id: row.get(0)?,
        public_id: row.get(1)?,
        citizen_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        latitude: row.get(5)?,
        longitude: row.get(6)?,
        city: row.get(7)?,
        state: row.get(8)?,
        category_id: row.get(9)?,
        department_id: row.get(10)?,
        office_id: row.get(11)?,
        status: parse_status(12, row.get(12)?)?,
        priority: row.get(13)?,
        upvote_count: row.get(14)?,
        smart_hash: row.get(15)?,
        filter_checked: row.get::<_, i64>(16)? != 0,
        filter_passed: row.get::<_, i64>(17)? != 0,
        filter_reason: row.get(18)?,
        sorted: row.get::<_, i64>(19)? != 0,
        assigned: row.get::<_, i64>(20)? != 0,
        ai_genuine: row.get::<_, Option<i64>>(21)?.map(|v| v != 0),
        ai_sla_hours: row.get(22)?,
        ai_priority: row.get(23)?,
        ai_emergency: row.get::<_, Option<i64>>(24)?.map(|v| v != 0),
        current_worker_id: row.get(25)?,
        current_officer_id: row.get(26)?,
        sla_deadline: row
            .get::<_, Option<String>>(27)?
            .map(|s| parse_ts(27, s))
            .transpose()?,
        is_deleted: row.get::<_, i64>(28)? != 0,
        is_spam: row.get::<_, i64>(29)? != 0,
        created_at: parse_ts(30, row.get(30)?)?,
        updated_at: parse_ts(31, row.get(31)?)?,
    })
}

impl CivicStore {
    pub fn insert_complaint(&self, c: &NewComplaintRow) -> CoreResult<ComplaintId> {
        self.conn().execute(
            "INSERT INTO complaint (
                public_id, citizen_id, title, description, latitude, longitude,
                city, state, category_id, department_id, smart_hash,
                created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
            params![
                c.public_id,
                c.citizen_id,
                c.title,
                c.description,
                c.latitude,
                c.longitude,
                c.city,
                c.state,
                c.category_id,
                c.department_id,
                c.smart_hash,
                ts(c.created_at),
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    pub fn get_complaint(&self, id: ComplaintId) -> CoreResult<ComplaintRecord> {
        self.conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM complaint WHERE id = ?1"),
                params![id],
                complaint_row,
            )
            .optional()?
            .ok_or(CoreError::ComplaintNotFound(id))
    }

    /// Duplicate-candidate lookup: open, non-deleted complaints whose
    /// fingerprint is in the candidate set, earliest first.
    pub fn find_active_by_fingerprints(
        &self,
        fingerprints: &[String],
    ) -> CoreResult<Vec<ComplaintRecord>> {
        if fingerprints.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; fingerprints.len()].join(",");
        let sql = format!(
            "SELECT {COLUMNS} FROM complaint
             WHERE smart_hash IN ({placeholders})
               AND is_deleted = 0
               AND status IN ({})
             ORDER BY id ASC",
            status_list(ComplaintStatus::DUPLICATE_ACTIVE),
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(fingerprints.iter()), complaint_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn record_filter_result(
        &self,
        id: ComplaintId,
        passed: bool,
        reason: &str,
        is_spam: bool,
        status: ComplaintStatus,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.conn().execute(
            "UPDATE complaint
             SET filter_checked = 1, filter_passed = ?1, filter_reason = ?2,
                 is_spam = ?3, status = ?4, updated_at = ?5
             WHERE id = ?6",
            params![passed as i64, reason, is_spam as i64, status.as_str(), ts(now), id],
        )?;
        Ok(())
    }

    pub fn record_classifier_verdict(
        &self,
        id: ComplaintId,
        genuine: bool,
        sla_hours: i64,
        priority: i64,
        emergency: bool,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.conn().execute(
            "UPDATE complaint
             SET ai_genuine = ?1, ai_sla_hours = ?2, ai_priority = ?3,
                 ai_emergency = ?4, priority = ?3, updated_at = ?5
             WHERE id = ?6",
            params![genuine as i64, sla_hours, priority, emergency as i64, ts(now), id],
        )?;
        Ok(())
    }

    /// Pin the resolved department and move to SORTING.
    pub fn set_department_sorting(
        &self,
        id: ComplaintId,
        department_id: EntityId,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.conn().execute(
            "UPDATE complaint
             SET department_id = ?1, status = 'SORTING', updated_at = ?2
             WHERE id = ?3",
            params![department_id, ts(now), id],
        )?;
        Ok(())
    }

    /// Attach the resolved office (possibly none), mark sorted, and move
    /// to PENDING.
    pub fn set_office_pending(
        &self,
        id: ComplaintId,
        office_id: Option<EntityId>,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.conn().execute(
            "UPDATE complaint
             SET office_id = ?1, sorted = 1, status = 'PENDING', updated_at = ?2
             WHERE id = ?3",
            params![office_id, ts(now), id],
        )?;
        Ok(())
    }

    /// Update only the office link; status and flags stay untouched. Used
    /// when re-sorting a complaint that already left the sorting stage.
    pub fn set_office(
        &self,
        id: ComplaintId,
        office_id: Option<EntityId>,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.conn().execute(
            "UPDATE complaint SET office_id = ?1, updated_at = ?2 WHERE id = ?3",
            params![office_id, ts(now), id],
        )?;
        Ok(())
    }

    /// Atomic assignment write: worker, ASSIGNED status, assigned flag,
    /// and SLA deadline in one statement, guarded on the complaint still
    /// being PENDING. Returns false if the guard failed.
    pub fn assign_worker(
        &self,
        id: ComplaintId,
        worker_id: EntityId,
        sla_deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> CoreResult<bool> {
        let changed = self.conn().execute(
            "UPDATE complaint
             SET current_worker_id = ?1, status = 'ASSIGNED', assigned = 1,
                 sla_deadline = ?2, updated_at = ?3
             WHERE id = ?4 AND is_deleted = 0 AND status = 'PENDING'",
            params![worker_id, ts(sla_deadline), ts(now), id],
        )?;
        Ok(changed == 1)
    }

    pub fn set_status(
        &self,
        id: ComplaintId,
        status: ComplaintStatus,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.conn().execute(
            "UPDATE complaint SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), ts(now), id],
        )?;
        Ok(())
    }

    pub fn soft_delete(&self, id: ComplaintId, now: DateTime<Utc>) -> CoreResult<()> {
        self.conn().execute(
            "UPDATE complaint SET is_deleted = 1, updated_at = ?1 WHERE id = ?2",
            params![ts(now), id],
        )?;
        Ok(())
    }

    /// Record a citizen vote. One vote per citizen per complaint; returns
    /// false if this citizen already voted.
    pub fn add_vote(
        &self,
        complaint_id: ComplaintId,
        citizen_id: CitizenId,
        now: DateTime<Utc>,
    ) -> CoreResult<bool> {
        let inserted = self.conn().execute(
            "INSERT OR IGNORE INTO complaint_vote (complaint_id, citizen_id, created_at)
             VALUES (?1, ?2, ?3)",
            params![complaint_id, citizen_id, ts(now)],
        )?;
        if inserted == 1 {
            self.conn().execute(
                "UPDATE complaint SET upvote_count = upvote_count + 1, updated_at = ?1
                 WHERE id = ?2",
                params![ts(now), complaint_id],
            )?;
        }
        Ok(inserted == 1)
    }

    /// Current workload of a worker: assigned complaints still in the
    /// active set, soft-deleted rows excluded.
    pub fn worker_workload(&self, worker_id: EntityId) -> CoreResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM complaint
             WHERE current_worker_id = ?1 AND is_deleted = 0
               AND status IN ({})",
            status_list(ComplaintStatus::WORKLOAD_ACTIVE),
        );
        self.conn()
            .query_row(&sql, params![worker_id], |row| row.get(0))
            .map_err(Into::into)
    }

    /// Active complaints currently supervised by an officer.
    pub fn officer_workload(&self, officer_id: EntityId) -> CoreResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM complaint
             WHERE current_officer_id = ?1 AND is_deleted = 0
               AND status IN ({})",
            status_list(ComplaintStatus::WORKLOAD_ACTIVE),
        );
        self.conn()
            .query_row(&sql, params![officer_id], |row| row.get(0))
            .map_err(Into::into)
    }

    /// Complaints the escalation sweep examines: active, non-deleted,
    /// with a resolved category.
    pub fn sweep_candidates(&self) -> CoreResult<Vec<ComplaintRecord>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM complaint
             WHERE is_deleted = 0 AND category_id IS NOT NULL
               AND status IN ({})
             ORDER BY id ASC",
            status_list(ComplaintStatus::SWEEP_SCANNED),
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([], complaint_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Optimistic escalation write: reset to PENDING, bump priority, and
    /// hand to the new officer — only if the complaint is still in an
    /// active state. Returns false when a concurrent sweep got there
    /// first (treated as a no-op by the caller).
    pub fn escalate_if_active(
        &self,
        id: ComplaintId,
        new_priority: i64,
        to_officer: EntityId,
        now: DateTime<Utc>,
    ) -> CoreResult<bool> {
        let sql = format!(
            "UPDATE complaint
             SET status = 'PENDING', priority = ?1, current_officer_id = ?2,
                 current_worker_id = NULL, assigned = 0, updated_at = ?3
             WHERE id = ?4 AND is_deleted = 0 AND status IN ({})",
            status_list(ComplaintStatus::SWEEP_SCANNED),
        );
        let changed = self
            .conn()
            .execute(&sql, params![new_priority, to_officer, ts(now), id])?;
        Ok(changed == 1)
    }

    pub fn complaint_count(&self) -> CoreResult<i64> {
        self.conn()
            .query_row("SELECT COUNT(*) FROM complaint", [], |row| row.get(0))
            .map_err(Into::into)
    }

    pub fn vote_count(&self, complaint_id: ComplaintId) -> CoreResult<i64> {
        self.conn()
            .query_row(
                "SELECT COUNT(*) FROM complaint_vote WHERE complaint_id = ?1",
                params![complaint_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}
