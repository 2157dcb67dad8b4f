//! Reference-data tables: departments, categories, offices, staff, SLA.

use super::{parse_ts, ts, CivicStore};
use crate::error::CoreResult;
use crate::types::EntityId;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

#[derive(Debug, Clone)]
pub struct OfficeRow {
    pub id: EntityId,
    pub department_id: EntityId,
    pub name: String,
    pub city: String,
    pub state: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WorkerRow {
    pub id: EntityId,
    pub name: String,
    pub department_id: EntityId,
    pub office_id: Option<EntityId>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct OfficerRow {
    pub id: EntityId,
    pub name: String,
    pub department_id: EntityId,
}

#[derive(Debug, Clone, Copy)]
pub struct SlaConfigRow {
    pub category_id: EntityId,
    pub resolution_hours: i64,
    pub escalation_hours: i64,
}

fn office_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<OfficeRow> {
    Ok(OfficeRow {
        id: row.get(0)?,
        department_id: row.get(1)?,
        name: row.get(2)?,
        city: row.get(3)?,
        state: row.get(4)?,
        is_active: row.get::<_, i64>(5)? != 0,
        created_at: parse_ts(6, row.get(6)?)?,
    })
}

impl CivicStore {
    // ── Inserts (seed data and admin tooling) ──────────────────────────

    pub fn insert_department(&self, name: &str) -> CoreResult<EntityId> {
        self.conn()
            .execute("INSERT INTO department (name) VALUES (?1)", params![name])?;
        Ok(self.conn().last_insert_rowid())
    }

    pub fn insert_category(&self, name: &str, department_id: EntityId) -> CoreResult<EntityId> {
        self.conn().execute(
            "INSERT INTO complaint_category (name, department_id) VALUES (?1, ?2)",
            params![name, department_id],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    pub fn insert_office(
        &self,
        department_id: EntityId,
        name: &str,
        city: &str,
        state: &str,
        is_active: bool,
        created_at: DateTime<Utc>,
    ) -> CoreResult<EntityId> {
        self.conn().execute(
            "INSERT INTO office (department_id, name, city, state, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![department_id, name, city, state, is_active as i64, ts(created_at)],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    pub fn insert_worker(
        &self,
        name: &str,
        department_id: EntityId,
        office_id: Option<EntityId>,
        is_active: bool,
    ) -> CoreResult<EntityId> {
        self.conn().execute(
            "INSERT INTO worker (name, department_id, office_id, is_active)
             VALUES (?1, ?2, ?3, ?4)",
            params![name, department_id, office_id, is_active as i64],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    pub fn insert_officer(&self, name: &str, department_id: EntityId) -> CoreResult<EntityId> {
        self.conn().execute(
            "INSERT INTO officer (name, department_id) VALUES (?1, ?2)",
            params![name, department_id],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    pub fn upsert_sla_config(
        &self,
        category_id: EntityId,
        resolution_hours: i64,
        escalation_hours: i64,
    ) -> CoreResult<()> {
        self.conn().execute(
            "INSERT INTO sla_config (category_id, resolution_hours, escalation_hours)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(category_id) DO UPDATE SET
                resolution_hours = excluded.resolution_hours,
                escalation_hours = excluded.escalation_hours",
            params![category_id, resolution_hours, escalation_hours],
        )?;
        Ok(())
    }

    pub fn set_office_active(&self, office_id: EntityId, is_active: bool) -> CoreResult<()> {
        self.conn().execute(
            "UPDATE office SET is_active = ?1 WHERE id = ?2",
            params![is_active as i64, office_id],
        )?;
        Ok(())
    }

    pub fn set_worker_active(&self, worker_id: EntityId, is_active: bool) -> CoreResult<()> {
        self.conn().execute(
            "UPDATE worker SET is_active = ?1 WHERE id = ?2",
            params![is_active as i64, worker_id],
        )?;
        Ok(())
    }

    // ── Lookups ────────────────────────────────────────────────────────

    pub fn department_name(&self, department_id: EntityId) -> CoreResult<Option<String>> {
        self.conn()
            .query_row(
                "SELECT name FROM department WHERE id = ?1",
                params![department_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn category_department(&self, category_id: EntityId) -> CoreResult<Option<EntityId>> {
        self.conn()
            .query_row(
                "SELECT department_id FROM complaint_category WHERE id = ?1",
                params![category_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn category_name(&self, category_id: EntityId) -> CoreResult<Option<String>> {
        self.conn()
            .query_row(
                "SELECT name FROM complaint_category WHERE id = ?1",
                params![category_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Active offices for (department, city), city matched
    /// case-insensitively, earliest-created (lowest id) first.
    pub fn active_offices(&self, department_id: EntityId, city: &str) -> CoreResult<Vec<OfficeRow>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, department_id, name, city, state, is_active, created_at
             FROM office
             WHERE department_id = ?1 AND lower(city) = lower(?2) AND is_active = 1
             ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![department_id, city], office_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_office(&self, office_id: EntityId) -> CoreResult<Option<OfficeRow>> {
        self.conn()
            .query_row(
                "SELECT id, department_id, name, city, state, is_active, created_at
                 FROM office WHERE id = ?1",
                params![office_id],
                office_row,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn active_workers_in_office(&self, office_id: EntityId) -> CoreResult<Vec<WorkerRow>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, department_id, office_id, is_active
             FROM worker WHERE office_id = ?1 AND is_active = 1
             ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![office_id], |row| {
            Ok(WorkerRow {
                id: row.get(0)?,
                name: row.get(1)?,
                department_id: row.get(2)?,
                office_id: row.get(3)?,
                is_active: row.get::<_, i64>(4)? != 0,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_worker(&self, worker_id: EntityId) -> CoreResult<Option<WorkerRow>> {
        self.conn()
            .query_row(
                "SELECT id, name, department_id, office_id, is_active
                 FROM worker WHERE id = ?1",
                params![worker_id],
                |row| {
                    Ok(WorkerRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        department_id: row.get(2)?,
                        office_id: row.get(3)?,
                        is_active: row.get::<_, i64>(4)? != 0,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn officers_in_department(&self, department_id: EntityId) -> CoreResult<Vec<OfficerRow>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, department_id FROM officer
             WHERE department_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![department_id], |row| {
            Ok(OfficerRow {
                id: row.get(0)?,
                name: row.get(1)?,
                department_id: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_officer(&self, officer_id: EntityId) -> CoreResult<Option<OfficerRow>> {
        self.conn()
            .query_row(
                "SELECT id, name, department_id FROM officer WHERE id = ?1",
                params![officer_id],
                |row| {
                    Ok(OfficerRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        department_id: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn sla_for_category(&self, category_id: EntityId) -> CoreResult<Option<SlaConfigRow>> {
        self.conn()
            .query_row(
                "SELECT category_id, resolution_hours, escalation_hours
                 FROM sla_config WHERE category_id = ?1",
                params![category_id],
                |row| {
                    Ok(SlaConfigRow {
                        category_id: row.get(0)?,
                        resolution_hours: row.get(1)?,
                        escalation_hours: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }
}
