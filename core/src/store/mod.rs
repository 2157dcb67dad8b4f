//! SQLite persistence layer.
//!
//! RULE: only the store talks to the database. Pipeline components call
//! store methods — they never execute SQL directly.

mod audit;
mod complaint;
mod directory;

pub use audit::{action, LogEntry};
pub use complaint::{ComplaintRecord, NewComplaintRow};
pub use directory::{OfficeRow, OfficerRow, SlaConfigRow, WorkerRow};

use crate::error::CoreResult;
use crate::types::ComplaintStatus;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

pub struct CivicStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl CivicStore {
    pub fn open(path: &str) -> CoreResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        // A second writer (intake vs sweep) waits for the lock instead of
        // failing immediately with SQLITE_BUSY.
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> CoreResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database. In-memory stores get
    /// a fresh isolated database.
    pub fn reopen(&self) -> CoreResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> CoreResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_directory.sql"))?;
        self.conn
            .execute_batch(include_str!("../../migrations/002_complaints.sql"))?;
        self.conn
            .execute_batch(include_str!("../../migrations/003_audit.sql"))?;
        Ok(())
    }

    /// Run `f` inside a `BEGIN IMMEDIATE` transaction.
    ///
    /// IMMEDIATE takes the write lock up front, so read-check-write
    /// sequences (duplicate check + insert, workload count + assignment,
    /// sweep mutations) serialize against concurrent writers. Rolls back
    /// on error.
    pub fn with_tx<T>(&self, f: impl FnOnce(&Self) -> CoreResult<T>) -> CoreResult<T> {
        self.conn.execute_batch("BEGIN IMMEDIATE;")?;
        match f(self) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(value)
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err)
            }
        }
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Shared row helpers ──────────────────────────────────────────────────

/// RFC 3339 text is the canonical timestamp encoding; it sorts correctly
/// as a string, which the audit-log window queries rely on.
pub(crate) fn ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

pub(crate) fn parse_status(idx: usize, raw: String) -> rusqlite::Result<ComplaintStatus> {
    ComplaintStatus::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unknown complaint status '{raw}'").into(),
        )
    })
}

/// Render a status set as a SQL `IN (...)` list. Inputs are compile-time
/// constants, never user data.
pub(crate) fn status_list(statuses: &[ComplaintStatus]) -> String {
    statuses
        .iter()
        .map(|s| format!("'{}'", s.as_str()))
        .collect::<Vec<_>>()
        .join(",")
}
