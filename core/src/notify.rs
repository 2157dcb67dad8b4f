//! Outbound notifications.
//!
//! Delivery is best-effort everywhere: a failing sink is logged and the
//! pipeline moves on. No routing decision ever depends on a notification
//! having been delivered.

use crate::store::{ComplaintRecord, OfficerRow, WorkerRow};

pub trait NotificationSink {
    fn complaint_registered(&self, complaint: &ComplaintRecord) -> anyhow::Result<()>;
    fn worker_assigned(&self, complaint: &ComplaintRecord, worker: &WorkerRow) -> anyhow::Result<()>;
    fn sla_warning(&self, complaint: &ComplaintRecord, hours_remaining: i64) -> anyhow::Result<()>;
    fn escalated(
        &self,
        complaint: &ComplaintRecord,
        to_officer: &OfficerRow,
        reason: &str,
    ) -> anyhow::Result<()>;
    fn overdue(&self, complaint: &ComplaintRecord) -> anyhow::Result<()>;
}

/// Default sink: writes every event to the log. Real deployments swap in
/// an SMS/email gateway behind the same trait.
pub struct LogSink;

impl NotificationSink for LogSink {
    fn complaint_registered(&self, complaint: &ComplaintRecord) -> anyhow::Result<()> {
        log::info!(
            "notify citizen {}: complaint {} registered",
            complaint.citizen_id,
            complaint.public_id
        );
        Ok(())
    }

    fn worker_assigned(&self, complaint: &ComplaintRecord, worker: &WorkerRow) -> anyhow::Result<()> {
        log::info!(
            "notify citizen {}: complaint {} assigned to {}",
            complaint.citizen_id,
            complaint.public_id,
            worker.name
        );
        Ok(())
    }

    fn sla_warning(&self, complaint: &ComplaintRecord, hours_remaining: i64) -> anyhow::Result<()> {
        log::info!(
            "notify staff: complaint {} approaching SLA deadline ({hours_remaining}h remaining)",
            complaint.public_id
        );
        Ok(())
    }

    fn escalated(
        &self,
        complaint: &ComplaintRecord,
        to_officer: &OfficerRow,
        reason: &str,
    ) -> anyhow::Result<()> {
        log::info!(
            "notify officer {}: complaint {} escalated ({reason})",
            to_officer.name,
            complaint.public_id
        );
        Ok(())
    }

    fn overdue(&self, complaint: &ComplaintRecord) -> anyhow::Result<()> {
        log::info!(
            "notify citizen {}: complaint {} passed its SLA deadline and was escalated",
            complaint.citizen_id,
            complaint.public_id
        );
        Ok(())
    }
}

/// Log-and-swallow wrapper around a sink call.
pub(crate) fn best_effort(what: &str, result: anyhow::Result<()>) {
    if let Err(err) = result {
        log::warn!("notification '{what}' failed: {err:#}");
    }
}
