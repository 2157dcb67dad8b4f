//! SLA escalation sweep.
//!
//! Cron-invoked pass over every open complaint with an SLA config. A
//! complaint past its escalation deadline is handed to a senior officer
//! and reset to PENDING for reassignment; one inside the warning window
//! gets at most one warning per hour. `dry_run` classifies identically
//! but writes and notifies nothing.

use crate::clock::Clock;
use crate::config::{DEFAULT_WARNING_THRESHOLD_HOURS, MAX_PRIORITY};
use crate::error::CoreResult;
use crate::notify::{best_effort, NotificationSink};
use crate::store::{action, CivicStore, ComplaintRecord, OfficerRow, SlaConfigRow};
use crate::types::{ComplaintStatus, EntityId};
use chrono::{DateTime, Duration, Utc};

pub struct EscalationSweep {
    pub dry_run: bool,
    pub warning_threshold_hours: i64,
}

impl Default for EscalationSweep {
    fn default() -> Self {
        Self {
            dry_run: false,
            warning_threshold_hours: DEFAULT_WARNING_THRESHOLD_HOURS,
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub escalated: usize,
    pub warned: usize,
    /// Breached complaints that could not be escalated (no officer in the
    /// department). These need operator attention.
    pub failures: usize,
}

/// Same department, excluding the current supervisor, fewest active
/// complaints first; falls back to any officer in the department when the
/// current one is the only one. Ties break on lowest id via scan order.
fn find_senior_officer(
    store: &CivicStore,
    department_id: EntityId,
    exclude: Option<EntityId>,
) -> CoreResult<Option<OfficerRow>> {
    let all = store.officers_in_department(department_id)?;
    let pool: Vec<&OfficerRow> = {
        let others: Vec<&OfficerRow> = all.iter().filter(|o| Some(o.id) != exclude).collect();
        if others.is_empty() {
            all.iter().collect()
        } else {
            others
        }
    };

    let mut best: Option<(&OfficerRow, i64)> = None;
    for officer in pool {
        let load = store.officer_workload(officer.id)?;
        let better = match best {
            None => true,
            Some((_, best_load)) => load < best_load,
        };
        if better {
            best = Some((officer, load));
        }
    }
    Ok(best.map(|(officer, _)| officer.clone()))
}

fn escalation_reason(store: &CivicStore, complaint: &ComplaintRecord, sla: &SlaConfigRow) -> CoreResult<String> {
    let mut reason = format!(
        "Auto-escalation: SLA breach. Complaint not resolved within {} hours. ",
        sla.escalation_hours
    );
    if let Some(worker_id) = complaint.current_worker_id {
        if let Some(worker) = store.get_worker(worker_id)? {
            reason.push_str(&format!("Previously assigned to worker: {}. ", worker.name));
        }
    }
    match complaint.current_officer_id {
        Some(officer_id) => {
            if let Some(officer) = store.get_officer(officer_id)? {
                reason.push_str(&format!("Supervised by: {}.", officer.name));
            }
        }
        None => reason.push_str("No officer was previously assigned."),
    }
    Ok(reason)
}

impl EscalationSweep {
    fn escalate(
        &self,
        store: &CivicStore,
        sink: &dyn NotificationSink,
        complaint: &ComplaintRecord,
        sla: &SlaConfigRow,
        now: DateTime<Utc>,
        report: &mut SweepReport,
    ) -> CoreResult<()> {
        if self.dry_run {
            log::info!("[dry run] would escalate complaint {}", complaint.id);
            report.escalated += 1;
            return Ok(());
        }

        let Some(department_id) = complaint.department_id else {
            log::error!("complaint {}: SLA breached but no department resolved", complaint.id);
            report.failures += 1;
            return Ok(());
        };
        let Some(officer) =
            find_senior_officer(store, department_id, complaint.current_officer_id)?
        else {
            log::error!(
                "complaint {}: no officer in department {department_id} to escalate to",
                complaint.id
            );
            report.failures += 1;
            return Ok(());
        };

        let new_priority = (complaint.priority + 1).min(MAX_PRIORITY);
        let reason = escalation_reason(store, complaint, sla)?;

        let escalated = store.with_tx(|tx| {
            // Optimistic guard: zero rows updated means a concurrent sweep
            // already moved this complaint.
            if !tx.escalate_if_active(complaint.id, new_priority, officer.id, now)? {
                return Ok(false);
            }
            tx.insert_escalation(
                complaint.id,
                complaint.current_officer_id,
                officer.id,
                &reason,
                now,
            )?;
            tx.append_log(
                complaint.id,
                None,
                action::ESCALATION,
                &reason,
                Some(complaint.status),
                Some(ComplaintStatus::Pending),
                now,
            )?;
            Ok(true)
        })?;

        if !escalated {
            log::debug!("complaint {}: escalation lost the race, skipping", complaint.id);
            return Ok(());
        }

        best_effort("escalated", sink.escalated(complaint, &officer, &reason));
        best_effort("overdue", sink.overdue(complaint));
        report.escalated += 1;
        log::info!("complaint {} escalated to officer '{}'", complaint.id, officer.name);
        Ok(())
    }

    fn warn(
        &self,
        store: &CivicStore,
        sink: &dyn NotificationSink,
        complaint: &ComplaintRecord,
        hours_until_deadline: f64,
        now: DateTime<Utc>,
        report: &mut SweepReport,
    ) -> CoreResult<()> {
        if self.dry_run {
            log::info!("[dry run] would warn on complaint {}", complaint.id);
            report.warned += 1;
            return Ok(());
        }

        // At most one warning per hour per complaint.
        if store.warning_logged_since(complaint.id, now - Duration::hours(1))? {
            return Ok(());
        }

        store.append_log(
            complaint.id,
            None,
            action::SLA_WARNING,
            &format!(
                "SLA warning sent: {hours_until_deadline:.1} hours remaining until escalation"
            ),
            Some(complaint.status),
            Some(complaint.status),
            now,
        )?;
        best_effort(
            "sla_warning",
            sink.sla_warning(complaint, hours_until_deadline as i64),
        );
        report.warned += 1;
        Ok(())
    }

    /// Run one sweep over all open complaints.
    pub fn run(
        &self,
        store: &CivicStore,
        clock: &dyn Clock,
        sink: &dyn NotificationSink,
    ) -> CoreResult<SweepReport> {
        let now = clock.now();
        let mut report = SweepReport::default();

        for complaint in store.sweep_candidates()? {
            let Some(category_id) = complaint.category_id else {
                continue;
            };
            let Some(sla) = store.sla_for_category(category_id)? else {
                continue;
            };
            report.scanned += 1;

            let deadline = complaint.created_at + Duration::hours(sla.escalation_hours);
            let warning_time = deadline - Duration::hours(self.warning_threshold_hours);
            let hours_until_deadline = (deadline - now).num_seconds() as f64 / 3600.0;

            if now >= deadline {
                log::warn!(
                    "complaint {} exceeded its SLA deadline ({}h)",
                    complaint.id,
                    sla.escalation_hours
                );
                self.escalate(store, sink, &complaint, &sla, now, &mut report)?;
            } else if now >= warning_time && hours_until_deadline > 0.0 {
                self.warn(store, sink, &complaint, hours_until_deadline, now, &mut report)?;
            }
        }

        log::info!(
            "sweep complete: scanned {}, escalated {}, warned {}, failures {}",
            report.scanned,
            report.escalated,
            report.warned,
            report.failures
        );
        Ok(report)
    }
}
