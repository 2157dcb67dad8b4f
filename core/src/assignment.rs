//! Load-balanced worker assignment.
//!
//! Picks the least-loaded active worker of the complaint's office,
//! breaking ties uniformly at random, and stamps the SLA deadline in the
//! same write. The workload read and the assignment write are expected to
//! run inside one `with_tx` scope so concurrent intakes cannot both pick
//! the same least-loaded worker.

use crate::config::DEFAULT_RESOLUTION_HOURS;
use crate::error::CoreResult;
use crate::notify::{best_effort, NotificationSink};
use crate::rng::TieBreakRng;
use crate::store::{action, CivicStore, ComplaintRecord};
use crate::types::{ComplaintId, ComplaintStatus, EntityId};
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, PartialEq, Eq)]
pub enum AssignmentOutcome {
    Assigned {
        worker_id: EntityId,
        sla_hours: i64,
        sla_deadline: DateTime<Utc>,
        pool_size: usize,
    },
    /// Sorting found no office for this city; left for manual assignment.
    NoOffice,
    /// Office exists but has no active workers right now.
    NoActiveWorker,
    /// The complaint left PENDING between the read and the write.
    NotPending,
}

/// Deadline ladder: category SLA config wins; a classifier estimate is
/// used only when it actually says something (not the 48h default); then
/// the global default.
fn resolution_hours(store: &CivicStore, complaint: &ComplaintRecord) -> CoreResult<i64> {
    if let Some(category_id) = complaint.category_id {
        if let Some(cfg) = store.sla_for_category(category_id)? {
            return Ok(cfg.resolution_hours);
        }
    }
    if let Some(hours) = complaint.ai_sla_hours {
        if hours != DEFAULT_RESOLUTION_HOURS {
            return Ok(hours);
        }
    }
    Ok(DEFAULT_RESOLUTION_HOURS)
}

pub fn assign_complaint(
    store: &CivicStore,
    rng: &mut TieBreakRng,
    sink: &dyn NotificationSink,
    id: ComplaintId,
    now: DateTime<Utc>,
) -> CoreResult<AssignmentOutcome> {
    let complaint = store.get_complaint(id)?;
    if complaint.status != ComplaintStatus::Pending {
        return Ok(AssignmentOutcome::NotPending);
    }

    let Some(office_id) = complaint.office_id else {
        log::info!("complaint {id}: no office resolved, awaiting manual assignment");
        return Ok(AssignmentOutcome::NoOffice);
    };

    let workers = store.active_workers_in_office(office_id)?;
    if workers.is_empty() {
        log::warn!("complaint {id}: office {office_id} has no active workers");
        return Ok(AssignmentOutcome::NoActiveWorker);
    }

    let mut loads = Vec::with_capacity(workers.len());
    for worker in &workers {
        loads.push((worker, store.worker_workload(worker.id)?));
    }
    // min is safe: workers is non-empty.
    let min_load = loads.iter().map(|(_, load)| *load).min().unwrap_or(0);
    let pool: Vec<_> = loads
        .iter()
        .filter(|(_, load)| *load == min_load)
        .collect();
    let (worker, workload) = **rng.pick(&pool);

    let sla_hours = resolution_hours(store, &complaint)?;
    let sla_deadline = now + Duration::hours(sla_hours);

    if !store.assign_worker(id, worker.id, sla_deadline, now)? {
        return Ok(AssignmentOutcome::NotPending);
    }

    store.append_log(
        id,
        None,
        action::ASSIGNMENT,
        &format!(
            "assigned to worker '{}' (workload {workload}, pool of {}, SLA {sla_hours}h)",
            worker.name,
            pool.len(),
        ),
        Some(complaint.status),
        Some(ComplaintStatus::Assigned),
        now,
    )?;

    let updated = store.get_complaint(id)?;
    best_effort("worker_assigned", sink.worker_assigned(&updated, worker));

    Ok(AssignmentOutcome::Assigned {
        worker_id: worker.id,
        sla_hours,
        sla_deadline,
        pool_size: pool.len(),
    })
}
