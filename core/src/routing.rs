//! Department and office resolution (the sorting step).
//!
//! Runs after the content filter has cleared a complaint. Pins the
//! responsible department, then the serving office for the complaint's
//! city. Re-running on an already sorted complaint leaves its status
//! alone and only refreshes the office link if it changed.

use crate::error::CoreResult;
use crate::store::{action, CivicStore};
use crate::types::{ComplaintId, EntityId};
use chrono::{DateTime, Utc};

#[derive(Debug)]
pub struct RoutingOutcome {
    pub success: bool,
    pub department_id: Option<EntityId>,
    pub office_id: Option<EntityId>,
    pub reason: String,
}

/// Route a complaint to its department and city office.
///
/// Department resolution priority: the explicit department on the
/// complaint first, then the department of its category. Neither present
/// is a terminal soft failure left for manual review.
///
/// Office lookup is case-insensitive on city. No active office means the
/// complaint still lands at the department, flagged for manual
/// assignment; several mean the earliest-created one wins.
pub fn sort_complaint(
    store: &CivicStore,
    id: ComplaintId,
    now: DateTime<Utc>,
) -> CoreResult<RoutingOutcome> {
    let complaint = store.get_complaint(id)?;
    let old_status = complaint.status;

    let mut department_id = complaint.department_id;
    if department_id.is_none() {
        if let Some(category_id) = complaint.category_id {
            department_id = store.category_department(category_id)?;
        }
    }

    let Some(department_id) = department_id else {
        let reason =
            "Sorting failed: no department associated with this complaint. Manual review required."
                .to_owned();
        store.append_log(
            id,
            None,
            action::SORTING,
            &reason,
            Some(old_status),
            Some(old_status),
            now,
        )?;
        return Ok(RoutingOutcome {
            success: false,
            department_id: None,
            office_id: None,
            reason,
        });
    };

    let department_name = store
        .department_name(department_id)?
        .unwrap_or_else(|| format!("#{department_id}"));

    let offices = store.active_offices(department_id, &complaint.city)?;
    let office = offices.first();
    let office_id = office.map(|o| o.id);

    // A complaint that already went through sorting keeps its status
    // (it may be ASSIGNED or further along); only a changed office is
    // written back.
    if complaint.sorted {
        let reason = if office_id == complaint.office_id {
            format!("Already sorted to department '{department_name}'. Office unchanged.")
        } else {
            store.set_office(id, office_id, now)?;
            let note = match office {
                Some(o) => format!("Re-sorted: office updated to '{}'.", o.name),
                None => "Re-sorted: no active office for this city, office cleared.".to_owned(),
            };
            store.append_log(
                id,
                None,
                action::SORTING,
                &note,
                Some(old_status),
                Some(old_status),
                now,
            )?;
            note
        };
        return Ok(RoutingOutcome {
            success: true,
            department_id: Some(department_id),
            office_id,
            reason,
        });
    }

    store.set_department_sorting(id, department_id, now)?;
    store.set_office_pending(id, office_id, now)?;

    let office_info = match office {
        Some(o) => format!(", office '{}'", o.name),
        None => " (no matching office registered for this city)".to_owned(),
    };
    let reason = format!(
        "Automatically sorted to department '{department_name}'{office_info}. \
         Status updated to Pending Assignment."
    );

    let updated = store.get_complaint(id)?;
    store.append_log(
        id,
        None,
        action::SORTING,
        &reason,
        Some(old_status),
        Some(updated.status),
        now,
    )?;

    Ok(RoutingOutcome {
        success: true,
        department_id: Some(department_id),
        office_id,
        reason,
    })
}
