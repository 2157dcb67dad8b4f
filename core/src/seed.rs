//! Directory seeding.
//!
//! Loads a working directory (departments, categories, offices, staff)
//! plus per-category SLA configs. Used by the sweep runner's `--seed`
//! flag and by integration tests that need a realistic directory without
//! hand-inserting every row.

use crate::error::CoreResult;
use crate::store::CivicStore;
use crate::types::EntityId;
use chrono::{DateTime, Utc};

/// Keyword-matched SLA defaults in hours (resolution, escalation).
/// Matched by substring against the lowercased category name, first hit
/// wins; unmatched categories get the trailing default.
const SLA_DEFAULTS: &[(&str, i64, i64)] = &[
    ("pothole", 24, 12),
    ("streetlight", 48, 24),
    ("water", 24, 12),
    ("electricity", 24, 12),
    ("traffic", 48, 24),
    ("garbage", 48, 24),
    ("sanitation", 72, 36),
    ("drainage", 72, 36),
    ("park", 120, 72),
    ("building", 120, 72),
];

const FALLBACK_RESOLUTION_HOURS: i64 = 72;
const FALLBACK_ESCALATION_HOURS: i64 = 48;

/// Pick SLA hours for a category by name.
pub fn sla_hours_for_category(name: &str) -> (i64, i64) {
    let lower = name.to_lowercase();
    for (keyword, resolution, escalation) in SLA_DEFAULTS {
        if lower.contains(keyword) {
            return (*resolution, *escalation);
        }
    }
    (FALLBACK_RESOLUTION_HOURS, FALLBACK_ESCALATION_HOURS)
}

/// Ids of the demo directory, for callers that submit against it.
pub struct DemoDirectory {
    pub public_works: EntityId,
    pub water_supply: EntityId,
    pub waste_management: EntityId,
    pub pothole_category: EntityId,
    pub water_leak_category: EntityId,
    pub garbage_category: EntityId,
    pub jaipur_pwd_office: EntityId,
}

/// Seed a small but complete municipal directory: three departments with
/// one category each, city offices, two workers and two officers per
/// office, and SLA configs derived from the category names.
pub fn seed_demo(store: &CivicStore, now: DateTime<Utc>) -> CoreResult<DemoDirectory> {
    let public_works = store.insert_department("Public Works Department")?;
    let water_supply = store.insert_department("Water Supply and Sewerage")?;
    let waste_management = store.insert_department("Solid Waste Management")?;

    let pothole_category = store.insert_category("Pothole Repair", public_works)?;
    let water_leak_category = store.insert_category("Water Pipeline Leakage", water_supply)?;
    let garbage_category = store.insert_category("Garbage Collection", waste_management)?;

    for category in [
        (pothole_category, "Pothole Repair"),
        (water_leak_category, "Water Pipeline Leakage"),
        (garbage_category, "Garbage Collection"),
    ] {
        let (resolution, escalation) = sla_hours_for_category(category.1);
        store.upsert_sla_config(category.0, resolution, escalation)?;
    }

    let jaipur_pwd_office =
        store.insert_office(public_works, "PWD Jaipur Zone Office", "Jaipur", "Rajasthan", true, now)?;
    let jaipur_water_office = store.insert_office(
        water_supply,
        "WSS Jaipur Division",
        "Jaipur",
        "Rajasthan",
        true,
        now,
    )?;
    let jaipur_swm_office = store.insert_office(
        waste_management,
        "SWM Jaipur Collection Centre",
        "Jaipur",
        "Rajasthan",
        true,
        now,
    )?;

    for (department, office, names) in [
        (public_works, jaipur_pwd_office, ["Ramesh Yadav", "Sita Kumari"]),
        (water_supply, jaipur_water_office, ["Arjun Singh", "Meena Sharma"]),
        (waste_management, jaipur_swm_office, ["Vikram Patel", "Asha Devi"]),
    ] {
        for name in names {
            store.insert_worker(name, department, Some(office), true)?;
        }
    }

    for (department, names) in [
        (public_works, ["Officer Rathore", "Officer Jain"]),
        (water_supply, ["Officer Gupta", "Officer Bano"]),
        (waste_management, ["Officer Saini", "Officer Khan"]),
    ] {
        for name in names {
            store.insert_officer(name, department)?;
        }
    }

    log::info!("seeded demo directory: 3 departments, 3 offices, 6 workers, 6 officers");
    Ok(DemoDirectory {
        public_works,
        water_supply,
        waste_management,
        pothole_category,
        water_leak_category,
        garbage_category,
        jaipur_pwd_office,
    })
}
