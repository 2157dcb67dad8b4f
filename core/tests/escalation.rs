//! Escalation sweep tests: breach handling, warning window, dry run.

use chrono::{Duration, TimeZone, Utc};
use civicroute_core::assignment::assign_complaint;
use civicroute_core::clock::FixedClock;
use civicroute_core::escalation::EscalationSweep;
use civicroute_core::notify::LogSink;
use civicroute_core::rng::TieBreakRng;
use civicroute_core::routing::sort_complaint;
use civicroute_core::seed::{seed_demo, DemoDirectory};
use civicroute_core::store::{CivicStore, NewComplaintRow};
use civicroute_core::types::{ComplaintStatus, EntityId};

fn created_at() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

fn setup() -> (CivicStore, DemoDirectory) {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = CivicStore::in_memory().unwrap();
    store.migrate().unwrap();
    let directory = seed_demo(&store, created_at()).unwrap();
    (store, directory)
}

/// File a pothole complaint (12h escalation SLA), route it, and assign a
/// worker, all at `created_at()`.
fn assigned_complaint(store: &CivicStore, dir: &DemoDirectory) -> i64 {
    let serial = store.complaint_count().unwrap() + 1;
    let id = store
        .insert_complaint(&NewComplaintRow {
            public_id: format!("sweep-test-{serial}"),
            citizen_id: 1,
            title: format!("Pothole number {serial}"),
            description: "Deep pothole damaging vehicles on the main road".to_owned(),
            latitude: Some(26.9124),
            longitude: Some(75.7873),
            city: "Jaipur".to_owned(),
            state: "Rajasthan".to_owned(),
            category_id: Some(dir.pothole_category),
            department_id: None,
            smart_hash: format!("POT{serial:04}PWD"),
            created_at: created_at(),
        })
        .unwrap();
    sort_complaint(store, id, created_at()).unwrap();
    let mut rng = TieBreakRng::seeded(11);
    assign_complaint(store, &mut rng, &LogSink, id, created_at()).unwrap();
    id
}

fn officer_of(store: &CivicStore, id: i64) -> Option<EntityId> {
    store.get_complaint(id).unwrap().current_officer_id
}

/// 13 hours after creation a complaint with a 12h escalation SLA is
/// breached: handed to an officer, reset to PENDING, priority bumped,
/// worker cleared, escalation record written.
#[test]
fn breached_complaint_is_escalated() {
    let (store, dir) = setup();
    let id = assigned_complaint(&store, &dir);
    let clock = FixedClock::at(created_at() + Duration::hours(13));

    let report = EscalationSweep::default()
        .run(&store, &clock, &LogSink)
        .unwrap();
    assert_eq!(report.escalated, 1);
    assert_eq!(report.failures, 0);

    let complaint = store.get_complaint(id).unwrap();
    assert_eq!(complaint.status, ComplaintStatus::Pending);
    assert_eq!(complaint.priority, 2, "priority 1 complaints escalate to 2");
    assert_eq!(complaint.current_worker_id, None);
    assert!(!complaint.assigned);
    assert!(complaint.current_officer_id.is_some());
    assert_eq!(store.escalation_count(id).unwrap(), 1);
}

/// 11 hours in (1h remaining, 2h threshold): warning only, and at most
/// one warning per hour however often the sweep runs.
#[test]
fn warning_window_warns_once_per_hour() {
    let (store, dir) = setup();
    let id = assigned_complaint(&store, &dir);
    let clock = FixedClock::at(created_at() + Duration::hours(11));
    let sweep = EscalationSweep::default();

    let first = sweep.run(&store, &clock, &LogSink).unwrap();
    assert_eq!(first.warned, 1);
    assert_eq!(first.escalated, 0);

    clock.advance(Duration::minutes(20));
    let second = sweep.run(&store, &clock, &LogSink).unwrap();
    assert_eq!(second.warned, 0, "warning must not repeat within an hour");

    // Status untouched by warnings.
    assert_eq!(store.get_complaint(id).unwrap().status, ComplaintStatus::Assigned);
    assert_eq!(store.escalation_count(id).unwrap(), 0);
}

/// Well inside the SLA nothing happens at all.
#[test]
fn healthy_complaint_is_left_alone() {
    let (store, dir) = setup();
    let id = assigned_complaint(&store, &dir);
    let clock = FixedClock::at(created_at() + Duration::hours(3));

    let report = EscalationSweep::default()
        .run(&store, &clock, &LogSink)
        .unwrap();
    assert_eq!(report.scanned, 1);
    assert_eq!((report.escalated, report.warned, report.failures), (0, 0, 0));
    assert_eq!(store.get_complaint(id).unwrap().status, ComplaintStatus::Assigned);
}

/// Priority never exceeds the cap however many times escalation fires.
#[test]
fn priority_is_capped_at_five() {
    let (store, dir) = setup();
    let id = assigned_complaint(&store, &dir);
    let clock = FixedClock::at(created_at() + Duration::hours(13));
    let sweep = EscalationSweep::default();

    for _ in 0..6 {
        sweep.run(&store, &clock, &LogSink).unwrap();
    }
    let complaint = store.get_complaint(id).unwrap();
    assert_eq!(complaint.priority, 5, "priority must cap at 5");
}

/// Each escalation prefers a different officer than the current one and
/// the least-loaded candidate.
#[test]
fn escalation_rotates_to_the_least_loaded_officer() {
    let (store, dir) = setup();
    let id = assigned_complaint(&store, &dir);
    let clock = FixedClock::at(created_at() + Duration::hours(13));
    let sweep = EscalationSweep::default();

    sweep.run(&store, &clock, &LogSink).unwrap();
    let first_officer = officer_of(&store, id).unwrap();

    sweep.run(&store, &clock, &LogSink).unwrap();
    let second_officer = officer_of(&store, id).unwrap();
    assert_ne!(
        first_officer, second_officer,
        "re-escalation must pick a different officer"
    );
    assert_eq!(store.escalation_count(id).unwrap(), 2);
}

/// With officer workloads 1 vs 0, the idle officer gets the escalation.
#[test]
fn least_loaded_officer_wins() {
    let (store, dir) = setup();
    let officers = store.officers_in_department(dir.public_works).unwrap();
    assert_eq!(officers.len(), 2);

    // Load the first officer with an active complaint in a category that
    // has no SLA config, so the sweep skips it but the workload counts.
    let fence = store.insert_category("Fence Damage", dir.public_works).unwrap();
    let busy = store
        .insert_complaint(&NewComplaintRow {
            public_id: "busy-1".to_owned(),
            citizen_id: 2,
            title: "Fence broken".to_owned(),
            description: "Boundary fence collapsed onto the walkway".to_owned(),
            latitude: None,
            longitude: None,
            city: "Jaipur".to_owned(),
            state: "Rajasthan".to_owned(),
            category_id: Some(fence),
            department_id: None,
            smart_hash: "FNC0000PWD".to_owned(),
            created_at: created_at(),
        })
        .unwrap();
    sort_complaint(&store, busy, created_at()).unwrap();
    assert!(store
        .escalate_if_active(busy, 2, officers[0].id, created_at())
        .unwrap());

    let id = assigned_complaint(&store, &dir);
    let clock = FixedClock::at(created_at() + Duration::hours(13));
    EscalationSweep::default().run(&store, &clock, &LogSink).unwrap();
    assert_eq!(
        officer_of(&store, id),
        Some(officers[1].id),
        "officer with the smaller active workload must be chosen"
    );
}

/// A department with no officers is a hard failure: counted in the
/// report, complaint untouched.
#[test]
fn missing_officer_is_a_counted_failure() {
    let store = CivicStore::in_memory().unwrap();
    store.migrate().unwrap();
    let dept = store.insert_department("Lone Department").unwrap();
    let category = store.insert_category("Pothole Repair", dept).unwrap();
    store.upsert_sla_config(category, 24, 12).unwrap();
    let office = store
        .insert_office(dept, "Lone Office", "Jaipur", "Rajasthan", true, created_at())
        .unwrap();
    store.insert_worker("Solo Worker", dept, Some(office), true).unwrap();

    let id = store
        .insert_complaint(&NewComplaintRow {
            public_id: "lone-1".to_owned(),
            citizen_id: 1,
            title: "Pothole".to_owned(),
            description: "Deep pothole damaging vehicles on the main road".to_owned(),
            latitude: None,
            longitude: None,
            city: "Jaipur".to_owned(),
            state: "Rajasthan".to_owned(),
            category_id: Some(category),
            department_id: None,
            smart_hash: "POT0000PWD".to_owned(),
            created_at: created_at(),
        })
        .unwrap();
    sort_complaint(&store, id, created_at()).unwrap();
    let mut rng = TieBreakRng::seeded(2);
    assign_complaint(&store, &mut rng, &LogSink, id, created_at()).unwrap();

    let clock = FixedClock::at(created_at() + Duration::hours(13));
    let report = EscalationSweep::default()
        .run(&store, &clock, &LogSink)
        .unwrap();
    assert_eq!(report.failures, 1);
    assert_eq!(report.escalated, 0);
    assert_eq!(store.get_complaint(id).unwrap().status, ComplaintStatus::Assigned);
    assert_eq!(store.escalation_count(id).unwrap(), 0);
}

/// Dry run classifies identically but mutates nothing and records
/// nothing.
#[test]
fn dry_run_counts_without_mutating() {
    let (store, dir) = setup();
    let id = assigned_complaint(&store, &dir);
    let logs_before = store.logs_for_complaint(id).unwrap().len();
    let clock = FixedClock::at(created_at() + Duration::hours(13));

    let sweep = EscalationSweep {
        dry_run: true,
        ..EscalationSweep::default()
    };
    let report = sweep.run(&store, &clock, &LogSink).unwrap();
    assert_eq!(report.escalated, 1, "dry run still reports what it would do");

    let complaint = store.get_complaint(id).unwrap();
    assert_eq!(complaint.status, ComplaintStatus::Assigned);
    assert_eq!(complaint.priority, 1);
    assert_eq!(store.escalation_count(id).unwrap(), 0);
    assert_eq!(store.logs_for_complaint(id).unwrap().len(), logs_before);
}

/// Resolved and completed complaints are invisible to the sweep.
#[test]
fn closed_complaints_are_not_scanned() {
    let (store, dir) = setup();
    let id = assigned_complaint(&store, &dir);
    store
        .set_status(id, ComplaintStatus::Resolved, created_at() + Duration::hours(1))
        .unwrap();
    let clock = FixedClock::at(created_at() + Duration::hours(13));

    let report = EscalationSweep::default()
        .run(&store, &clock, &LogSink)
        .unwrap();
    assert_eq!(report.scanned, 0);
    assert_eq!(report.escalated, 0);
}
