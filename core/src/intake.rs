//! Submission pipeline.
//!
//! Wires the full decision chain for one citizen submission: content
//! filter, duplicate check, complaint creation, advisory classifier,
//! department/office sorting, worker assignment. The whole chain runs
//! inside one `BEGIN IMMEDIATE` transaction so two near-simultaneous
//! submissions of the same issue cannot both create a complaint.

use crate::assignment::{assign_complaint, AssignmentOutcome};
use crate::classifier::{classify_or_default, ClassifierClient};
use crate::clock::Clock;
use crate::config::FingerprintConfig;
use crate::duplicate::{self, DuplicateDecision};
use crate::error::CoreResult;
use crate::filter::ContentFilter;
use crate::notify::{best_effort, NotificationSink};
use crate::rng::TieBreakRng;
use crate::routing::sort_complaint;
use crate::store::{action, CivicStore, NewComplaintRow};
use crate::types::{CitizenId, ComplaintId, ComplaintStatus, EntityId};
use uuid::Uuid;

/// One citizen submission, as handed over by the (excluded) web layer.
#[derive(Debug, Clone)]
pub struct Submission {
    pub citizen_id: CitizenId,
    pub title: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: String,
    pub state: String,
    pub category_id: Option<EntityId>,
    pub department_id: Option<EntityId>,
    /// Reference to the uploaded photo, passed through to the classifier.
    pub image_ref: Option<String>,
}

#[derive(Debug)]
pub enum IntakeOutcome {
    /// A new complaint was created and routed.
    Created {
        id: ComplaintId,
        public_id: String,
        fingerprint: String,
        assignment: AssignmentOutcome,
    },
    /// The content filter declined the submission; the complaint row is
    /// kept for audit with the reason persisted.
    Declined {
        id: ComplaintId,
        reason: String,
        is_spam: bool,
    },
    /// The same citizen already has this issue open.
    AlreadyReported { original_id: ComplaintId },
    /// Someone else already reported it; this submission became a vote.
    Upvoted {
        original_id: ComplaintId,
        vote_counted: bool,
    },
}

pub struct IntakePipeline<'a> {
    store: &'a CivicStore,
    clock: &'a dyn Clock,
    sink: &'a dyn NotificationSink,
    classifier: Option<&'a dyn ClassifierClient>,
    config: FingerprintConfig,
    filter: ContentFilter,
    rng: TieBreakRng,
}

impl<'a> IntakePipeline<'a> {
    pub fn new(
        store: &'a CivicStore,
        clock: &'a dyn Clock,
        sink: &'a dyn NotificationSink,
        classifier: Option<&'a dyn ClassifierClient>,
        rng: TieBreakRng,
    ) -> Self {
        Self {
            store,
            clock,
            sink,
            classifier,
            config: FingerprintConfig::default(),
            filter: ContentFilter::new(),
            rng,
        }
    }

    pub fn with_config(mut self, config: FingerprintConfig) -> Self {
        self.config = config;
        self
    }

    /// Department name used for the fingerprint: explicit department
    /// first, then the category's department, then empty.
    fn department_hint(&self, submission: &Submission) -> CoreResult<String> {
        let mut department_id = submission.department_id;
        if department_id.is_none() {
            if let Some(category_id) = submission.category_id {
                department_id = self.store.category_department(category_id)?;
            }
        }
        match department_id {
            Some(id) => Ok(self.store.department_name(id)?.unwrap_or_default()),
            None => Ok(String::new()),
        }
    }

    /// Process one submission end to end.
    pub fn submit(&mut self, submission: Submission) -> CoreResult<IntakeOutcome> {
        let now = self.clock.now();
        let department_hint = self.department_hint(&submission)?;
        let category_name = match submission.category_id {
            Some(id) => self.store.category_name(id)?,
            None => None,
        };

        let store = self.store;
        let sink = self.sink;
        let config = &self.config;
        let filter = &self.filter;
        let classifier = self.classifier;
        let rng = &mut self.rng;

        // Content filter first: a spam or off-category submission must
        // never upvote a legitimate complaint.
        let outcome = filter.validate(&submission.description, category_name.as_deref());

        store.with_tx(|tx| {
            let check = duplicate::check(
                tx,
                config,
                submission.citizen_id,
                &submission.title,
                submission.latitude,
                submission.longitude,
                &department_hint,
            )?;
            if outcome.passed {
                match check.decision {
                    DuplicateDecision::AlreadyReported { original } => {
                        log::info!(
                            "citizen {} re-reported complaint {}",
                            submission.citizen_id,
                            original.id
                        );
                        return Ok(IntakeOutcome::AlreadyReported {
                            original_id: original.id,
                        });
                    }
                    DuplicateDecision::Upvote { original } => {
                        let vote_counted =
                            duplicate::record_upvote(tx, &original, submission.citizen_id, now)?;
                        return Ok(IntakeOutcome::Upvoted {
                            original_id: original.id,
                            vote_counted,
                        });
                    }
                    DuplicateDecision::NewComplaint => {}
                }
            }

            let public_id = Uuid::new_v4().to_string();
            let id = tx.insert_complaint(&NewComplaintRow {
                public_id: public_id.clone(),
                citizen_id: submission.citizen_id,
                title: submission.title.clone(),
                description: submission.description.clone(),
                latitude: submission.latitude,
                longitude: submission.longitude,
                city: submission.city.clone(),
                state: submission.state.clone(),
                category_id: submission.category_id,
                department_id: submission.department_id,
                smart_hash: check.fingerprint.clone(),
                created_at: now,
            })?;
            tx.append_log(
                id,
                Some(submission.citizen_id),
                action::INTAKE,
                &format!("complaint registered with fingerprint {}", check.fingerprint),
                None,
                Some(ComplaintStatus::Submitted),
                now,
            )?;

            // Declines are terminal but the row stays for audit.
            let next_status = if outcome.passed {
                ComplaintStatus::Filtering
            } else {
                ComplaintStatus::Declined
            };
            tx.record_filter_result(
                id,
                outcome.passed,
                &outcome.reason,
                outcome.is_spam,
                next_status,
                now,
            )?;
            tx.append_log(
                id,
                None,
                action::FILTER,
                &outcome.reason,
                Some(ComplaintStatus::Submitted),
                Some(next_status),
                now,
            )?;
            if !outcome.passed {
                return Ok(IntakeOutcome::Declined {
                    id,
                    reason: outcome.reason.clone(),
                    is_spam: outcome.is_spam,
                });
            }

            // Advisory severity verdict. Absent classifier leaves the
            // verdict columns NULL and the defaults in force.
            if let Some(client) = classifier {
                let image_ref = submission.image_ref.as_deref().unwrap_or_default();
                let verdict = classify_or_default(client, image_ref, &submission.description);
                tx.record_classifier_verdict(
                    id,
                    verdict.genuine,
                    verdict.sla_hours,
                    verdict.priority,
                    verdict.emergency,
                    now,
                )?;
                tx.append_log(
                    id,
                    None,
                    action::CLASSIFIER,
                    &format!(
                        "classifier verdict: genuine={}, sla={}h, priority={}, emergency={}",
                        verdict.genuine, verdict.sla_hours, verdict.priority, verdict.emergency
                    ),
                    Some(next_status),
                    Some(next_status),
                    now,
                )?;
            }

            let routing = sort_complaint(tx, id, now)?;
            let assignment = if routing.success {
                assign_complaint(tx, rng, sink, id, now)?
            } else {
                AssignmentOutcome::NotPending
            };

            let created = tx.get_complaint(id)?;
            best_effort("complaint_registered", sink.complaint_registered(&created));

            Ok(IntakeOutcome::Created {
                id,
                public_id,
                fingerprint: check.fingerprint,
                assignment,
            })
        })
    }
}
