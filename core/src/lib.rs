//! civicroute-core: decision core for municipal complaint routing.
//!
//! Everything between a validated citizen submission and an assigned
//! field worker lives here: geo-semantic duplicate detection, content
//! filtering, department/office sorting, load-balanced assignment, and
//! the SLA escalation sweep. The web layer, auth, and the real image
//! classifier sit outside; they talk to this crate through
//! [`intake::IntakePipeline`], [`escalation::EscalationSweep`], and the
//! [`classifier::ClassifierClient`] / [`notify::NotificationSink`]
//! traits.

pub mod assignment;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod duplicate;
pub mod error;
pub mod escalation;
pub mod filter;
pub mod fingerprint;
pub mod intake;
pub mod notify;
pub mod rng;
pub mod routing;
pub mod seed;
pub mod store;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use types::{CitizenId, ComplaintId, ComplaintStatus, EntityId};
