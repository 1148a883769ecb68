//! Course admissions: eligibility screening, the application state machine,
//! and waitlist placement when a student confirms an institution.

pub mod domain;
pub mod eligibility;
mod placement;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationId, ApplicationStatus, ApplicationSubmission, ApplicationView, CourseApplication,
    TransitionActor,
};
pub use eligibility::{EligibilityError, EligibilityReport, INSTITUTE_APPLICATION_LIMIT};
pub use placement::RELEASED_NOTE;
pub use repository::{ApplicationStore, ApplicationWrite, StoreError, WriteBatch, WriteGuard};
pub use router::admission_router;
pub use service::{AdmissionError, AdmissionService, SelectionOutcome};
