//! Company recruitment: job postings, qualification scoring, applicant
//! ranking, and notification fan-out to the student roster.

pub mod domain;
pub mod fanout;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    JobApplication, JobApplicationId, JobApplicationStatus, JobApplicationView, JobId, JobPosting,
    JobPostingDraft, JobRequirements,
};
pub use fanout::NotificationPlan;
pub use repository::{BoardError, JobBoard};
pub use router::recruitment_router;
pub use scoring::{QualificationScore, QUALIFIED_THRESHOLD};
pub use service::{RankedApplicant, RecruitmentError, RecruitmentService};
