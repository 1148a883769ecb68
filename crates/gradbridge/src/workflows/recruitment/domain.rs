use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::{deserialize_grade, CompanyId, StudentId};

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Identifier wrapper for job applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobApplicationId(pub String);

/// Qualification bar a company attaches to a posting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRequirements {
    #[serde(default, deserialize_with = "deserialize_grade")]
    pub minimum_grade: Option<f32>,
    #[serde(default)]
    pub required_subjects: BTreeSet<String>,
    #[serde(default)]
    pub work_experience: bool,
}

/// Intake payload for a company posting a job.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobPostingDraft {
    pub company_id: CompanyId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: JobRequirements,
}

/// A published job posting. Requirements are fixed for scoring once posted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    pub company_id: CompanyId,
    pub title: String,
    pub description: String,
    pub requirements: JobRequirements,
    pub posted_at: DateTime<Utc>,
}

/// Lifecycle state of a job application. `rejected` and `hired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobApplicationStatus {
    Pending,
    ReadyForInterview,
    Rejected,
    Accepted,
    Hired,
}

impl JobApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobApplicationStatus::Pending => "pending",
            JobApplicationStatus::ReadyForInterview => "ready_for_interview",
            JobApplicationStatus::Rejected => "rejected",
            JobApplicationStatus::Accepted => "accepted",
            JobApplicationStatus::Hired => "hired",
        }
    }

    /// Legal transition table for company review decisions.
    pub const fn permits(self, to: Self) -> bool {
        use JobApplicationStatus::*;
        matches!(
            (self, to),
            (Pending, ReadyForInterview)
                | (Pending, Rejected)
                | (ReadyForInterview, Accepted)
                | (ReadyForInterview, Rejected)
                | (Accepted, Hired)
        )
    }
}

/// One student's application to one job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: JobApplicationId,
    pub student_id: StudentId,
    pub job_id: JobId,
    pub status: JobApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

impl JobApplication {
    pub fn view(&self) -> JobApplicationView {
        JobApplicationView {
            application_id: self.id.clone(),
            student_id: self.student_id.clone(),
            job_id: self.job_id.clone(),
            status: self.status.label(),
            applied_at: self.applied_at,
        }
    }
}

/// Wire view of a job application for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct JobApplicationView {
    pub application_id: JobApplicationId,
    pub student_id: StudentId,
    pub job_id: JobId,
    pub status: &'static str,
    pub applied_at: DateTime<Utc>,
}
