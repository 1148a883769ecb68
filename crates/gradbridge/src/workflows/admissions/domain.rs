use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::{CourseId, DocumentRef, FacultyId, InstituteId, StudentId};

/// Identifier wrapper for course applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Lifecycle state of a course application.
///
/// `rejected` and `confirmed` are terminal. `waiting` is assigned by an
/// institution placing an over-subscribed applicant on its waitlist; the
/// engine only ever promotes it back to `admitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Admitted,
    Rejected,
    Waiting,
    Confirmed,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Admitted => "admitted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Waiting => "waiting",
            ApplicationStatus::Confirmed => "confirmed",
        }
    }
}

/// Who is driving a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionActor {
    /// Institution staff triaging their own applicant pool.
    Institution,
    /// The placement coordinator acting on a student's institution choice.
    Placement,
}

impl TransitionActor {
    /// Legal transition table, split by who may request the change.
    pub const fn permits(self, from: ApplicationStatus, to: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        match self {
            TransitionActor::Institution => matches!(
                (from, to),
                (Pending, Admitted) | (Pending, Rejected) | (Pending, Waiting)
            ),
            TransitionActor::Placement => matches!(
                (from, to),
                (Admitted, Confirmed) | (Admitted, Rejected) | (Waiting, Admitted)
            ),
        }
    }
}

/// Intake payload for a student applying to a course. The institute and
/// faculty are resolved from the course record, never trusted from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub student_id: StudentId,
    pub course_id: CourseId,
    #[serde(default)]
    pub personal_statement: Option<String>,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
}

/// Authoritative record of one student's application to one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseApplication {
    pub id: ApplicationId,
    pub student_id: StudentId,
    pub institute_id: InstituteId,
    pub faculty_id: FacultyId,
    pub course_id: CourseId,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub personal_statement: Option<String>,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
    /// Reason attached by the last decision, e.g. why an offer was released.
    #[serde(default)]
    pub decision_note: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CourseApplication {
    pub fn view(&self) -> ApplicationView {
        ApplicationView {
            application_id: self.id.clone(),
            student_id: self.student_id.clone(),
            institute_id: self.institute_id.clone(),
            faculty_id: self.faculty_id.clone(),
            course_id: self.course_id.clone(),
            status: self.status.label(),
            decision_note: self.decision_note.clone(),
            applied_at: self.applied_at,
            updated_at: self.updated_at,
        }
    }
}

/// Wire view of an application for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub application_id: ApplicationId,
    pub student_id: StudentId,
    pub institute_id: InstituteId,
    pub faculty_id: FacultyId,
    pub course_id: CourseId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_note: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
