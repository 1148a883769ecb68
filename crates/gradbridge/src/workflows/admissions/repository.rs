use std::fmt;

use chrono::{DateTime, Utc};

use super::domain::{ApplicationId, ApplicationStatus, CourseApplication};
use crate::directory::{CourseId, InstituteId, StudentId};

/// Cross-record precondition evaluated inside the store's critical section.
///
/// Guards restate the record-shaped eligibility rules so they hold at write
/// time even when two submissions race between read and commit.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteGuard {
    /// The application must still be in `expected` when the batch lands.
    StatusIs {
        id: ApplicationId,
        expected: ApplicationStatus,
    },
    /// Fewer than `limit` applications exist for the student at the institution.
    MaxApplications {
        student: StudentId,
        institute: InstituteId,
        limit: usize,
    },
    /// No admitted application exists for the student at the institution.
    NoAdmittedApplication {
        student: StudentId,
        institute: InstituteId,
    },
    /// The student has no application for the course yet.
    NoCourseApplication {
        student: StudentId,
        course: CourseId,
    },
    /// No admitted or confirmed application other than `except` exists for
    /// the student at the institution.
    NoCompetingAdmission {
        student: StudentId,
        institute: InstituteId,
        except: ApplicationId,
    },
}

impl fmt::Display for WriteGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteGuard::StatusIs { id, expected } => {
                write!(f, "application {} is not {}", id.0, expected.label())
            }
            WriteGuard::MaxApplications {
                student,
                institute,
                limit,
            } => write!(
                f,
                "student {} already holds {} applications at institution {}",
                student.0, limit, institute.0
            ),
            WriteGuard::NoAdmittedApplication { student, institute } => write!(
                f,
                "student {} is already admitted at institution {}",
                student.0, institute.0
            ),
            WriteGuard::NoCourseApplication { student, course } => write!(
                f,
                "student {} already applied to course {}",
                student.0, course.0
            ),
            WriteGuard::NoCompetingAdmission {
                student, institute, ..
            } => write!(
                f,
                "student {} holds a competing admission at institution {}",
                student.0, institute.0
            ),
        }
    }
}

/// A single mutation inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplicationWrite {
    Insert(CourseApplication),
    SetStatus {
        id: ApplicationId,
        to: ApplicationStatus,
        note: Option<String>,
        updated_at: DateTime<Utc>,
    },
}

/// Guarded multi-record write. The store applies every write or none, and
/// only after every guard holds.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    pub guards: Vec<WriteGuard>,
    pub writes: Vec<ApplicationWrite>,
}

/// Persistence seam for course applications and their institution mirrors.
#[async_trait::async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn fetch(&self, id: &ApplicationId) -> Result<Option<CourseApplication>, StoreError>;
    async fn for_student(&self, student: &StudentId)
        -> Result<Vec<CourseApplication>, StoreError>;
    /// Oldest `waiting` application at the institution by `applied_at`, if any.
    async fn earliest_waiting(
        &self,
        institute: &InstituteId,
    ) -> Result<Option<CourseApplication>, StoreError>;
    /// Applies every write in the batch, or none of them. Guards are
    /// evaluated against current state inside the same critical section.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
    /// Upserts the institution-namespace copy of the application.
    async fn sync_mirror(&self, application: &CourseApplication) -> Result<(), StoreError>;
    async fn institution_mirror(
        &self,
        institute: &InstituteId,
    ) -> Result<Vec<CourseApplication>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("application not found")]
    NotFound,
    #[error("precondition failed: {0}")]
    Precondition(WriteGuard),
    #[error("application already exists")]
    Duplicate,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
