use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use super::domain::{
    ApplicationId, ApplicationStatus, ApplicationSubmission, CourseApplication, TransitionActor,
};
use super::eligibility::{self, EligibilityError, EligibilityReport, INSTITUTE_APPLICATION_LIMIT};
use super::placement::{plan_selection, RELEASED_NOTE};
use super::repository::{ApplicationStore, ApplicationWrite, StoreError, WriteBatch, WriteGuard};
use crate::directory::{CampusDirectory, CourseId, DirectoryError, InstituteId, StudentId};
use crate::notify::{Notification, NotificationKind, NotificationSink};

/// Service composing eligibility screening, the application state machine,
/// and waitlist placement over the campus directory and application store.
pub struct AdmissionService<S, D, N> {
    store: Arc<S>,
    directory: Arc<D>,
    notifications: Arc<N>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

impl<S, D, N> AdmissionService<S, D, N>
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(store: Arc<S>, directory: Arc<D>, notifications: Arc<N>) -> Self {
        Self {
            store,
            directory,
            notifications,
        }
    }

    /// Pre-flight eligibility check. Returns the would-be outcome without
    /// writing anything.
    pub async fn validate_application(
        &self,
        student_id: &StudentId,
        course_id: &CourseId,
    ) -> Result<EligibilityReport, AdmissionError> {
        let student = self
            .directory
            .fetch_student(student_id)
            .await?
            .ok_or(AdmissionError::UnknownStudent)?;
        let course = self
            .directory
            .fetch_course(course_id)
            .await?
            .ok_or(AdmissionError::UnknownCourse)?;
        let existing = self.store.for_student(student_id).await?;

        let outcome = eligibility::evaluate(&student.profile, &course, &existing);
        Ok(EligibilityReport::from_check(&outcome))
    }

    /// Submit a new course application. Eligibility is checked up front and
    /// again as store preconditions so concurrent submissions cannot slip
    /// past the per-institution limits.
    pub async fn submit_application(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<CourseApplication, AdmissionError> {
        let student = self
            .directory
            .fetch_student(&submission.student_id)
            .await?
            .ok_or(AdmissionError::UnknownStudent)?;
        let course = self
            .directory
            .fetch_course(&submission.course_id)
            .await?
            .ok_or(AdmissionError::UnknownCourse)?;
        let existing = self.store.for_student(&submission.student_id).await?;

        eligibility::evaluate(&student.profile, &course, &existing)?;

        let now = Utc::now();
        let application = CourseApplication {
            id: next_application_id(),
            student_id: submission.student_id,
            institute_id: course.institute_id.clone(),
            faculty_id: course.faculty_id.clone(),
            course_id: course.id.clone(),
            status: ApplicationStatus::Pending,
            personal_statement: submission.personal_statement,
            documents: submission.documents,
            decision_note: None,
            applied_at: now,
            updated_at: now,
        };

        let batch = WriteBatch {
            guards: vec![
                WriteGuard::MaxApplications {
                    student: application.student_id.clone(),
                    institute: application.institute_id.clone(),
                    limit: INSTITUTE_APPLICATION_LIMIT,
                },
                WriteGuard::NoAdmittedApplication {
                    student: application.student_id.clone(),
                    institute: application.institute_id.clone(),
                },
                WriteGuard::NoCourseApplication {
                    student: application.student_id.clone(),
                    course: application.course_id.clone(),
                },
            ],
            writes: vec![ApplicationWrite::Insert(application.clone())],
        };
        self.store.commit(batch).await?;

        self.mirror_best_effort(&application).await;
        Ok(application)
    }

    /// Institution review decision on a pending application.
    pub async fn set_application_status(
        &self,
        application_id: &ApplicationId,
        to: ApplicationStatus,
        note: Option<String>,
    ) -> Result<CourseApplication, AdmissionError> {
        let mut application = self
            .store
            .fetch(application_id)
            .await?
            .ok_or(AdmissionError::ApplicationNotFound)?;

        if !TransitionActor::Institution.permits(application.status, to) {
            return Err(AdmissionError::InvalidTransition {
                from: application.status,
                to,
            });
        }

        let mut guards = vec![WriteGuard::StatusIs {
            id: application.id.clone(),
            expected: application.status,
        }];

        if to == ApplicationStatus::Admitted {
            let peers = self.store.for_student(&application.student_id).await?;
            let conflicting = peers.iter().any(|peer| {
                peer.id != application.id
                    && peer.institute_id == application.institute_id
                    && matches!(
                        peer.status,
                        ApplicationStatus::Admitted | ApplicationStatus::Confirmed
                    )
            });
            if conflicting {
                return Err(AdmissionError::ConflictingAdmission);
            }
            guards.push(WriteGuard::NoCompetingAdmission {
                student: application.student_id.clone(),
                institute: application.institute_id.clone(),
                except: application.id.clone(),
            });
        }

        let now = Utc::now();
        let batch = WriteBatch {
            guards,
            writes: vec![ApplicationWrite::SetStatus {
                id: application.id.clone(),
                to,
                note: note.clone(),
                updated_at: now,
            }],
        };
        self.store.commit(batch).await?;

        application.status = to;
        application.updated_at = now;
        if note.is_some() {
            application.decision_note = note;
        }

        self.mirror_best_effort(&application).await;
        if to == ApplicationStatus::Admitted {
            let notice = self.admission_notice(&application, now).await;
            self.notify_best_effort(notice).await;
        }

        Ok(application)
    }

    /// Confirms the student's chosen admission, releases every other admitted
    /// offer, and promotes the earliest waitlisted applicant at each released
    /// institution. All transitions land as one atomic batch.
    pub async fn select_institution(
        &self,
        student_id: &StudentId,
        application_id: &ApplicationId,
        institute_id: &InstituteId,
    ) -> Result<SelectionOutcome, AdmissionError> {
        let applications = self.store.for_student(student_id).await?;

        let selected = applications
            .iter()
            .find(|application| &application.id == application_id);

        // Re-selecting a confirmed seat is a transition error even though the
        // admitted set is empty by then.
        if let Some(selected) = selected {
            if selected.status == ApplicationStatus::Confirmed {
                return Err(AdmissionError::InvalidTransition {
                    from: selected.status,
                    to: ApplicationStatus::Confirmed,
                });
            }
        }

        let admitted: Vec<CourseApplication> = applications
            .iter()
            .filter(|application| application.status == ApplicationStatus::Admitted)
            .cloned()
            .collect();
        if admitted.is_empty() {
            return Err(AdmissionError::NoAdmissionFound);
        }

        let selected = selected.ok_or(AdmissionError::ApplicationNotFound)?;
        if !TransitionActor::Placement.permits(selected.status, ApplicationStatus::Confirmed) {
            return Err(AdmissionError::InvalidTransition {
                from: selected.status,
                to: ApplicationStatus::Confirmed,
            });
        }
        if &selected.institute_id != institute_id {
            return Err(AdmissionError::SelectionMismatch);
        }

        let mut released_institutes: Vec<InstituteId> = Vec::new();
        for application in &admitted {
            if application.id == selected.id || application.institute_id == selected.institute_id {
                continue;
            }
            if !released_institutes.contains(&application.institute_id) {
                released_institutes.push(application.institute_id.clone());
            }
        }

        let mut promotions: Vec<CourseApplication> = Vec::new();
        for institute in &released_institutes {
            let Some(candidate) = self.store.earliest_waiting(institute).await? else {
                continue;
            };
            let peers = self.store.for_student(&candidate.student_id).await?;
            let holds_admission = peers.iter().any(|peer| {
                peer.id != candidate.id
                    && peer.institute_id == candidate.institute_id
                    && matches!(
                        peer.status,
                        ApplicationStatus::Admitted | ApplicationStatus::Confirmed
                    )
            });
            if holds_admission {
                warn!(
                    application = %candidate.id.0,
                    institution = %institute.0,
                    "skipping waitlist promotion, candidate already holds an admission"
                );
                continue;
            }
            promotions.push(candidate);
        }

        let now = Utc::now();
        let plan = plan_selection(selected, &admitted, &promotions, now);
        self.store.commit(plan.batch).await?;

        let mut confirmed = selected.clone();
        confirmed.status = ApplicationStatus::Confirmed;
        confirmed.updated_at = now;

        let released: Vec<CourseApplication> = admitted
            .iter()
            .filter(|application| plan.released.contains(&application.id))
            .map(|application| {
                let mut released = application.clone();
                released.status = ApplicationStatus::Rejected;
                released.decision_note = Some(RELEASED_NOTE.to_string());
                released.updated_at = now;
                released
            })
            .collect();

        let promoted: Vec<CourseApplication> = promotions
            .into_iter()
            .map(|mut application| {
                application.status = ApplicationStatus::Admitted;
                application.updated_at = now;
                application
            })
            .collect();

        self.mirror_best_effort(&confirmed).await;
        for application in released.iter().chain(promoted.iter()) {
            self.mirror_best_effort(application).await;
        }
        for application in &promoted {
            let notice = self.admission_notice(application, now).await;
            self.notify_best_effort(notice).await;
        }

        Ok(SelectionOutcome {
            confirmed,
            released,
            promoted,
        })
    }

    /// Single application lookup.
    pub async fn get_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<CourseApplication, AdmissionError> {
        self.store
            .fetch(application_id)
            .await?
            .ok_or(AdmissionError::ApplicationNotFound)
    }

    /// Every application the student holds, across institutions.
    pub async fn applications_for_student(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<CourseApplication>, AdmissionError> {
        self.directory
            .fetch_student(student_id)
            .await?
            .ok_or(AdmissionError::UnknownStudent)?;
        Ok(self.store.for_student(student_id).await?)
    }

    /// Institution-namespace view of applications, served from the mirror.
    pub async fn institution_applications(
        &self,
        institute_id: &InstituteId,
    ) -> Result<Vec<CourseApplication>, AdmissionError> {
        Ok(self.store.institution_mirror(institute_id).await?)
    }

    async fn admission_notice(
        &self,
        application: &CourseApplication,
        now: DateTime<Utc>,
    ) -> Notification {
        let course_name = match self.directory.fetch_course(&application.course_id).await {
            Ok(Some(course)) => course.title,
            _ => application.course_id.0.clone(),
        };
        Notification::new(
            application.student_id.clone(),
            NotificationKind::Admission,
            "Admission offer",
            format!("You have been admitted to {course_name}. Confirm your seat to secure it."),
            now,
        )
    }

    async fn mirror_best_effort(&self, application: &CourseApplication) {
        if let Err(err) = self.store.sync_mirror(application).await {
            warn!(%err, application = %application.id.0, "institution mirror sync failed");
        }
    }

    async fn notify_best_effort(&self, notification: Notification) {
        let student = notification.user_id.0.clone();
        if let Err(err) = self.notifications.deliver(notification).await {
            warn!(%err, student = %student, "notification delivery failed");
        }
    }
}

/// Result of a student confirming one admission.
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    pub confirmed: CourseApplication,
    pub released: Vec<CourseApplication>,
    pub promoted: Vec<CourseApplication>,
}

/// Error raised by the admission service.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error(transparent)]
    Eligibility(#[from] EligibilityError),
    #[error("cannot transition from {} to {}", from.label(), to.label())]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("student already holds an admission at this institution")]
    ConflictingAdmission,
    #[error("no admitted application to confirm")]
    NoAdmissionFound,
    #[error("application not found")]
    ApplicationNotFound,
    #[error("application does not belong to the selected institution")]
    SelectionMismatch,
    #[error("student not found")]
    UnknownStudent,
    #[error("course not found")]
    UnknownCourse,
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AdmissionError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Precondition(WriteGuard::MaxApplications { limit, .. }) => {
                Self::Eligibility(EligibilityError::InstitutionLimitReached { limit })
            }
            StoreError::Precondition(WriteGuard::NoAdmittedApplication { .. }) => {
                Self::Eligibility(EligibilityError::AlreadyAdmitted)
            }
            StoreError::Precondition(WriteGuard::NoCourseApplication { .. }) => {
                Self::Eligibility(EligibilityError::DuplicateCourse)
            }
            StoreError::Precondition(WriteGuard::NoCompetingAdmission { .. }) => {
                Self::ConflictingAdmission
            }
            StoreError::NotFound => Self::ApplicationNotFound,
            other => Self::Store(other),
        }
    }
}
