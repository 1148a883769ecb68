use std::collections::BTreeSet;
use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::directory::{
    Course, CourseId, DocumentRef, FacultyId, InstituteId, QualificationProfile, Student,
    StudentId, WorkExperience,
};
use crate::memory::{MemoryApplicationStore, MemoryDirectory, MemoryNotifications};
use crate::notify::{Notification, NotificationSink, NotifyError};
use crate::workflows::admissions::{
    AdmissionService, ApplicationId, ApplicationStatus, ApplicationStore, ApplicationSubmission,
    ApplicationWrite, CourseApplication, StoreError, WriteBatch,
};

pub(super) fn profile() -> QualificationProfile {
    QualificationProfile {
        high_school_grade: Some(86.0),
        subjects: ["Mathematics", "English"]
            .iter()
            .map(|subject| subject.to_string())
            .collect(),
        work_experience: vec![WorkExperience {
            employer: "Harbor Analytics".to_string(),
            role: "Data intern".to_string(),
        }],
        transcript_url: Some("s3://gradbridge/transcripts/amara.pdf".to_string()),
        certificates: vec![DocumentRef {
            name: "IELTS certificate".to_string(),
            storage_key: "s3://gradbridge/certs/amara-ielts.pdf".to_string(),
        }],
    }
}

pub(super) fn student(id: &str) -> Student {
    Student {
        id: StudentId(id.to_string()),
        full_name: format!("Student {id}"),
        profile: profile(),
    }
}

pub(super) fn course(id: &str, institute: &str) -> Course {
    Course {
        id: CourseId(id.to_string()),
        institute_id: InstituteId(institute.to_string()),
        faculty_id: FacultyId("fac-engineering".to_string()),
        title: "Software Engineering".to_string(),
        minimum_grade: None,
        required_subjects: BTreeSet::new(),
    }
}

pub(super) fn selective_course(
    id: &str,
    institute: &str,
    minimum_grade: f32,
    subjects: &[&str],
) -> Course {
    let mut course = course(id, institute);
    course.minimum_grade = Some(minimum_grade);
    course.required_subjects = subjects.iter().map(|subject| subject.to_string()).collect();
    course
}

pub(super) fn minute(offset: i64) -> DateTime<Utc> {
    let base = Utc
        .with_ymd_and_hms(2030, 9, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    base + Duration::minutes(offset)
}

pub(super) fn application(
    id: &str,
    student: &str,
    institute: &str,
    course: &str,
    status: ApplicationStatus,
    applied_at: DateTime<Utc>,
) -> CourseApplication {
    CourseApplication {
        id: ApplicationId(id.to_string()),
        student_id: StudentId(student.to_string()),
        institute_id: InstituteId(institute.to_string()),
        faculty_id: FacultyId("fac-engineering".to_string()),
        course_id: CourseId(course.to_string()),
        status,
        personal_statement: None,
        documents: Vec::new(),
        decision_note: None,
        applied_at,
        updated_at: applied_at,
    }
}

pub(super) fn submission(student: &str, course: &str) -> ApplicationSubmission {
    ApplicationSubmission {
        student_id: StudentId(student.to_string()),
        course_id: CourseId(course.to_string()),
        personal_statement: Some("I build things and want to build more.".to_string()),
        documents: Vec::new(),
    }
}

pub(super) type MemoryAdmissions =
    AdmissionService<MemoryApplicationStore, MemoryDirectory, MemoryNotifications>;

pub(super) fn build_admissions() -> (
    Arc<MemoryAdmissions>,
    Arc<MemoryApplicationStore>,
    Arc<MemoryDirectory>,
    Arc<MemoryNotifications>,
) {
    let store = Arc::new(MemoryApplicationStore::default());
    let directory = Arc::new(MemoryDirectory::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let service = Arc::new(AdmissionService::new(
        store.clone(),
        directory.clone(),
        notifications.clone(),
    ));
    (service, store, directory, notifications)
}

pub(super) async fn seed(store: &MemoryApplicationStore, application: CourseApplication) {
    store
        .commit(WriteBatch {
            guards: Vec::new(),
            writes: vec![ApplicationWrite::Insert(application)],
        })
        .await
        .expect("seed application");
}

/// Store whose reads miss records that are really there, so only write-time
/// guards can catch rule violations.
pub(super) struct StaleReadStore(pub(super) MemoryApplicationStore);

#[async_trait::async_trait]
impl ApplicationStore for StaleReadStore {
    async fn fetch(&self, id: &ApplicationId) -> Result<Option<CourseApplication>, StoreError> {
        self.0.fetch(id).await
    }

    async fn for_student(
        &self,
        _student: &StudentId,
    ) -> Result<Vec<CourseApplication>, StoreError> {
        Ok(Vec::new())
    }

    async fn earliest_waiting(
        &self,
        institute: &InstituteId,
    ) -> Result<Option<CourseApplication>, StoreError> {
        self.0.earliest_waiting(institute).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        self.0.commit(batch).await
    }

    async fn sync_mirror(&self, application: &CourseApplication) -> Result<(), StoreError> {
        self.0.sync_mirror(application).await
    }

    async fn institution_mirror(
        &self,
        institute: &InstituteId,
    ) -> Result<Vec<CourseApplication>, StoreError> {
        self.0.institution_mirror(institute).await
    }
}

/// Store that persists normally but always fails the mirror write.
pub(super) struct MirrorFailStore(pub(super) MemoryApplicationStore);

#[async_trait::async_trait]
impl ApplicationStore for MirrorFailStore {
    async fn fetch(&self, id: &ApplicationId) -> Result<Option<CourseApplication>, StoreError> {
        self.0.fetch(id).await
    }

    async fn for_student(
        &self,
        student: &StudentId,
    ) -> Result<Vec<CourseApplication>, StoreError> {
        self.0.for_student(student).await
    }

    async fn earliest_waiting(
        &self,
        institute: &InstituteId,
    ) -> Result<Option<CourseApplication>, StoreError> {
        self.0.earliest_waiting(institute).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        self.0.commit(batch).await
    }

    async fn sync_mirror(&self, _application: &CourseApplication) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("mirror offline".to_string()))
    }

    async fn institution_mirror(
        &self,
        institute: &InstituteId,
    ) -> Result<Vec<CourseApplication>, StoreError> {
        self.0.institution_mirror(institute).await
    }
}

pub(super) struct UnavailableStore;

#[async_trait::async_trait]
impl ApplicationStore for UnavailableStore {
    async fn fetch(&self, _id: &ApplicationId) -> Result<Option<CourseApplication>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn for_student(
        &self,
        _student: &StudentId,
    ) -> Result<Vec<CourseApplication>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn earliest_waiting(
        &self,
        _institute: &InstituteId,
    ) -> Result<Option<CourseApplication>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn commit(&self, _batch: WriteBatch) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn sync_mirror(&self, _application: &CourseApplication) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn institution_mirror(
        &self,
        _institute: &InstituteId,
    ) -> Result<Vec<CourseApplication>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct FailingSink;

#[async_trait::async_trait]
impl NotificationSink for FailingSink {
    async fn deliver(&self, _notification: Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("sink offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 8192)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
