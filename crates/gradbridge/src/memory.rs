//! In-memory implementations of the storage and delivery seams, backing the
//! dev server, the demo, and the test suites.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::directory::{
    CampusDirectory, Course, CourseId, DirectoryError, InstituteId, Student, StudentId,
};
use crate::notify::{Notification, NotificationSink, NotifyError};
use crate::workflows::admissions::{
    ApplicationId, ApplicationStatus, ApplicationStore, ApplicationWrite, CourseApplication,
    StoreError, WriteBatch, WriteGuard,
};
use crate::workflows::recruitment::{
    BoardError, JobApplication, JobApplicationId, JobApplicationStatus, JobBoard, JobId,
    JobPosting,
};

/// Directory fake seeded with students and courses.
#[derive(Default, Clone)]
pub struct MemoryDirectory {
    students: Arc<Mutex<Vec<Student>>>,
    courses: Arc<Mutex<Vec<Course>>>,
}

impl MemoryDirectory {
    pub fn insert_student(&self, student: Student) {
        let mut guard = self.students.lock().expect("directory mutex poisoned");
        guard.push(student);
    }

    pub fn insert_course(&self, course: Course) {
        let mut guard = self.courses.lock().expect("directory mutex poisoned");
        guard.push(course);
    }
}

#[async_trait::async_trait]
impl CampusDirectory for MemoryDirectory {
    async fn fetch_student(&self, id: &StudentId) -> Result<Option<Student>, DirectoryError> {
        let guard = self.students.lock().expect("directory mutex poisoned");
        Ok(guard.iter().find(|student| &student.id == id).cloned())
    }

    async fn fetch_course(&self, id: &CourseId) -> Result<Option<Course>, DirectoryError> {
        let guard = self.courses.lock().expect("directory mutex poisoned");
        Ok(guard.iter().find(|course| &course.id == id).cloned())
    }

    async fn students(&self) -> Result<Vec<Student>, DirectoryError> {
        let guard = self.students.lock().expect("directory mutex poisoned");
        Ok(guard.clone())
    }
}

/// Application store fake with full guard and batch semantics under one lock.
#[derive(Default, Clone)]
pub struct MemoryApplicationStore {
    records: Arc<Mutex<Vec<CourseApplication>>>,
    mirrors: Arc<Mutex<HashMap<InstituteId, Vec<CourseApplication>>>>,
}

fn guard_holds(records: &[CourseApplication], guard: &WriteGuard) -> bool {
    match guard {
        WriteGuard::StatusIs { id, expected } => records
            .iter()
            .find(|record| &record.id == id)
            .map(|record| record.status == *expected)
            .unwrap_or(false),
        WriteGuard::MaxApplications {
            student,
            institute,
            limit,
        } => {
            records
                .iter()
                .filter(|record| &record.student_id == student && &record.institute_id == institute)
                .count()
                < *limit
        }
        WriteGuard::NoAdmittedApplication { student, institute } => !records.iter().any(|record| {
            &record.student_id == student
                && &record.institute_id == institute
                && record.status == ApplicationStatus::Admitted
        }),
        WriteGuard::NoCourseApplication { student, course } => !records
            .iter()
            .any(|record| &record.student_id == student && &record.course_id == course),
        WriteGuard::NoCompetingAdmission {
            student,
            institute,
            except,
        } => !records.iter().any(|record| {
            &record.id != except
                && &record.student_id == student
                && &record.institute_id == institute
                && matches!(
                    record.status,
                    ApplicationStatus::Admitted | ApplicationStatus::Confirmed
                )
        }),
    }
}

#[async_trait::async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn fetch(&self, id: &ApplicationId) -> Result<Option<CourseApplication>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    async fn for_student(
        &self,
        student: &StudentId,
    ) -> Result<Vec<CourseApplication>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.student_id == student)
            .cloned()
            .collect())
    }

    async fn earliest_waiting(
        &self,
        institute: &InstituteId,
    ) -> Result<Option<CourseApplication>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| {
                &record.institute_id == institute && record.status == ApplicationStatus::Waiting
            })
            .min_by_key(|record| record.applied_at)
            .cloned())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");

        for write in &batch.writes {
            match write {
                ApplicationWrite::Insert(application) => {
                    if guard.iter().any(|record| record.id == application.id) {
                        return Err(StoreError::Duplicate);
                    }
                }
                ApplicationWrite::SetStatus { id, .. } => {
                    if !guard.iter().any(|record| &record.id == id) {
                        return Err(StoreError::NotFound);
                    }
                }
            }
        }

        for precondition in &batch.guards {
            if !guard_holds(&guard, precondition) {
                return Err(StoreError::Precondition(precondition.clone()));
            }
        }

        for write in batch.writes {
            match write {
                ApplicationWrite::Insert(application) => guard.push(application),
                ApplicationWrite::SetStatus {
                    id,
                    to,
                    note,
                    updated_at,
                } => {
                    if let Some(record) = guard.iter_mut().find(|record| record.id == id) {
                        record.status = to;
                        record.updated_at = updated_at;
                        if note.is_some() {
                            record.decision_note = note;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn sync_mirror(&self, application: &CourseApplication) -> Result<(), StoreError> {
        let mut guard = self.mirrors.lock().expect("mirror mutex poisoned");
        let entries = guard
            .entry(application.institute_id.clone())
            .or_insert_with(Vec::new);
        match entries.iter_mut().find(|entry| entry.id == application.id) {
            Some(entry) => *entry = application.clone(),
            None => entries.push(application.clone()),
        }
        Ok(())
    }

    async fn institution_mirror(
        &self,
        institute: &InstituteId,
    ) -> Result<Vec<CourseApplication>, StoreError> {
        let guard = self.mirrors.lock().expect("mirror mutex poisoned");
        Ok(guard.get(institute).cloned().unwrap_or_default())
    }
}

/// Job board fake enforcing the one-application-per-job rule.
#[derive(Default, Clone)]
pub struct MemoryJobBoard {
    jobs: Arc<Mutex<Vec<JobPosting>>>,
    applications: Arc<Mutex<Vec<JobApplication>>>,
}

#[async_trait::async_trait]
impl JobBoard for MemoryJobBoard {
    async fn insert_job(&self, job: JobPosting) -> Result<(), BoardError> {
        let mut guard = self.jobs.lock().expect("job board mutex poisoned");
        if guard.iter().any(|existing| existing.id == job.id) {
            return Err(BoardError::Duplicate);
        }
        guard.push(job);
        Ok(())
    }

    async fn fetch_job(&self, id: &JobId) -> Result<Option<JobPosting>, BoardError> {
        let guard = self.jobs.lock().expect("job board mutex poisoned");
        Ok(guard.iter().find(|job| &job.id == id).cloned())
    }

    async fn insert_application(&self, application: JobApplication) -> Result<(), BoardError> {
        let mut guard = self.applications.lock().expect("job board mutex poisoned");
        let duplicate = guard.iter().any(|existing| {
            existing.id == application.id
                || (existing.student_id == application.student_id
                    && existing.job_id == application.job_id)
        });
        if duplicate {
            return Err(BoardError::Duplicate);
        }
        guard.push(application);
        Ok(())
    }

    async fn fetch_application(
        &self,
        id: &JobApplicationId,
    ) -> Result<Option<JobApplication>, BoardError> {
        let guard = self.applications.lock().expect("job board mutex poisoned");
        Ok(guard.iter().find(|application| &application.id == id).cloned())
    }

    async fn applications_for_job(
        &self,
        job: &JobId,
    ) -> Result<Vec<JobApplication>, BoardError> {
        let guard = self.applications.lock().expect("job board mutex poisoned");
        Ok(guard
            .iter()
            .filter(|application| &application.job_id == job)
            .cloned()
            .collect())
    }

    async fn update_application_status(
        &self,
        id: &JobApplicationId,
        expected: JobApplicationStatus,
        to: JobApplicationStatus,
    ) -> Result<JobApplication, BoardError> {
        let mut guard = self.applications.lock().expect("job board mutex poisoned");
        let application = guard
            .iter_mut()
            .find(|application| &application.id == id)
            .ok_or(BoardError::NotFound)?;
        if application.status != expected {
            return Err(BoardError::Conflict);
        }
        application.status = to;
        Ok(application.clone())
    }
}

/// Notification sink fake that records every delivery for assertions.
#[derive(Default, Clone)]
pub struct MemoryNotifications {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifications {
    pub fn delivered(&self) -> Vec<Notification> {
        self.events.lock().expect("notification mutex poisoned").clone()
    }
}

#[async_trait::async_trait]
impl NotificationSink for MemoryNotifications {
    async fn deliver(&self, notification: Notification) -> Result<(), NotifyError> {
        let mut guard = self.events.lock().expect("notification mutex poisoned");
        guard.push(notification);
        Ok(())
    }
}
