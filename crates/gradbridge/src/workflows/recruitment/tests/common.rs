use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::directory::{
    CompanyId, DocumentRef, QualificationProfile, Student, StudentId, WorkExperience,
};
use crate::memory::{MemoryDirectory, MemoryJobBoard, MemoryNotifications};
use crate::notify::{Notification, NotificationSink, NotifyError};
use crate::workflows::recruitment::{
    JobApplication, JobApplicationId, JobApplicationStatus, JobId, JobPosting, JobPostingDraft,
    JobRequirements, RecruitmentService,
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

pub(super) fn student_with(id: &str, profile: QualificationProfile) -> Student {
    Student {
        id: StudentId(id.to_string()),
        full_name: format!("Student {id}"),
        profile,
    }
}

pub(super) fn student(id: &str) -> Student {
    student_with(id, profile())
}

pub(super) fn requirements(
    minimum_grade: Option<f32>,
    subjects: &[&str],
    work_experience: bool,
) -> JobRequirements {
    JobRequirements {
        minimum_grade,
        required_subjects: subjects.iter().map(|subject| subject.to_string()).collect(),
        work_experience,
    }
}

pub(super) fn minute(offset: i64) -> DateTime<Utc> {
    let base = Utc
        .with_ymd_and_hms(2030, 9, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    base + Duration::minutes(offset)
}

pub(super) fn posting(id: &str, title: &str, requirements: JobRequirements) -> JobPosting {
    JobPosting {
        id: JobId(id.to_string()),
        company_id: CompanyId("co-acme".to_string()),
        title: title.to_string(),
        description: String::new(),
        requirements,
        posted_at: minute(0),
    }
}

pub(super) fn draft(title: &str, requirements: JobRequirements) -> JobPostingDraft {
    JobPostingDraft {
        company_id: CompanyId("co-acme".to_string()),
        title: title.to_string(),
        description: "Role description.".to_string(),
        requirements,
    }
}

pub(super) fn job_application(
    id: &str,
    student: &str,
    job: &str,
    status: JobApplicationStatus,
    applied_at: DateTime<Utc>,
) -> JobApplication {
    JobApplication {
        id: JobApplicationId(id.to_string()),
        student_id: StudentId(student.to_string()),
        job_id: JobId(job.to_string()),
        status,
        applied_at,
    }
}

pub(super) type MemoryRecruitment =
    RecruitmentService<MemoryJobBoard, MemoryDirectory, MemoryNotifications>;

pub(super) fn build_recruitment() -> (
    Arc<MemoryRecruitment>,
    Arc<MemoryJobBoard>,
    Arc<MemoryDirectory>,
    Arc<MemoryNotifications>,
) {
    let board = Arc::new(MemoryJobBoard::default());
    let directory = Arc::new(MemoryDirectory::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let service = Arc::new(RecruitmentService::new(
        board.clone(),
        directory.clone(),
        notifications.clone(),
    ));
    (service, board, directory, notifications)
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
