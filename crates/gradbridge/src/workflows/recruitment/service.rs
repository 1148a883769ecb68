use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use super::domain::{
    JobApplication, JobApplicationId, JobApplicationStatus, JobId, JobPosting, JobPostingDraft,
};
use super::fanout::{self, NotificationPlan};
use super::repository::{BoardError, JobBoard};
use super::scoring;
use crate::directory::{CampusDirectory, DirectoryError, StudentId};
use crate::notify::{Notification, NotificationKind, NotificationSink};

/// Service composing the job board, qualification scoring, and notification
/// fan-out over the campus directory.
pub struct RecruitmentService<J, D, N> {
    board: Arc<J>,
    directory: Arc<D>,
    notifications: Arc<N>,
}

static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static JOB_APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_job_id() -> JobId {
    let id = JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    JobId(format!("job-{id:06}"))
}

fn next_job_application_id() -> JobApplicationId {
    let id = JOB_APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    JobApplicationId(format!("jobapp-{id:06}"))
}

impl<J, D, N> RecruitmentService<J, D, N>
where
    J: JobBoard + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(board: Arc<J>, directory: Arc<D>, notifications: Arc<N>) -> Self {
        Self {
            board,
            directory,
            notifications,
        }
    }

    /// Publishes a job posting and schedules notification fan-out off the
    /// posting path. Fan-out failures are logged, never surfaced here.
    pub async fn post_job(&self, draft: JobPostingDraft) -> Result<JobPosting, RecruitmentError> {
        let job = JobPosting {
            id: next_job_id(),
            company_id: draft.company_id,
            title: draft.title,
            description: draft.description,
            requirements: draft.requirements,
            posted_at: Utc::now(),
        };
        self.board.insert_job(job.clone()).await?;

        let board = Arc::clone(&self.board);
        let directory = Arc::clone(&self.directory);
        let notifications = Arc::clone(&self.notifications);
        let job_id = job.id.clone();
        tokio::spawn(async move {
            if let Err(err) = dispatch_fanout(board, directory, notifications, &job_id).await {
                warn!(%err, job = %job_id.0, "notification fan-out failed");
            }
        });

        Ok(job)
    }

    /// Runs the fan-out partition for a job and dispatches both waves,
    /// returning who ended up in each.
    pub async fn plan_notifications_for_job(
        &self,
        job_id: &JobId,
    ) -> Result<NotificationPlan, RecruitmentError> {
        dispatch_fanout(
            Arc::clone(&self.board),
            Arc::clone(&self.directory),
            Arc::clone(&self.notifications),
            job_id,
        )
        .await
    }

    /// Student applies to a posting. One application per student per job.
    pub async fn apply_to_job(
        &self,
        student_id: &StudentId,
        job_id: &JobId,
    ) -> Result<JobApplication, RecruitmentError> {
        self.directory
            .fetch_student(student_id)
            .await?
            .ok_or(RecruitmentError::UnknownStudent)?;
        self.board
            .fetch_job(job_id)
            .await?
            .ok_or(RecruitmentError::UnknownJob)?;

        let application = JobApplication {
            id: next_job_application_id(),
            student_id: student_id.clone(),
            job_id: job_id.clone(),
            status: JobApplicationStatus::Pending,
            applied_at: Utc::now(),
        };
        self.board.insert_application(application.clone()).await?;
        Ok(application)
    }

    /// Company review decision on a job application.
    pub async fn set_job_application_status(
        &self,
        application_id: &JobApplicationId,
        to: JobApplicationStatus,
    ) -> Result<JobApplication, RecruitmentError> {
        let current = self
            .board
            .fetch_application(application_id)
            .await?
            .ok_or(RecruitmentError::ApplicationNotFound)?;

        if !current.status.permits(to) {
            return Err(RecruitmentError::InvalidTransition {
                from: current.status,
                to,
            });
        }

        let updated = self
            .board
            .update_application_status(application_id, current.status, to)
            .await?;

        if to == JobApplicationStatus::Accepted {
            let job_name = match self.board.fetch_job(&updated.job_id).await {
                Ok(Some(job)) => job.title,
                _ => updated.job_id.0.clone(),
            };
            let notice = Notification::new(
                updated.student_id.clone(),
                NotificationKind::Acceptance,
                "Application accepted",
                format!("Congratulations, your application for {job_name} was accepted."),
                Utc::now(),
            );
            if let Err(err) = self.notifications.deliver(notice).await {
                warn!(%err, student = %updated.student_id.0, "notification delivery failed");
            }
        }

        Ok(updated)
    }

    /// Applicants for a job scoring at or above the qualification threshold,
    /// ranked by score descending. Equal scores keep application order.
    pub async fn qualified_applicants(
        &self,
        job_id: &JobId,
    ) -> Result<Vec<RankedApplicant>, RecruitmentError> {
        let job = self
            .board
            .fetch_job(job_id)
            .await?
            .ok_or(RecruitmentError::UnknownJob)?;
        let applications = self.board.applications_for_job(job_id).await?;

        let mut ranked = Vec::new();
        for application in applications {
            let Some(student) = self.directory.fetch_student(&application.student_id).await?
            else {
                warn!(
                    student = %application.student_id.0,
                    job = %job_id.0,
                    "applicant missing from directory, skipping"
                );
                continue;
            };
            let outcome = scoring::score(&student.profile, &job.requirements);
            if outcome.is_qualified() {
                ranked.push(RankedApplicant {
                    student_id: student.id,
                    score: outcome.score,
                    matches: outcome.matches,
                });
            }
        }

        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(ranked)
    }
}

async fn dispatch_fanout<J, D, N>(
    board: Arc<J>,
    directory: Arc<D>,
    notifications: Arc<N>,
    job_id: &JobId,
) -> Result<NotificationPlan, RecruitmentError>
where
    J: JobBoard + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    let job = board
        .fetch_job(job_id)
        .await?
        .ok_or(RecruitmentError::UnknownJob)?;
    let roster = directory.students().await?;
    let plan = fanout::plan(&job, &roster);

    let now = Utc::now();
    for student_id in &plan.qualified {
        let notice = fanout::opportunity_notification(&job, student_id, now);
        if let Err(err) = notifications.deliver(notice).await {
            warn!(%err, student = %student_id.0, "notification delivery failed");
        }
    }
    for student_id in &plan.notified {
        let notice = fanout::vacancy_notification(&job, student_id, now);
        if let Err(err) = notifications.deliver(notice).await {
            warn!(%err, student = %student_id.0, "notification delivery failed");
        }
    }

    Ok(plan)
}

/// One qualified applicant in a company's ranked review list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedApplicant {
    pub student_id: StudentId,
    pub score: u8,
    pub matches: Vec<String>,
}

/// Error raised by the recruitment service.
#[derive(Debug, thiserror::Error)]
pub enum RecruitmentError {
    #[error("student already applied to this job")]
    DuplicateApplication,
    #[error("cannot transition from {} to {}", from.label(), to.label())]
    InvalidTransition {
        from: JobApplicationStatus,
        to: JobApplicationStatus,
    },
    #[error("job not found")]
    UnknownJob,
    #[error("student not found")]
    UnknownStudent,
    #[error("job application not found")]
    ApplicationNotFound,
    #[error("application changed concurrently")]
    UpdateConflict,
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Board(BoardError),
}

impl From<BoardError> for RecruitmentError {
    fn from(value: BoardError) -> Self {
        match value {
            BoardError::Duplicate => Self::DuplicateApplication,
            BoardError::Conflict => Self::UpdateConflict,
            BoardError::NotFound => Self::ApplicationNotFound,
            other => Self::Board(other),
        }
    }
}
