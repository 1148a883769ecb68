use super::domain::{JobApplication, JobApplicationId, JobApplicationStatus, JobId, JobPosting};

/// Persistence seam for job postings and job applications.
#[async_trait::async_trait]
pub trait JobBoard: Send + Sync {
    async fn insert_job(&self, job: JobPosting) -> Result<(), BoardError>;
    async fn fetch_job(&self, id: &JobId) -> Result<Option<JobPosting>, BoardError>;
    /// Rejects with [`BoardError::Duplicate`] when the student already
    /// applied to the job. Checked inside the store's critical section.
    async fn insert_application(&self, application: JobApplication) -> Result<(), BoardError>;
    async fn fetch_application(
        &self,
        id: &JobApplicationId,
    ) -> Result<Option<JobApplication>, BoardError>;
    /// Applications for a job in creation order.
    async fn applications_for_job(&self, job: &JobId) -> Result<Vec<JobApplication>, BoardError>;
    /// Compare-and-set status change. Fails with [`BoardError::Conflict`]
    /// when the stored status no longer matches `expected`.
    async fn update_application_status(
        &self,
        id: &JobApplicationId,
        expected: JobApplicationStatus,
        to: JobApplicationStatus,
    ) -> Result<JobApplication, BoardError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("record not found")]
    NotFound,
    #[error("application already exists for this job")]
    Duplicate,
    #[error("application changed concurrently")]
    Conflict,
    #[error("job board unavailable: {0}")]
    Unavailable(String),
}
