use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{JobApplicationId, JobApplicationStatus, JobId, JobPostingDraft, JobRequirements};
use super::repository::{BoardError, JobBoard};
use super::scoring;
use super::service::{RecruitmentError, RecruitmentService};
use crate::directory::{CampusDirectory, DirectoryError, QualificationProfile, StudentId};
use crate::notify::NotificationSink;

/// Router builder exposing the recruitment lifecycle endpoints.
pub fn recruitment_router<J, D, N>(service: Arc<RecruitmentService<J, D, N>>) -> Router
where
    J: JobBoard + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route("/api/v1/recruitment/jobs", post(post_job_handler::<J, D, N>))
        .route(
            "/api/v1/recruitment/jobs/:job_id/notifications",
            post(notifications_handler::<J, D, N>),
        )
        .route(
            "/api/v1/recruitment/jobs/:job_id/applicants/qualified",
            get(qualified_handler::<J, D, N>),
        )
        .route(
            "/api/v1/recruitment/jobs/:job_id/applications",
            post(apply_handler::<J, D, N>),
        )
        .route(
            "/api/v1/recruitment/applications/:application_id/status",
            post(status_handler::<J, D, N>),
        )
        .route("/api/v1/recruitment/score", post(score_handler))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplyRequest {
    pub student_id: StudentId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobStatusRequest {
    pub status: JobApplicationStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    pub qualifications: QualificationProfile,
    pub requirements: JobRequirements,
}

pub(crate) async fn post_job_handler<J, D, N>(
    State(service): State<Arc<RecruitmentService<J, D, N>>>,
    axum::Json(draft): axum::Json<JobPostingDraft>,
) -> Response
where
    J: JobBoard + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    match service.post_job(draft).await {
        Ok(job) => (StatusCode::CREATED, axum::Json(job)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn notifications_handler<J, D, N>(
    State(service): State<Arc<RecruitmentService<J, D, N>>>,
    Path(job_id): Path<String>,
) -> Response
where
    J: JobBoard + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    let id = JobId(job_id);
    match service.plan_notifications_for_job(&id).await {
        Ok(plan) => (StatusCode::OK, axum::Json(plan)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn qualified_handler<J, D, N>(
    State(service): State<Arc<RecruitmentService<J, D, N>>>,
    Path(job_id): Path<String>,
) -> Response
where
    J: JobBoard + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    let id = JobId(job_id);
    match service.qualified_applicants(&id).await {
        Ok(ranked) => (StatusCode::OK, axum::Json(ranked)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn apply_handler<J, D, N>(
    State(service): State<Arc<RecruitmentService<J, D, N>>>,
    Path(job_id): Path<String>,
    axum::Json(request): axum::Json<ApplyRequest>,
) -> Response
where
    J: JobBoard + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    let id = JobId(job_id);
    match service.apply_to_job(&request.student_id, &id).await {
        Ok(application) => {
            (StatusCode::CREATED, axum::Json(application.view())).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn status_handler<J, D, N>(
    State(service): State<Arc<RecruitmentService<J, D, N>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<JobStatusRequest>,
) -> Response
where
    J: JobBoard + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    let id = JobApplicationId(application_id);
    match service.set_job_application_status(&id, request.status).await {
        Ok(application) => (StatusCode::OK, axum::Json(application.view())).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn score_handler(axum::Json(request): axum::Json<ScoreRequest>) -> Response {
    let outcome = scoring::score(&request.qualifications, &request.requirements);
    (StatusCode::OK, axum::Json(outcome)).into_response()
}

impl IntoResponse for RecruitmentError {
    fn into_response(self) -> Response {
        let status = match &self {
            RecruitmentError::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RecruitmentError::DuplicateApplication | RecruitmentError::UpdateConflict => {
                StatusCode::CONFLICT
            }
            RecruitmentError::UnknownJob
            | RecruitmentError::UnknownStudent
            | RecruitmentError::ApplicationNotFound => StatusCode::NOT_FOUND,
            RecruitmentError::Directory(DirectoryError::Unavailable(_))
            | RecruitmentError::Board(BoardError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            RecruitmentError::Board(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = axum::Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
