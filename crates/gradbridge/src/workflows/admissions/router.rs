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

use super::domain::{
    ApplicationId, ApplicationStatus, ApplicationSubmission, ApplicationView, CourseApplication,
};
use super::repository::{ApplicationStore, StoreError};
use super::service::{AdmissionError, AdmissionService};
use crate::directory::{CampusDirectory, CourseId, DirectoryError, InstituteId, StudentId};
use crate::notify::NotificationSink;

/// Router builder exposing the admissions lifecycle endpoints.
pub fn admission_router<S, D, N>(service: Arc<AdmissionService<S, D, N>>) -> Router
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route(
            "/api/v1/admissions/applications",
            post(submit_handler::<S, D, N>),
        )
        .route(
            "/api/v1/admissions/applications/validate",
            post(validate_handler::<S, D, N>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id",
            get(get_handler::<S, D, N>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id/status",
            post(status_handler::<S, D, N>),
        )
        .route(
            "/api/v1/admissions/selections",
            post(selection_handler::<S, D, N>),
        )
        .route(
            "/api/v1/admissions/students/:student_id/applications",
            get(student_applications_handler::<S, D, N>),
        )
        .route(
            "/api/v1/admissions/institutions/:institute_id/applications",
            get(institution_applications_handler::<S, D, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValidateRequest {
    pub student_id: StudentId,
    pub course_id: CourseId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdateRequest {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SelectionRequest {
    pub student_id: StudentId,
    pub application_id: ApplicationId,
    pub institute_id: InstituteId,
}

#[derive(Debug, serde::Serialize)]
struct SelectionView {
    confirmed: ApplicationView,
    released: Vec<ApplicationView>,
    promoted: Vec<ApplicationView>,
}

fn views(applications: &[CourseApplication]) -> Vec<ApplicationView> {
    applications.iter().map(CourseApplication::view).collect()
}

pub(crate) async fn submit_handler<S, D, N>(
    State(service): State<Arc<AdmissionService<S, D, N>>>,
    axum::Json(submission): axum::Json<ApplicationSubmission>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    match service.submit_application(submission).await {
        Ok(application) => {
            (StatusCode::CREATED, axum::Json(application.view())).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn validate_handler<S, D, N>(
    State(service): State<Arc<AdmissionService<S, D, N>>>,
    axum::Json(request): axum::Json<ValidateRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    match service
        .validate_application(&request.student_id, &request.course_id)
        .await
    {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn get_handler<S, D, N>(
    State(service): State<Arc<AdmissionService<S, D, N>>>,
    Path(application_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    let id = ApplicationId(application_id);
    match service.get_application(&id).await {
        Ok(application) => (StatusCode::OK, axum::Json(application.view())).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn status_handler<S, D, N>(
    State(service): State<Arc<AdmissionService<S, D, N>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<StatusUpdateRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    let id = ApplicationId(application_id);
    match service
        .set_application_status(&id, request.status, request.note)
        .await
    {
        Ok(application) => (StatusCode::OK, axum::Json(application.view())).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn student_applications_handler<S, D, N>(
    State(service): State<Arc<AdmissionService<S, D, N>>>,
    Path(student_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    let id = StudentId(student_id);
    match service.applications_for_student(&id).await {
        Ok(applications) => (StatusCode::OK, axum::Json(views(&applications))).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn selection_handler<S, D, N>(
    State(service): State<Arc<AdmissionService<S, D, N>>>,
    axum::Json(request): axum::Json<SelectionRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    match service
        .select_institution(
            &request.student_id,
            &request.application_id,
            &request.institute_id,
        )
        .await
    {
        Ok(outcome) => {
            let view = SelectionView {
                confirmed: outcome.confirmed.view(),
                released: views(&outcome.released),
                promoted: views(&outcome.promoted),
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn institution_applications_handler<S, D, N>(
    State(service): State<Arc<AdmissionService<S, D, N>>>,
    Path(institute_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    let id = InstituteId(institute_id);
    match service.institution_applications(&id).await {
        Ok(applications) => (StatusCode::OK, axum::Json(views(&applications))).into_response(),
        Err(err) => err.into_response(),
    }
}

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdmissionError::Eligibility(_)
            | AdmissionError::InvalidTransition { .. }
            | AdmissionError::NoAdmissionFound
            | AdmissionError::SelectionMismatch => StatusCode::UNPROCESSABLE_ENTITY,
            AdmissionError::ConflictingAdmission => StatusCode::CONFLICT,
            AdmissionError::ApplicationNotFound
            | AdmissionError::UnknownStudent
            | AdmissionError::UnknownCourse => StatusCode::NOT_FOUND,
            AdmissionError::Store(StoreError::Precondition(_))
            | AdmissionError::Store(StoreError::Duplicate) => StatusCode::CONFLICT,
            AdmissionError::Store(StoreError::Unavailable(_))
            | AdmissionError::Directory(DirectoryError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AdmissionError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = axum::Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
