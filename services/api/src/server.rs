use crate::cli::ServeArgs;
use crate::infra::{seed_directory, AppState};
use crate::routes::ops_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use gradbridge::config::AppConfig;
use gradbridge::error::AppError;
use gradbridge::memory::{
    MemoryApplicationStore, MemoryDirectory, MemoryJobBoard, MemoryNotifications,
};
use gradbridge::telemetry;
use gradbridge::workflows::admissions::{admission_router, AdmissionService};
use gradbridge::workflows::recruitment::{recruitment_router, RecruitmentService};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let directory = Arc::new(MemoryDirectory::default());
    if config.seed_demo_data && !args.no_seed {
        seed_directory(&directory);
    }
    let applications = Arc::new(MemoryApplicationStore::default());
    let job_board = Arc::new(MemoryJobBoard::default());
    let notifications = Arc::new(MemoryNotifications::default());

    let admissions = Arc::new(AdmissionService::new(
        applications,
        directory.clone(),
        notifications.clone(),
    ));
    let recruitment = Arc::new(RecruitmentService::new(job_board, directory, notifications));

    let app = admission_router(admissions)
        .merge(recruitment_router(recruitment))
        .merge(ops_router())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(environment = %config.environment, %addr, "admissions and recruitment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
