use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryChildRepository, InMemorySettingsRepository};
use crate::routes::with_progress_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use progress_tracker::config::AppConfig;
use progress_tracker::error::AppError;
use progress_tracker::telemetry;
use progress_tracker::workflows::progress::{DataSnapshot, ProgressService};
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

    let progress_service = Arc::new(ProgressService::new(
        Arc::new(InMemoryChildRepository::default()),
        Arc::new(InMemorySettingsRepository::default()),
    ));

    if let Some(path) = &config.data.snapshot_path {
        let resolved = DataSnapshot::from_path(path)?;
        info!(
            path = %path.display(),
            migrated = resolved.migrated,
            children = resolved.snapshot.children.len(),
            "loaded data snapshot"
        );
        progress_service.seed(resolved.snapshot)?;
    }

    let app = with_progress_routes(progress_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "progress tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}
