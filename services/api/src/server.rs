use crate::cli::ServeArgs;
use crate::infra::{load_catalog, AppState};
use crate::routes::with_aid_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use family_aid::aid::AidEstimationService;
use family_aid::config::AppConfig;
use family_aid::error::AppError;
use family_aid::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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
    if let Some(path) = args.programs_csv.take() {
        config.catalog.programs_csv = Some(path);
    }
    if let Some(path) = args.territories_csv.take() {
        config.catalog.territories_csv = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = load_catalog(&config.catalog)?;
    let aid_service = Arc::new(AidEstimationService::new(
        Arc::new(catalog),
        config.engine.clone(),
    ));

    let app = with_aid_routes(aid_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        residual_floor = config.engine.residual_floor,
        "family aid service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
