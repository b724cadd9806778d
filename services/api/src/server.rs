use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_prediction_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use loan_approval::config::{AppConfig, AppEnvironment};
use loan_approval::error::AppError;
use loan_approval::prediction::{Artifacts, LoanPredictionService, NoticeSigner};
use loan_approval::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    if config.environment == AppEnvironment::Production && config.uses_default_secret() {
        warn!("APP_SECRET_KEY is unset; notices are signed with the built-in development key");
    }

    let artifacts = Artifacts::load(&config.artifacts);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        degraded: artifacts.unavailable_reason().map(Arc::from),
    };

    let service = Arc::new(LoanPredictionService::new(artifacts));
    let notices = NoticeSigner::new(&config.secret_key);

    let app = with_prediction_routes(service, notices)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, debug = config.debug, %addr, "loan approval service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
