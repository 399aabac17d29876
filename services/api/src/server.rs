use crate::cli::ServeArgs;
use crate::infra::{build_lead_service, AppState, InMemoryLeadRepository};
use crate::routes::with_lead_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use offer_desk::config::AppConfig;
use offer_desk::error::AppError;
use offer_desk::leads::LeadIntakeService;
use offer_desk::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

fn spawn_retention_purge(service: Arc<LeadIntakeService<InMemoryLeadRepository>>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            if let Err(err) = service.purge_expired(Utc::now()) {
                warn!(error = %err, "lead retention purge failed");
            }
        }
    });
}

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(policy) = args.policy.take() {
        config.valuation.policy_path = Some(policy);
    }
    if let Some(days) = args.retention_days.take().filter(|days| *days > 0) {
        config.valuation.retention_days = days;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let lead_service = Arc::new(build_lead_service(&config.valuation)?);
    info!(
        policy = %lead_service.engine().policy().revision,
        retention_days = config.valuation.retention_days,
        "valuation engine configured"
    );
    spawn_retention_purge(lead_service.clone());

    let app = with_lead_routes(lead_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "offer desk ready");

    axum::serve(listener, app).await?;
    Ok(())
}
