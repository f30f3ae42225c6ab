use crate::cli::ServeArgs;
use crate::infra::{AppState, SiteServices};
use crate::routes::with_ops_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use estate_desk::config::AppConfig;
use estate_desk::error::AppError;
use estate_desk::listings::ListingImporter;
use estate_desk::telemetry;
use std::sync::atomic::Ordering;
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
    if let Some(listings) = args.listings.take() {
        config.site.listings_csv = Some(listings);
    }

    telemetry::init(&config.telemetry)?;

    let listings = match &config.site.listings_csv {
        Some(path) => ListingImporter::from_path(path)?,
        None => {
            warn!("no listings CSV configured; catalog starts empty");
            Vec::new()
        }
    };

    let services = SiteServices::in_memory(listings, &config.site.operations_email);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_ops_routes(services.router())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "estate desk listening");

    axum::serve(listener, app).await?;
    Ok(())
}
