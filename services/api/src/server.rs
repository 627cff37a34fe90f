use crate::cli::ServeArgs;
use crate::infra::{build_analyzer, load_catalog, AppState, InMemoryAlertRepository};
use crate::routes::with_bulletin_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};
use watcher::config::AppConfig;
use watcher::error::AppError;
use watcher::telemetry;
use watcher::workflows::bulletin::BulletinService;
use watcher::workflows::catalog::BudgetCatalog;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = match config.engine.catalog_path.as_deref() {
        Some(path) => load_catalog(path, config.engine.fiscal_year)?,
        None => {
            warn!("WATCHER_CATALOG_PATH not set; serving with an empty budget catalog");
            BudgetCatalog::default()
        }
    };
    let analyzer = build_analyzer(&config.engine, config.engine.synonyms_path.as_deref())?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let programs = catalog.len();
    let repository = Arc::new(InMemoryAlertRepository::default());
    let bulletin_service = Arc::new(BulletinService::new(catalog, analyzer, repository));

    let app = with_bulletin_routes(bulletin_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, programs, "bulletin watcher ready");

    axum::serve(listener, app).await?;
    Ok(())
}
