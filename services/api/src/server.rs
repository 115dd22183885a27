use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryMarketplace};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use rx_exchange::config::AppConfig;
use rx_exchange::error::AppError;
use rx_exchange::telemetry;
use rx_exchange::workflows::listing::BoardQuery;
use rx_exchange::workflows::memory::StaticIdentity;
use rx_exchange::workflows::router::MarketplaceState;
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
    if let Some(path) = args.catalog_csv.take() {
        config.marketplace.catalog_csv = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let market = InMemoryMarketplace::build(&config.marketplace, StaticIdentity::signed_out())?;
    let ports = market.ports();
    let board = BoardQuery::new(
        ports.catalog.clone(),
        ports.listings.clone(),
        config.marketplace.board_settings(),
    );
    let state = MarketplaceState::new(&ports, board, config.marketplace.search_limit);

    let app = with_service_routes(state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        products = market.catalog.len(),
        "surplus medicine exchange ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
