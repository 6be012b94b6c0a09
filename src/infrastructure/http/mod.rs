pub mod request_id;

pub use request_id::request_id_middleware;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::controllers::{health, machine_feed::MachineFeedController};
use crate::infrastructure::config::Config;

/// Build the application router with all routes and layers
pub fn build_router(machine_feed_controller: Arc<MachineFeedController>) -> Router {
    let machine_feed_routes = Router::new()
        .route(
            "/machine-feeds/:machineId",
            get(MachineFeedController::get_feeds),
        )
        .route("/machine-feeds", get(MachineFeedController::missing_machine_id))
        .route("/machine-feeds/", get(MachineFeedController::missing_machine_id))
        .with_state(machine_feed_controller);

    Router::new()
        .route("/health", get(health::health))
        .merge(machine_feed_routes)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http()),
        )
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    machine_feed_controller: Arc<MachineFeedController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(machine_feed_controller);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
