use std::sync::Arc;

use gps_speed::{AppState, config::ServerConfig, create_router, routing::RouteCalculator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gps_speed=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!("distance metric: {:?}", config.metric);

    let state = AppState {
        calculator: Arc::new(RouteCalculator::new(config.metric)),
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("starting backend on http://{}", config.bind_addr);
    tracing::info!("API endpoints:");
    tracing::info!("  POST /api/summary - distance, speed and GPX for a route");
    tracing::info!("  POST /api/points/parse - parse lat,lon lines");
    tracing::info!("  POST /api/report - plain-text results report");
    tracing::info!("  POST /api/map - HTML map of the route");
    axum::serve(listener, app).await?;

    Ok(())
}
