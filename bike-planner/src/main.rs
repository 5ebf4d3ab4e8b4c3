use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bike_planner::cache::{CachedRoutingProvider, RouteCacheConfig};
use bike_planner::config::ServerConfig;
use bike_planner::planner::{PlannerConfig, RoutePlanner};
use bike_planner::routing::OrsClient;
use bike_planner::stations::InMemoryStationStore;
use bike_planner::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bike_planner=info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    // Load the station snapshot (fail fast if unavailable)
    let mut store = InMemoryStationStore::from_json_file(&config.stations_file)?;
    if let Some(max_age) = config.station_max_age {
        store = store.with_max_snapshot_age(max_age);
    }
    let count = store.len().await;
    info!(path = %config.stations_file.display(), stations = count, "loaded station snapshot");

    // Periodically reload the snapshot; a failed reload keeps the old one
    if let Some(period) = config.station_refresh {
        let store = store.clone();
        let path = config.stations_file.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await; // First tick is immediate, skip it
            loop {
                interval.tick().await;
                if let Err(e) = store.reload(&path).await {
                    warn!(path = %path.display(), error = %e, "failed to reload station snapshot");
                }
            }
        });
    }

    let ors = OrsClient::new(config.ors)?;
    let routing = CachedRoutingProvider::new(ors, &RouteCacheConfig::default());
    let planner = RoutePlanner::new(store, routing, PlannerConfig::default());

    let app = create_router(AppState::new(planner));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "bike planner listening");
    info!("  GET  /health              - Health check");
    info!("  GET  /stations/bikes      - Nearest stations with bikes");
    info!("  GET  /stations/docks      - Nearest stations with free docks");
    info!("  POST /route/plan          - Plan a route");
    info!("  POST /route/plan/geojson  - Plan a route as GeoJSON");

    axum::serve(listener, app).await?;
    Ok(())
}
