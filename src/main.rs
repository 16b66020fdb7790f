use activity_map::{
    load_activities, load_config, resolve_config_path, resolve_data_path, router, scene,
    AppState, DateFilter,
};
use std::{env, net::SocketAddr};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = load_config(&resolve_config_path()).await;
    let activities = load_activities(&resolve_data_path()).await;
    let globals = scene::build_scene(&activities, &config)?;

    let mut alerts: Vec<String> = Vec::new();
    let filter = DateFilter::from_globals(globals, config.filter.grouped, &mut alerts);
    if filter.as_ref().is_some_and(|filter| !filter.is_enabled()) {
        warn!("date filtering disabled, showing all activities");
    }
    let state = AppState::new(filter, alerts);

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
