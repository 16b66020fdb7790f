use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/slider", get(handlers::get_slider))
        .route("/api/range/update", post(handlers::range_update))
        .route("/api/range/set", post(handlers::range_set))
        .route("/api/layers", get(handlers::get_layers))
        .route("/api/overlays/:name", post(handlers::set_overlay))
        .route("/api/alerts", get(handlers::get_alerts))
        .with_state(state)
}
