//! API route handlers

pub mod bonds;
pub mod config;
pub mod health;
pub mod positions;
pub mod resale;

use axum::{routing::get, Router};

use crate::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/bonds", bonds::router())
        .nest("/resale", resale::router())
        .nest("/positions", positions::router())
        .nest("/config", config::router())
        .with_state(state)
}
