pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod services;
pub mod validation;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use services::EntityBroker;

// Application state
pub struct AppState {
    pub broker: EntityBroker,
}

impl AppState {
    pub fn new(broker: EntityBroker) -> Self {
        Self { broker }
    }
}

// Public function to create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/direct/{*path}", get(handlers::direct::resolve))
        .route("/describe", get(handlers::direct::describe))
        .route("/url", get(handlers::direct::entity_url))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
