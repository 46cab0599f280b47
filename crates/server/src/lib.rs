pub mod handler;
pub mod lifecycle;
mod server;

pub use server::{HttpServer, ServerArgs};

use axum::Router;
use std::time::Instant;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub pid: u32,
    pub start_time: Instant,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            pid: std::process::id(),
            start_time: Instant::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(handler::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
