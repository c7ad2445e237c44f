pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::cards::handlers as cards;
use crate::optimize::handlers as optimize;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Rewrite proxy
        .route("/api/optimize", post(optimize::handle_optimize))
        // Card API
        .route("/api/v1/presets", get(cards::handle_presets))
        .route("/api/v1/paginate", post(cards::handle_paginate))
        .route("/api/v1/preview", post(cards::handle_preview))
        .route("/api/v1/export", post(cards::handle_export))
        .route(
            "/api/v1/export/pages/:index",
            post(cards::handle_export_page),
        )
        .with_state(state)
}
