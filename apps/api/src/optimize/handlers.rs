//! Axum route handler for the rewrite proxy.

use std::net::SocketAddr;

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::rate_limit::client_key::client_key;
use crate::rate_limit::RateLimitDecision;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    #[serde(rename = "optimizedText")]
    pub optimized_text: String,
}

/// POST /api/optimize
///
/// Counts the request against the caller's quota, then rewrites `text` into
/// card markdown. The quota is checked before the body is validated, so
/// malformed requests also count. A client with a rewrite already in flight
/// gets 409.
pub async fn handle_optimize(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: Result<Json<OptimizeRequest>, JsonRejection>,
) -> Result<Json<OptimizeResponse>, AppError> {
    let key = client_key(
        state.config.client_key_source,
        &headers,
        peer.map(|ConnectInfo(addr)| addr),
    );

    match state.limiter.check(&key) {
        RateLimitDecision::Rejected { retry_after } => {
            warn!(client = %key, "Rewrite request rate-limited");
            return Err(AppError::RateLimited {
                limit: state.limiter.max_requests(),
                retry_after_secs: retry_after.as_secs().max(1),
            });
        }
        RateLimitDecision::Allowed { count, remaining } => {
            debug!(client = %key, count, remaining, "Rewrite request admitted");
        }
    }

    let Json(request) = payload?;

    let text = request
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("text is required".to_string()))?;

    let _running = state
        .optimize_gate
        .try_begin(&key)
        .map_err(|_| AppError::Busy("A rewrite is already in progress".to_string()))?;

    let optimized_text = state.rewriter.rewrite(&text).await?;

    Ok(Json(OptimizeResponse { optimized_text }))
}
