mod cards;
mod config;
mod errors;
mod export;
mod layout;
mod llm_client;
mod markdown;
mod models;
mod optimize;
mod rate_limit;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::export::gate::JobGate;
use crate::export::raster::Rasterizer;
use crate::export::Exporter;
use crate::layout::CanvasConfig;
use crate::llm_client::{LlmClient, Rewriter};
use crate::rate_limit::FixedWindowLimiter;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting quote card API v{}", env!("CARGO_PKG_VERSION"));

    // Upstream rewrite client. A missing key only fails /api/optimize calls.
    let llm = LlmClient::new(config.deepseek_api_url.clone(), config.deepseek_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    if config.deepseek_api_key.is_none() {
        tracing::warn!("DEEPSEEK_API_KEY is not set; rewrite requests will fail");
    }
    let rewriter: Arc<dyn Rewriter> = Arc::new(llm);

    let limiter = Arc::new(FixedWindowLimiter::new(
        config.rate_limit_max_requests,
        config.rate_limit_window,
    ));
    info!(
        "Rate limit: {} requests per {}s ({:?} client keys)",
        limiter.max_requests(),
        limiter.window().as_secs(),
        config.client_key_source
    );
    spawn_limiter_sweep(limiter.clone(), config.rate_limit_sweep_interval);

    // Font loading touches the filesystem; do it before serving.
    let canvas = CanvasConfig::default();
    let font_dir = config.font_dir.clone();
    let scale = canvas.device_scale;
    let rasterizer = tokio::task::spawn_blocking(move || {
        Rasterizer::with_card_fonts(font_dir.as_deref(), scale)
    })
    .await??;
    let exporter = Exporter::new(Arc::new(rasterizer), canvas.clone(), config.export_page_delay);
    info!(
        "Card canvas {}x{} at {}x device scale",
        canvas.width, canvas.height, canvas.device_scale
    );

    let state = AppState {
        config: config.clone(),
        rewriter,
        limiter,
        optimize_gate: Arc::new(JobGate::new()),
        export_gate: Arc::new(JobGate::new()),
        exporter,
        canvas,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Periodically drops limiter entries whose window has elapsed.
fn spawn_limiter_sweep(limiter: Arc<FixedWindowLimiter>, every: std::time::Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = limiter.sweep_expired();
            if removed > 0 {
                debug!(removed, remaining = limiter.client_count(), "Swept expired rate-limit entries");
            }
        }
    });
}
