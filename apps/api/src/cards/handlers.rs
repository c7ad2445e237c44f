//! Axum route handlers for the card API.

use std::net::SocketAddr;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        ConnectInfo, Path, State,
    },
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::export::is_center_page;
use crate::export::preview::render_page_html;
use crate::layout::{paginate, CanvasConfig};
use crate::models::document::{
    validate_font_size, Document, DEFAULT_FONT_SIZE, EDITOR_FONT_RANGE, PRESET_BACKGROUNDS,
};
use crate::rate_limit::client_key::client_key;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PaginateRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

#[derive(Debug, Serialize)]
pub struct PaginateResponse {
    pub pages: Vec<String>,
    pub page_count: usize,
}

#[derive(Debug, Serialize)]
pub struct PreviewPage {
    pub index: usize,
    pub text: String,
    pub html: String,
    pub is_center_page: bool,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub pages: Vec<PreviewPage>,
    pub page_count: usize,
    pub preview_scale: f32,
    pub canvas_width: f32,
    pub canvas_height: f32,
}

#[derive(Debug, Serialize)]
pub struct ExportedFile {
    pub index: usize,
    pub filename: String,
    pub png_base64: String,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub files: Vec<ExportedFile>,
}

#[derive(Debug, Serialize)]
pub struct BackgroundPreset {
    pub name: &'static str,
    pub value: &'static str,
}

#[derive(Debug, Serialize)]
pub struct FontSizeRange {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

#[derive(Debug, Serialize)]
pub struct PresetsResponse {
    pub backgrounds: Vec<BackgroundPreset>,
    pub font_size: FontSizeRange,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/paginate
pub async fn handle_paginate(
    State(state): State<AppState>,
    payload: Result<Json<PaginateRequest>, JsonRejection>,
) -> Result<Json<PaginateResponse>, AppError> {
    let Json(request) = payload?;
    validate_font_size(request.font_size)?;
    let pages = paginate_blocking(request.text, request.font_size, state.canvas.clone()).await?;
    Ok(Json(PaginateResponse {
        page_count: pages.len(),
        pages,
    }))
}

/// POST /api/v1/preview
///
/// Paginates the document and returns the framed preview card of every page.
pub async fn handle_preview(
    State(state): State<AppState>,
    payload: Result<Json<Document>, JsonRejection>,
) -> Result<Json<PreviewResponse>, AppError> {
    let Json(doc) = payload?;
    doc.validate()?;
    let pages = paginate_blocking(doc.text.clone(), doc.font_size, state.canvas.clone()).await?;
    let page_count = pages.len();

    let pages = pages
        .into_iter()
        .enumerate()
        .map(|(index, text)| {
            let center = is_center_page(index, page_count);
            PreviewPage {
                index,
                html: render_page_html(&text, &doc, center, &state.canvas),
                is_center_page: center,
                text,
            }
        })
        .collect();

    Ok(Json(PreviewResponse {
        pages,
        page_count,
        preview_scale: state.canvas.preview_scale,
        canvas_width: state.canvas.width,
        canvas_height: state.canvas.height,
    }))
}

/// POST /api/v1/export
///
/// Renders every page to PNG, one after another. Each client runs at most
/// one batch at a time; a request arriving during its own batch gets 409.
pub async fn handle_export(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: Result<Json<Document>, JsonRejection>,
) -> Result<Json<ExportResponse>, AppError> {
    let Json(doc) = payload?;
    doc.validate()?;
    let key = client_key(
        state.config.client_key_source,
        &headers,
        peer.map(|ConnectInfo(addr)| addr),
    );
    let _running = state
        .export_gate
        .try_begin(&key)
        .map_err(|_| AppError::Busy("An export is already in progress".to_string()))?;

    let pages = paginate_blocking(doc.text.clone(), doc.font_size, state.canvas.clone()).await?;
    let exported = state.exporter.export_batch(&doc, &pages).await?;

    let engine = base64::engine::general_purpose::STANDARD;
    let files = exported
        .into_iter()
        .map(|page| ExportedFile {
            index: page.index,
            filename: page.filename,
            png_base64: engine.encode(&page.png),
        })
        .collect();

    Ok(Json(ExportResponse { files }))
}

/// POST /api/v1/export/pages/:index
///
/// Renders a single page (zero-based) and returns it as a PNG download.
pub async fn handle_export_page(
    State(state): State<AppState>,
    index: Result<Path<usize>, PathRejection>,
    payload: Result<Json<Document>, JsonRejection>,
) -> Result<Response, AppError> {
    let Path(index) = index
        .map_err(|e| AppError::Validation(format!("Invalid page index: {}", e.body_text())))?;
    let Json(doc) = payload?;
    doc.validate()?;
    let pages = paginate_blocking(doc.text.clone(), doc.font_size, state.canvas.clone()).await?;
    let page = state.exporter.render_page(&doc, &pages, index).await?;

    let disposition = format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(&page.filename)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        page.png,
    )
        .into_response())
}

/// GET /api/v1/presets
pub async fn handle_presets() -> Json<PresetsResponse> {
    Json(PresetsResponse {
        backgrounds: PRESET_BACKGROUNDS
            .iter()
            .map(|&(name, value)| BackgroundPreset { name, value })
            .collect(),
        font_size: FontSizeRange {
            min: EDITOR_FONT_RANGE.0,
            max: EDITOR_FONT_RANGE.1,
            default: DEFAULT_FONT_SIZE,
        },
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// Pagination lays out every candidate page; keep it off the async executor.
async fn paginate_blocking(
    text: String,
    font_size: u32,
    canvas: CanvasConfig,
) -> Result<Vec<String>, AppError> {
    tokio::task::spawn_blocking(move || paginate(&text, font_size, &canvas))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in pagination: {e}")))
}
