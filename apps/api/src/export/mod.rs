//! Card export: compose each page as SVG, rasterize it to PNG.
//!
//! Batches run strictly in page order. Rasterization is CPU-bound and runs
//! inside `tokio::task::spawn_blocking`; page i+1 is not started until page
//! i has been encoded, and a fixed delay separates consecutive pages. The
//! first failure aborts the remaining pages.

pub mod gate;
pub mod preview;
pub mod raster;
pub mod svg;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::layout::canvas::CanvasConfig;
use crate::models::document::Document;

use raster::Rasterizer;
use svg::compose_page_svg;

/// One rendered page.
#[derive(Debug, Clone, Serialize)]
pub struct ExportedPage {
    /// Zero-based page index.
    pub index: usize,
    pub filename: String,
    #[serde(skip)]
    pub png: Vec<u8>,
}

/// First and last pages are laid out vertically centered.
pub fn is_center_page(index: usize, page_count: usize) -> bool {
    index == 0 || index + 1 == page_count
}

/// `quote_{author}_{n}.png` with a 1-based page number.
///
/// Path separators, control characters and characters reserved on common
/// filesystems are replaced with `_`.
pub fn export_filename(author: &str, index: usize) -> String {
    let author: String = author
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("quote_{}_{}.png", author.trim(), index + 1)
}

#[derive(Clone)]
pub struct Exporter {
    rasterizer: Arc<Rasterizer>,
    canvas: CanvasConfig,
    page_delay: Duration,
}

impl Exporter {
    pub fn new(rasterizer: Arc<Rasterizer>, canvas: CanvasConfig, page_delay: Duration) -> Self {
        Self {
            rasterizer,
            canvas,
            page_delay,
        }
    }

    /// Renders page `index` of `pages`.
    pub async fn render_page(
        &self,
        doc: &Document,
        pages: &[String],
        index: usize,
    ) -> Result<ExportedPage, AppError> {
        let page = pages
            .get(index)
            .ok_or_else(|| AppError::NotFound(format!("Page {} does not exist", index + 1)))?;

        let started = Instant::now();
        let svg = compose_page_svg(page, doc, is_center_page(index, pages.len()), &self.canvas);
        let rasterizer = self.rasterizer.clone();
        let (width, height) = (self.canvas.width, self.canvas.height);

        let png = tokio::task::spawn_blocking(move || rasterizer.render_png(&svg, width, height))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in export: {e}")))?
            .map_err(|e| AppError::Render(e.to_string()))?;

        debug!(
            page = index + 1,
            bytes = png.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Rasterized card page"
        );

        Ok(ExportedPage {
            index,
            filename: export_filename(doc.signature(), index),
            png,
        })
    }

    /// Renders every page in order, pausing `page_delay` between pages.
    pub async fn export_batch(
        &self,
        doc: &Document,
        pages: &[String],
    ) -> Result<Vec<ExportedPage>, AppError> {
        let mut exported = Vec::with_capacity(pages.len());

        for index in 0..pages.len() {
            if index > 0 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
            let page = self.render_page(doc, pages, index).await.map_err(|e| {
                warn!(
                    completed = exported.len(),
                    total = pages.len(),
                    "Export aborted: {e}"
                );
                e
            })?;
            exported.push(page);
        }

        Ok(exported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exporter(delay: Duration) -> Exporter {
        // Quarter scale keeps test pixmaps small.
        let rasterizer = Rasterizer::new(fontdb::Database::new(), 0.25);
        Exporter::new(Arc::new(rasterizer), CanvasConfig::default(), delay)
    }

    fn doc() -> Document {
        Document {
            text: String::new(),
            author: "Ada".into(),
            font_size: 52,
            background: "#000000".into(),
        }
    }

    #[test]
    fn test_center_pages_are_first_and_last() {
        assert!(is_center_page(0, 1));
        assert!(is_center_page(0, 3));
        assert!(!is_center_page(1, 3));
        assert!(is_center_page(2, 3));
    }

    #[test]
    fn test_filename_is_one_based_and_sanitized() {
        assert_eq!(export_filename("Ada", 0), "quote_Ada_1.png");
        assert_eq!(export_filename("a/b:c", 4), "quote_a_b_c_5.png");
    }

    #[tokio::test]
    async fn test_batch_renders_pages_in_order() {
        let pages = vec!["# One".to_string(), "two".to_string(), "three".to_string()];
        let rasterizer = Rasterizer::new(raster::card_font_database().unwrap(), 0.25);
        let exporter = Exporter::new(Arc::new(rasterizer), CanvasConfig::default(), Duration::ZERO);
        let files = exporter.export_batch(&doc(), &pages).await.unwrap();
        let indices: Vec<usize> = files.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(files[2].filename, "quote_Ada_3.png");
        assert!(files.iter().all(|f| f.png.starts_with(b"\x89PNG")));
        // Different text per page must give different images.
        assert_ne!(files[1].png, files[2].png);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_waits_between_pages() {
        let pages = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let started = tokio::time::Instant::now();
        exporter(Duration::from_millis(600))
            .export_batch(&doc(), &pages)
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1200));
    }

    #[tokio::test]
    async fn test_missing_page_is_not_found() {
        let pages = vec!["only".to_string()];
        let err = exporter(Duration::ZERO)
            .render_page(&doc(), &pages, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_render_failure_aborts_batch() {
        let pages = vec!["a".to_string(), "b".to_string()];
        let broken = Exporter::new(
            Arc::new(Rasterizer::new(fontdb::Database::new(), 0.0)),
            CanvasConfig::default(),
            Duration::ZERO,
        );
        let err = broken.export_batch(&doc(), &pages).await.unwrap_err();
        assert!(matches!(err, AppError::Render(_)));
    }
}
