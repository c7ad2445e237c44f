//! On-screen preview markup.
//!
//! The preview embeds the exact SVG the exporter rasterizes, inside a
//! 1080×1920 frame scaled by `CanvasConfig::preview_scale`. Background,
//! signature, column width and vertical centering are therefore identical
//! to the exported PNG.

use crate::export::svg::compose_page_svg;
use crate::layout::canvas::CanvasConfig;
use crate::models::document::Document;

/// Renders one page as a framed HTML fragment.
pub fn render_page_html(
    page_text: &str,
    doc: &Document,
    is_center_page: bool,
    canvas: &CanvasConfig,
) -> String {
    let svg = compose_page_svg(page_text, doc, is_center_page, canvas);
    let scale = canvas.preview_scale;
    format!(
        r#"<div class="card-preview" style="width: {:.1}px; height: {:.1}px; overflow: hidden;"><div class="card-frame" style="width: {}px; height: {}px; transform: scale({scale}); transform-origin: top left;">{svg}</div></div>"#,
        canvas.width * scale,
        canvas.height * scale,
        canvas.width,
        canvas.height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document {
            text: String::new(),
            author: "Ada".into(),
            font_size: 52,
            background: "#0a192f".into(),
        }
    }

    #[test]
    fn test_preview_embeds_the_export_composition() {
        let canvas = CanvasConfig::default();
        let html = render_page_html("hello", &doc(), true, &canvas);
        let svg = compose_page_svg("hello", &doc(), true, &canvas);
        assert!(html.contains(&svg));
    }

    #[test]
    fn test_preview_shows_background_and_signature() {
        let html = render_page_html("hello", &doc(), true, &CanvasConfig::default());
        assert!(html.contains(r##"fill="#0a192f""##));
        assert!(html.contains("© Ada"));
        assert!(html.contains(">hello</text>"));
    }

    #[test]
    fn test_preview_frame_is_scaled_canvas() {
        let html = render_page_html("x", &doc(), false, &CanvasConfig::default());
        assert!(html.contains("width: 1080px; height: 1920px; transform: scale(0.42)"));
    }
}
