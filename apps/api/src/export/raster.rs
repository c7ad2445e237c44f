//! SVG → PNG rasterization (resvg on a tiny-skia pixmap).

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::layout::font_metrics::CARD_FONT_FAMILY;

/// Regular, bold and oblique faces of the card typeface.
const CARD_FONTS: [&[u8]; 4] = [
    include_bytes!("../../assets/fonts/DejaVuSans.ttf"),
    include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf"),
    include_bytes!("../../assets/fonts/DejaVuSans-Oblique.ttf"),
    include_bytes!("../../assets/fonts/DejaVuSans-BoldOblique.ttf"),
];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to parse SVG: {0}")]
    Parse(String),

    #[error("Failed to create a {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },

    #[error("Failed to encode PNG: {0}")]
    Encode(String),

    #[error("Font family '{0}' is not available to the rasterizer")]
    MissingFont(&'static str),
}

/// Font database holding only the embedded card faces.
///
/// Generic `sans-serif` resolves to the card face as well.
pub fn card_font_database() -> Result<fontdb::Database, RenderError> {
    let mut db = fontdb::Database::new();
    for data in CARD_FONTS {
        db.load_font_data(data.to_vec());
    }
    db.set_sans_serif_family(CARD_FONT_FAMILY);

    let query = fontdb::Query {
        families: &[fontdb::Family::Name(CARD_FONT_FAMILY)],
        ..Default::default()
    };
    if db.query(&query).is_none() {
        return Err(RenderError::MissingFont(CARD_FONT_FAMILY));
    }
    Ok(db)
}

/// Renders composed card SVGs to PNG at a fixed device scale.
#[derive(Clone)]
pub struct Rasterizer {
    fontdb: Arc<fontdb::Database>,
    scale: f32,
}

impl Rasterizer {
    /// Card faces plus system fonts and any fonts under `font_dir`.
    ///
    /// The extra faces only serve as glyph fallback (CJK, symbols); layout
    /// always measures with the card face.
    pub fn with_card_fonts(font_dir: Option<&Path>, scale: f32) -> Result<Self, RenderError> {
        let mut db = card_font_database()?;
        let embedded = db.len();
        db.load_system_fonts();
        if let Some(dir) = font_dir {
            db.load_fonts_dir(dir);
        }
        if db.len() == embedded {
            warn!("No fallback fonts found; characters outside {CARD_FONT_FAMILY} will not render");
        }
        info!(
            "Rasterizer font database loaded ({} faces, {} fallback)",
            db.len(),
            db.len() - embedded
        );
        Ok(Self::new(db, scale))
    }

    pub fn new(db: fontdb::Database, scale: f32) -> Self {
        Self {
            fontdb: Arc::new(db),
            scale,
        }
    }

    /// Pixel size of the PNG produced for a canvas of the given logical size.
    pub fn output_size(&self, width: f32, height: f32) -> (u32, u32) {
        (
            (width * self.scale).round() as u32,
            (height * self.scale).round() as u32,
        )
    }

    /// Rasterizes `svg` drawn on a `width × height` logical canvas.
    pub fn render_png(&self, svg: &str, width: f32, height: f32) -> Result<Vec<u8>, RenderError> {
        let options = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };

        let tree =
            usvg::Tree::from_str(svg, &options).map_err(|e| RenderError::Parse(e.to_string()))?;

        let (px_width, px_height) = self.output_size(width, height);
        let mut pixmap = tiny_skia::Pixmap::new(px_width, px_height).ok_or(RenderError::Pixmap {
            width: px_width,
            height: px_height,
        })?;

        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(self.scale, self.scale),
            &mut pixmap.as_mut(),
        );

        pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::svg::compose_page_svg;
    use crate::layout::CanvasConfig;
    use crate::models::document::Document;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn png_dimensions(png: &[u8]) -> (u32, u32) {
        // IHDR width/height follow the 8-byte magic and the 8-byte chunk header.
        let w = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
        let h = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
        (w, h)
    }

    fn text_svg(body: &str) -> String {
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="60" viewBox="0 0 200 60"><rect width="200" height="60" fill="#000000"/>"##
            .to_string()
            + body
            + "</svg>"
    }

    #[test]
    fn test_renders_scaled_png() {
        let rasterizer = Rasterizer::new(fontdb::Database::new(), 2.0);
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10" viewBox="0 0 20 10"><rect width="20" height="10" fill="#0a192f"/></svg>"##;
        let png = rasterizer.render_png(svg, 20.0, 10.0).unwrap();
        assert_eq!(png[..8], PNG_MAGIC);
        assert_eq!(png_dimensions(&png), (40, 20));
    }

    #[test]
    fn test_invalid_svg_is_parse_error() {
        let rasterizer = Rasterizer::new(fontdb::Database::new(), 1.0);
        let err = rasterizer.render_png("<svg", 10.0, 10.0).unwrap_err();
        assert!(matches!(err, RenderError::Parse(_)));
    }

    #[test]
    fn test_zero_sized_canvas_is_pixmap_error() {
        let rasterizer = Rasterizer::new(fontdb::Database::new(), 1.0);
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"></svg>"#;
        let err = rasterizer.render_png(svg, 0.0, 10.0).unwrap_err();
        assert!(matches!(err, RenderError::Pixmap { .. }));
    }

    #[test]
    fn test_card_database_resolves_named_and_generic_family() {
        let rasterizer = Rasterizer::new(card_font_database().unwrap(), 1.0);
        let blank = rasterizer.render_png(&text_svg(""), 200.0, 60.0).unwrap();
        for family in ["DejaVu Sans", "sans-serif"] {
            let svg = text_svg(&format!(
                r##"<text x="10" y="40" font-family="{family}" font-size="30" fill="#ffffff">Hello</text>"##
            ));
            let png = rasterizer.render_png(&svg, 200.0, 60.0).unwrap();
            assert_ne!(png, blank, "{family} text was not drawn");
        }
    }

    #[test]
    fn test_composed_page_text_reaches_png() {
        let rasterizer = Rasterizer::new(card_font_database().unwrap(), 0.25);
        let canvas = CanvasConfig::default();
        let doc = Document {
            text: String::new(),
            author: "Ada".into(),
            font_size: 52,
            background: "#000000".into(),
        };
        let render = |text: &str| {
            let svg = compose_page_svg(text, &doc, true, &canvas);
            rasterizer.render_png(&svg, canvas.width, canvas.height).unwrap()
        };
        assert_ne!(render("# Title\n\nhello world"), render(""));
    }

    #[test]
    fn test_empty_database_drops_text() {
        // Without the card faces usvg silently skips every <text> node.
        let rasterizer = Rasterizer::new(fontdb::Database::new(), 1.0);
        let blank = rasterizer.render_png(&text_svg(""), 200.0, 60.0).unwrap();
        let svg = text_svg(r##"<text x="10" y="40" font-size="30" fill="#ffffff">Hello</text>"##);
        assert_eq!(rasterizer.render_png(&svg, 200.0, 60.0).unwrap(), blank);
    }
}
