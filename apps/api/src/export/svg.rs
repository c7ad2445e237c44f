//! Full-resolution card composition as SVG.
//!
//! Positions come from `layout::flow`, so the composed card matches the
//! paginator's measurements exactly. Every word is its own `<text>` element
//! at an absolute x; justified lines are already stretched by the layout.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::layout::canvas::{CanvasConfig, ACCENT_COLOR, QUOTE_RULE_WIDTH, SIGNATURE_COLOR};
use crate::layout::flow::{layout_page, LaidOutBlock};
use crate::layout::font_metrics::{card_metrics, CARD_FONT_FAMILY};
use crate::markdown::Block;
use crate::models::document::Document;

const SIGNATURE_SIZE: f32 = 34.0;
const SIGNATURE_LINE_HEIGHT: f32 = 1.2;
const SIGNATURE_TRACKING: f32 = 0.3;
const SIGNATURE_RULE_WIDTH: f32 = 140.0;
const SIGNATURE_GAP: f32 = 20.0;

/// Composes one page of `doc` as a standalone SVG document.
///
/// Center pages (first and last) are vertically centered above the bottom
/// padding; inner pages start at the canvas top margin.
pub fn compose_page_svg(
    page_text: &str,
    doc: &Document,
    is_center_page: bool,
    canvas: &CanvasConfig,
) -> String {
    let mut svg = String::with_capacity(8 * 1024);
    // Writing to a String cannot fail.
    let _ = compose(&mut svg, page_text, doc, is_center_page, canvas);
    svg
}

fn compose(
    out: &mut String,
    page_text: &str,
    doc: &Document,
    is_center_page: bool,
    canvas: &CanvasConfig,
) -> std::fmt::Result {
    let layout = layout_page(page_text, doc.font_size as f32, canvas);
    let column_top = if is_center_page {
        ((canvas.height - canvas.center_bottom_padding - layout.height) / 2.0).max(0.0)
    } else {
        canvas.top_margin
    };
    let left = canvas.content_left();

    write_background(out, &doc.background, canvas)?;
    for block in &layout.blocks {
        write_block(out, block, left, column_top)?;
    }
    write_signature(out, doc.signature(), canvas)?;
    out.push_str("</svg>");
    Ok(())
}

/// Baseline of a line whose box starts at `top`, with CSS half-leading.
fn baseline_y(top: f32, font_size: f32, line_box: f32) -> f32 {
    let metrics = card_metrics();
    let half_leading = (line_box - font_size * metrics.content_height()) / 2.0;
    top + half_leading + font_size * metrics.ascent
}

fn write_background(out: &mut String, background: &str, canvas: &CanvasConfig) -> std::fmt::Result {
    let (w, h) = (canvas.width, canvas.height);
    let (cx, cy) = (w / 2.0, h / 2.0);
    // "circle at center" gradients extend to the farthest corner.
    let radius = (cx * cx + cy * cy).sqrt();
    write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    )?;
    write!(
        out,
        r##"<defs><radialGradient id="glow" gradientUnits="userSpaceOnUse" cx="{cx}" cy="{cy}" r="{radius}"><stop offset="0" stop-color="#ffffff" stop-opacity="0.15"/><stop offset="0.8" stop-color="#ffffff" stop-opacity="0"/></radialGradient><radialGradient id="vignette" gradientUnits="userSpaceOnUse" cx="{cx}" cy="{cy}" r="{radius}"><stop offset="0" stop-color="#000000" stop-opacity="0"/><stop offset="1" stop-color="#000000" stop-opacity="0.4"/></radialGradient></defs>"##
    )?;
    write!(
        out,
        r#"<rect width="{w}" height="{h}" fill="{}"/><rect width="{w}" height="{h}" fill="url(#glow)"/><rect width="{w}" height="{h}" fill="url(#vignette)"/>"#,
        encode_double_quoted_attribute(background)
    )
}

fn write_block(out: &mut String, block: &LaidOutBlock, left: f32, column_top: f32) -> std::fmt::Result {
    let Some(style) = &block.style else {
        return Ok(());
    };
    let top = column_top + block.top;

    if matches!(block.block, Block::Quote(_)) {
        write!(
            out,
            r##"<rect x="{left}" y="{top}" width="{QUOTE_RULE_WIDTH}" height="{}" fill="#ffffff" fill-opacity="0.2"/>"##,
            block.height
        )?;
    }

    let line_box = style.font_size * style.line_height;
    let font_style = if style.italic { "italic" } else { "normal" };

    for (i, line) in block.lines.iter().enumerate() {
        let baseline = baseline_y(top + i as f32 * line_box, style.font_size, line_box);
        for word in &line.words {
            write!(
                out,
                r#"<text x="{:.2}" y="{:.2}" font-family="{CARD_FONT_FAMILY}" font-size="{}" font-style="{font_style}" font-weight="{}" fill="{}">"#,
                left + word.x,
                baseline,
                style.font_size,
                if style.heavy { 800 } else { 400 },
                style.color
            )?;
            for piece in &word.pieces {
                if piece.bold && !style.heavy {
                    write!(
                        out,
                        r#"<tspan fill="{ACCENT_COLOR}" font-weight="700">{}</tspan>"#,
                        encode_text(&piece.text)
                    )?;
                } else {
                    out.push_str(&encode_text(&piece.text));
                }
            }
            out.push_str("</text>");
        }
    }
    Ok(())
}

fn write_signature(out: &mut String, author: &str, canvas: &CanvasConfig) -> std::fmt::Result {
    let center = canvas.width / 2.0;
    let box_height = SIGNATURE_SIZE * SIGNATURE_LINE_HEIGHT;
    let box_top = canvas.height - canvas.signature_bottom - box_height;
    let baseline = baseline_y(box_top, SIGNATURE_SIZE, box_height);
    let rule_top = box_top - SIGNATURE_GAP - 1.0;

    write!(
        out,
        r##"<rect x="{}" y="{rule_top}" width="{SIGNATURE_RULE_WIDTH}" height="1" fill="#ffffff" fill-opacity="0.2"/>"##,
        center - SIGNATURE_RULE_WIDTH / 2.0
    )?;
    write!(
        out,
        r#"<text x="{center}" y="{baseline:.2}" text-anchor="middle" font-family="{CARD_FONT_FAMILY}" font-size="{SIGNATURE_SIZE}" font-weight="900" letter-spacing="{:.1}" fill="{SIGNATURE_COLOR}">© {}</text>"#,
        SIGNATURE_SIZE * SIGNATURE_TRACKING,
        encode_text(author)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(author: &str) -> Document {
        Document {
            text: String::new(),
            author: author.into(),
            font_size: 52,
            background: "#1a0b0b".into(),
        }
    }

    #[test]
    fn test_svg_has_canvas_size_and_background() {
        let svg = compose_page_svg("hello", &doc("Ada"), true, &CanvasConfig::default());
        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="1080" height="1920""#));
        assert!(svg.contains(r##"fill="#1a0b0b""##));
        assert!(svg.contains(r#"font-family="DejaVu Sans""#));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_signature_uses_author_or_default() {
        let canvas = CanvasConfig::default();
        assert!(compose_page_svg("x", &doc("Ada"), true, &canvas).contains("© Ada</text>"));
        assert!(compose_page_svg("x", &doc("  "), true, &canvas).contains("© Anonymous</text>"));
    }

    #[test]
    fn test_bold_spans_become_accent_tspans() {
        let svg = compose_page_svg("**bold** rest", &doc("A"), true, &CanvasConfig::default());
        assert!(svg.contains(r##"<tspan fill="#FF9500" font-weight="700">bold</tspan>"##));
        assert!(svg.contains(">rest</text>"));
    }

    #[test]
    fn test_quote_draws_left_rule() {
        let svg = compose_page_svg("> quoted", &doc("A"), false, &CanvasConfig::default());
        assert!(svg.contains(r#"<rect x="90" y="180" width="5""#));
        assert!(svg.contains(r#"font-style="italic""#));
    }

    #[test]
    fn test_inner_page_starts_at_top_margin_center_page_is_lower() {
        let canvas = CanvasConfig::default();
        let first_y = |svg: &str| -> f32 {
            let start = svg.find("<text x=").unwrap();
            let y_at = svg[start..].find("y=\"").unwrap() + start + 3;
            let end = svg[y_at..].find('"').unwrap() + y_at;
            svg[y_at..end].parse().unwrap()
        };
        let inner = first_y(&compose_page_svg("short", &doc("A"), false, &canvas));
        let centered = first_y(&compose_page_svg("short", &doc("A"), true, &canvas));
        assert!(inner < 300.0);
        assert!(centered > 600.0);
    }

    #[test]
    fn test_markup_in_text_is_escaped() {
        let svg = compose_page_svg("a < b & c", &doc("<me>"), true, &CanvasConfig::default());
        assert!(svg.contains("&lt;"));
        assert!(svg.contains("&amp;"));
        assert!(svg.contains("© &lt;me&gt;"));
    }
}
