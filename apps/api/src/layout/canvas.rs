//! Card canvas geometry and per-block typography.
//!
//! All values are logical pixels on the 1080×1920 export canvas. The
//! paginator and the SVG composer both read from here.

use serde::Serialize;

use crate::markdown::Block;

/// Fixed geometry of a quote card.
#[derive(Debug, Clone, Serialize)]
pub struct CanvasConfig {
    pub width: f32,
    pub height: f32,
    /// Width of the text column, centered horizontally.
    pub content_width: f32,
    /// Height budget a page's blocks may occupy.
    pub max_content_height: f32,
    /// Top offset of the text column on inner (non-centered) pages.
    pub top_margin: f32,
    /// Space reserved under the text column on centered pages.
    pub center_bottom_padding: f32,
    /// Distance from the bottom edge to the signature baseline box.
    pub signature_bottom: f32,
    /// Rasterization scale: 2.0 doubles the pixel count of the PNG.
    pub device_scale: f32,
    /// Scale the client applies to show a full canvas on screen.
    pub preview_scale: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1080.0,
            height: 1920.0,
            content_width: 900.0,
            max_content_height: 1100.0,
            top_margin: 180.0,
            center_bottom_padding: 200.0,
            signature_bottom: 120.0,
            device_scale: 2.0,
            preview_scale: 0.42,
        }
    }
}

impl CanvasConfig {
    /// Left edge of the text column.
    pub fn content_left(&self) -> f32 {
        (self.width - self.content_width) / 2.0
    }
}

/// Horizontal alignment of a block's lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    Justify,
}

/// Typography of one block kind at a given base font size.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStyle {
    pub font_size: f32,
    /// Multiple of `font_size`.
    pub line_height: f32,
    pub margin_bottom: f32,
    /// Left inset of the text from the column edge.
    pub indent: f32,
    pub align: Align,
    pub italic: bool,
    pub heavy: bool,
    pub color: &'static str,
}

pub const ACCENT_COLOR: &str = "#FF9500";
pub const BODY_COLOR: &str = "#e5e5e5";
pub const QUOTE_COLOR: &str = "#aaaaaa";
pub const LIST_COLOR: &str = "#ffffff";
pub const SIGNATURE_COLOR: &str = "#e5e5e5";

pub const SPACER_HEIGHT: f32 = 24.0;
pub const HEADING_SCALE: f32 = 1.4;
pub const QUOTE_SCALE: f32 = 0.95;
/// Width of the rule drawn left of quotes.
pub const QUOTE_RULE_WIDTH: f32 = 5.0;
pub const BULLET_PREFIX: &str = "• ";

/// Style of `block` at base size `base`. Spacers have no text style.
pub fn block_style(block: &Block, base: f32) -> Option<BlockStyle> {
    let style = match block {
        Block::Spacer => return None,
        Block::Heading(_) => BlockStyle {
            font_size: base * HEADING_SCALE,
            line_height: 1.3,
            margin_bottom: 32.0,
            indent: 0.0,
            align: Align::Center,
            italic: false,
            heavy: true,
            color: ACCENT_COLOR,
        },
        Block::Quote(_) => BlockStyle {
            font_size: base * QUOTE_SCALE,
            line_height: 1.7,
            margin_bottom: 24.0,
            indent: 28.0 + QUOTE_RULE_WIDTH,
            align: Align::Justify,
            italic: true,
            heavy: false,
            color: QUOTE_COLOR,
        },
        Block::ListItem(_) => BlockStyle {
            font_size: base,
            line_height: 1.8,
            margin_bottom: 16.0,
            indent: 20.0,
            align: Align::Left,
            italic: false,
            heavy: false,
            color: LIST_COLOR,
        },
        Block::Paragraph(_) => BlockStyle {
            font_size: base,
            line_height: 1.8,
            margin_bottom: 24.0,
            indent: 0.0,
            align: Align::Justify,
            italic: false,
            heavy: false,
            color: BODY_COLOR,
        },
    };
    Some(style)
}
