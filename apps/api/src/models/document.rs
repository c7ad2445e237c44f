use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const DEFAULT_FONT_SIZE: u32 = 52;
pub const DEFAULT_BACKGROUND: &str = "#000000";
/// Signature used when the author label is blank.
pub const DEFAULT_AUTHOR: &str = "Anonymous";
pub const MIN_FONT_SIZE: u32 = 8;
pub const MAX_FONT_SIZE: u32 = 200;

/// Range offered by the editor's font-size slider.
pub const EDITOR_FONT_RANGE: (u32, u32) = (40, 72);

/// Background presets offered by the editor: (name, color).
pub const PRESET_BACKGROUNDS: [(&str, &str); 5] = [
    ("Classic black", "#000000"),
    ("Deep sea blue", "#0a192f"),
    ("Forest green", "#0b1a10"),
    ("Dark wine", "#1a0b0b"),
    ("Graphite", "#1a1a1a"),
];

/// A card document as edited by the user. Lives for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub author: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_background")]
    pub background: String,
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

fn hex_color() -> &'static Regex {
    static HEX: OnceLock<Regex> = OnceLock::new();
    HEX.get_or_init(|| {
        Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("hex color pattern is valid")
    })
}

/// Rejects font sizes outside `MIN_FONT_SIZE..=MAX_FONT_SIZE`.
pub fn validate_font_size(font_size: u32) -> Result<(), AppError> {
    if (MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&font_size) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "font_size must be between {MIN_FONT_SIZE} and {MAX_FONT_SIZE} px, got {font_size}"
        )))
    }
}

impl Document {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_font_size(self.font_size)?;
        if !hex_color().is_match(&self.background) {
            return Err(AppError::Validation(format!(
                "background must be a #rgb or #rrggbb color, got {:?}",
                self.background
            )));
        }
        Ok(())
    }

    /// Author label shown on the card, falling back to the default signature.
    pub fn signature(&self) -> &str {
        let author = self.author.trim();
        if author.is_empty() {
            DEFAULT_AUTHOR
        } else {
            author
        }
    }
}
