//! Deterministic block flow: line breaking, alignment and vertical stacking.
//!
//! Words are broken greedily on whitespace; every wide (CJK) character is
//! its own breakable unit. A word wider than the column is split between
//! characters. Block heights are `lines × font_size × line_height` plus the
//! block's bottom margin, stacked without collapsing.

use serde::Serialize;

use crate::layout::canvas::{block_style, Align, BlockStyle, CanvasConfig, BULLET_PREFIX, SPACER_HEIGHT};
use crate::layout::font_metrics::{card_metrics, is_wide, FontMetricTable, Weight};
use crate::markdown::{parse_blocks, Block, Span};

/// Uniformly styled part of a word.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Piece {
    pub text: String,
    pub bold: bool,
}

/// A word positioned on its line. `x` is relative to the column's left edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedWord {
    pub pieces: Vec<Piece>,
    pub x: f32,
    pub width: f32,
}

impl PlacedWord {
    pub fn text(&self) -> String {
        self.pieces.iter().map(|p| p.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub words: Vec<PlacedWord>,
    /// Natural width before justification.
    pub width: f32,
}

/// A block with its resolved position inside the column.
#[derive(Debug, Clone)]
pub struct LaidOutBlock {
    pub block: Block,
    pub style: Option<BlockStyle>,
    /// Offset from the top of the column.
    pub top: f32,
    /// Height of the text box, excluding the bottom margin.
    pub height: f32,
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone)]
pub struct PageLayout {
    pub blocks: Vec<LaidOutBlock>,
    /// Total height including bottom margins.
    pub height: f32,
}

#[derive(Debug, Clone)]
struct Word {
    pieces: Vec<Piece>,
    width: f32,
    space_before: bool,
}

/// Lays out a page's markdown text inside the card column.
pub fn layout_page(text: &str, base_font_size: f32, canvas: &CanvasConfig) -> PageLayout {
    let metrics = card_metrics();
    let mut blocks = Vec::new();
    let mut cursor = 0.0_f32;

    for block in parse_blocks(text) {
        let Some(style) = block_style(&block, base_font_size) else {
            blocks.push(LaidOutBlock {
                block,
                style: None,
                top: cursor,
                height: SPACER_HEIGHT,
                lines: Vec::new(),
            });
            cursor += SPACER_HEIGHT;
            continue;
        };

        let spans = block_spans(&block);
        let available = (canvas.content_width - style.indent).max(style.font_size);
        let words = tokenize(&spans, &style, metrics);
        let lines = break_lines(words, available, &style, metrics);
        let height = lines.len() as f32 * style.font_size * style.line_height;

        blocks.push(LaidOutBlock {
            block,
            top: cursor,
            height,
            lines,
            style: Some(style.clone()),
        });
        cursor += height + style.margin_bottom;
    }

    PageLayout {
        blocks,
        height: cursor,
    }
}

/// Height of a page's content; what the paginator compares against the budget.
pub fn measure_height(text: &str, base_font_size: f32, canvas: &CanvasConfig) -> f32 {
    layout_page(text, base_font_size, canvas).height
}

fn block_spans(block: &Block) -> Vec<Span> {
    match block {
        Block::Spacer => Vec::new(),
        Block::Heading(title) => vec![Span::plain(title.as_str())],
        Block::ListItem(item) => vec![Span::plain(format!("{BULLET_PREFIX}{item}"))],
        Block::Quote(spans) | Block::Paragraph(spans) => spans.clone(),
    }
}

fn weight_of(bold: bool, style: &BlockStyle) -> Weight {
    if bold || style.heavy {
        Weight::Bold
    } else {
        Weight::Regular
    }
}

fn piece_width(piece: &Piece, style: &BlockStyle, metrics: &FontMetricTable) -> f32 {
    metrics.measure_px(&piece.text, style.font_size, weight_of(piece.bold, style))
}

/// Splits spans into breakable words. Whitespace runs collapse to one gap.
fn tokenize(spans: &[Span], style: &BlockStyle, metrics: &FontMetricTable) -> Vec<Word> {
    let mut words: Vec<Word> = Vec::new();
    let mut current: Option<Word> = None;
    let mut pending_space = false;

    let flush = |current: &mut Option<Word>, words: &mut Vec<Word>| {
        if let Some(mut word) = current.take() {
            word.width = word.pieces.iter().map(|p| piece_width(p, style, metrics)).sum();
            words.push(word);
        }
    };

    for span in spans {
        for c in span.text.chars() {
            if c.is_whitespace() {
                flush(&mut current, &mut words);
                pending_space = !words.is_empty();
            } else if is_wide(c) {
                flush(&mut current, &mut words);
                current = Some(Word {
                    pieces: vec![Piece {
                        text: c.to_string(),
                        bold: span.bold,
                    }],
                    width: 0.0,
                    space_before: pending_space,
                });
                flush(&mut current, &mut words);
                pending_space = false;
            } else {
                let word = current.get_or_insert_with(|| {
                    let word = Word {
                        pieces: Vec::new(),
                        width: 0.0,
                        space_before: pending_space,
                    };
                    pending_space = false;
                    word
                });
                match word.pieces.last_mut() {
                    Some(last) if last.bold == span.bold => last.text.push(c),
                    _ => word.pieces.push(Piece {
                        text: c.to_string(),
                        bold: span.bold,
                    }),
                }
            }
        }
    }
    flush(&mut current, &mut words);
    words
}

/// Breaks a word that cannot fit on any line into single characters.
fn split_oversized(word: Word, style: &BlockStyle, metrics: &FontMetricTable) -> Vec<Word> {
    let mut parts = Vec::new();
    for piece in word.pieces {
        for c in piece.text.chars() {
            let piece = Piece {
                text: c.to_string(),
                bold: piece.bold,
            };
            parts.push(Word {
                width: piece_width(&piece, style, metrics),
                pieces: vec![piece],
                space_before: parts.is_empty() && word.space_before,
            });
        }
    }
    parts
}

fn break_lines(
    words: Vec<Word>,
    available: f32,
    style: &BlockStyle,
    metrics: &FontMetricTable,
) -> Vec<Line> {
    let space = metrics.measure_px(" ", style.font_size, Weight::Regular);
    let mut rows: Vec<Vec<(Word, f32)>> = Vec::new();
    let mut row: Vec<(Word, f32)> = Vec::new();
    let mut row_width = 0.0_f32;

    let words = words.into_iter().flat_map(|w| {
        if w.width > available {
            split_oversized(w, style, metrics)
        } else {
            vec![w]
        }
    });

    for word in words {
        let gap = if !row.is_empty() && word.space_before {
            space
        } else {
            0.0
        };
        if !row.is_empty() && row_width + gap + word.width > available {
            rows.push(std::mem::take(&mut row));
            row_width = word.width;
            row.push((word, 0.0));
        } else {
            row_width += gap + word.width;
            row.push((word, gap));
        }
    }
    if !row.is_empty() {
        rows.push(row);
    }

    let last = rows.len().saturating_sub(1);
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| place_row(row, available, style, i == last))
        .collect()
}

fn place_row(row: Vec<(Word, f32)>, available: f32, style: &BlockStyle, is_last: bool) -> Line {
    let width: f32 = row.iter().map(|(w, gap)| w.width + gap).sum();
    let slack = (available - width).max(0.0);
    let gaps = row.len().saturating_sub(1);

    let (offset, stretch) = match style.align {
        Align::Left => (0.0, 0.0),
        Align::Center => (slack / 2.0, 0.0),
        Align::Justify if !is_last && gaps > 0 => (0.0, slack / gaps as f32),
        Align::Justify => (0.0, 0.0),
    };

    let mut x = style.indent + offset;
    let mut words = Vec::with_capacity(row.len());
    for (i, (word, gap)) in row.into_iter().enumerate() {
        if i > 0 {
            x += gap + stretch;
        }
        words.push(PlacedWord {
            pieces: word.pieces,
            x,
            width: word.width,
        });
        x += word.width;
    }

    Line { words, width }
}
