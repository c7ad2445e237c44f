//! Four-rule markdown subset used by the quote cards.
//!
//! Each line maps to exactly one block, checked in this order:
//! blank → spacer, `# ` → heading, `> ` → quote, `- ` → list item,
//! anything else → paragraph. Quotes and paragraphs highlight `**bold**`
//! spans; headings and list items keep their text literally. Nothing else
//! is interpreted.


use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// A run of inline text, highlighted or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

/// One layout block of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum Block {
    /// Fixed vertical gap produced by a blank line.
    Spacer,
    /// Large centered title.
    Heading(String),
    /// Indented italic block with a left rule.
    Quote(Vec<Span>),
    /// Bulleted left-aligned line.
    ListItem(String),
    /// Justified body text.
    Paragraph(Vec<Span>),
}

const HEADING_MARKER: &str = "# ";
const QUOTE_MARKER: &str = "> ";
const LIST_MARKER: &str = "- ";

fn bold_pattern() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"))
}

/// Maps page text to layout blocks, one per line.
pub fn parse_blocks(page: &str) -> Vec<Block> {
    let page = page.replace("\\n", "\n");
    page.split('\n').map(parse_line).collect()
}

fn parse_line(line: &str) -> Block {
    let line = line.trim();
    if line.is_empty() {
        Block::Spacer
    } else if let Some(title) = line.strip_prefix(HEADING_MARKER) {
        Block::Heading(title.to_string())
    } else if let Some(quote) = line.strip_prefix(QUOTE_MARKER) {
        Block::Quote(parse_spans(quote))
    } else if let Some(item) = line.strip_prefix(LIST_MARKER) {
        Block::ListItem(item.to_string())
    } else {
        Block::Paragraph(parse_spans(line))
    }
}

/// Splits a line into plain and bold spans. Unpaired markers stay literal.
pub fn parse_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in bold_pattern().captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            spans.push(Span::plain(&text[last..whole.start()]));
        }
        if !inner.as_str().is_empty() {
            spans.push(Span::bold(inner.as_str()));
        }
        last = whole.end();
    }

    if last < text.len() {
        spans.push(Span::plain(&text[last..]));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_line_is_heading() {
        assert_eq!(
            parse_blocks("# Title"),
            vec![Block::Heading("Title".to_string())]
        );
    }

    #[test]
    fn test_bold_prefix_then_plain_rest() {
        assert_eq!(
            parse_blocks("**bold** rest"),
            vec![Block::Paragraph(vec![Span::bold("bold"), Span::plain(" rest")])]
        );
    }

    #[test]
    fn test_blank_line_is_spacer() {
        let blocks = parse_blocks("first\n\nsecond");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1], Block::Spacer);
    }

    #[test]
    fn test_quote_highlights_bold() {
        assert_eq!(
            parse_blocks("> God does **not** play dice"),
            vec![Block::Quote(vec![
                Span::plain("God does "),
                Span::bold("not"),
                Span::plain(" play dice"),
            ])]
        );
    }

    #[test]
    fn test_list_item_keeps_markers_literal() {
        assert_eq!(
            parse_blocks("- **one** thing"),
            vec![Block::ListItem("**one** thing".to_string())]
        );
    }

    #[test]
    fn test_markers_need_trailing_space() {
        assert_eq!(
            parse_blocks("#hashtag"),
            vec![Block::Paragraph(vec![Span::plain("#hashtag")])]
        );
    }

    #[test]
    fn test_lines_are_trimmed_before_matching() {
        assert_eq!(
            parse_blocks("   # Indented"),
            vec![Block::Heading("Indented".to_string())]
        );
    }

    #[test]
    fn test_unpaired_marker_passes_through() {
        assert_eq!(parse_spans("a ** b"), vec![Span::plain("a ** b")]);
    }

    #[test]
    fn test_non_greedy_bold() {
        assert_eq!(
            parse_spans("**a** and **b**"),
            vec![Span::bold("a"), Span::plain(" and "), Span::bold("b")]
        );
    }

    #[test]
    fn test_escaped_newlines_split_lines() {
        let blocks = parse_blocks("# T\\nbody");
        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[0], Block::Heading(_)));
    }
}
