//! Paginator: splits card text into pages that fit the content budget.
//!
//! Paragraphs (separated by blank lines) are accumulated greedily; after
//! each append the candidate page is laid out with the same flow engine the
//! exporter uses and compared to `CanvasConfig::max_content_height`. A
//! paragraph that overflows on its own still gets its own page; it is never
//! split. Joining the pages with [`PARAGRAPH_SEPARATOR`] gives back
//! [`clean_text`] of the input exactly.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::layout::canvas::CanvasConfig;
use crate::layout::flow::measure_height;

pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

fn invisible_marks() -> &'static Regex {
    static INVISIBLE: OnceLock<Regex> = OnceLock::new();
    INVISIBLE.get_or_init(|| {
        Regex::new("[\u{200B}-\u{200D}\u{2060}\u{FEFF}]").expect("invisible-mark pattern is valid")
    })
}

fn newline_runs() -> &'static Regex {
    static RUNS: OnceLock<Regex> = OnceLock::new();
    RUNS.get_or_init(|| Regex::new(r"\n{2,}").expect("newline-run pattern is valid"))
}

/// Normalizes raw editor or model output.
///
/// Literal `\n` escapes become newlines, CRLF becomes LF, zero-width marks
/// are removed and the result is trimmed.
pub fn clean_text(raw: &str) -> String {
    let unescaped = raw.replace("\\n", "\n").replace("\r\n", "\n");
    invisible_marks()
        .replace_all(&unescaped, "")
        .trim()
        .to_string()
}

/// Splits cleaned text on runs of two or more newlines.
///
/// Only the last two newlines of a run act as the separator; any extra ones
/// stay at the end of the preceding paragraph, so joining the result with
/// [`PARAGRAPH_SEPARATOR`] is lossless.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut paragraphs = Vec::new();
    let mut start = 0;
    for run in newline_runs().find_iter(text) {
        paragraphs.push(&text[start..run.end() - PARAGRAPH_SEPARATOR.len()]);
        start = run.end();
    }
    paragraphs.push(&text[start..]);
    paragraphs
}

/// Splits `raw` into pages for the given base font size.
///
/// Always returns at least one page. Deterministic for a given
/// `(raw, font_size_px, canvas)`.
pub fn paginate(raw: &str, font_size_px: u32, canvas: &CanvasConfig) -> Vec<String> {
    paginate_with(raw, |candidate| {
        measure_height(candidate, font_size_px as f32, canvas) <= canvas.max_content_height
    })
}

/// Greedy accumulation with a caller-supplied fit test.
pub(crate) fn paginate_with<F>(raw: &str, fits: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let cleaned = clean_text(raw);
    let mut pages: Vec<String> = Vec::new();
    let mut current = String::new();

    for paragraph in split_paragraphs(&cleaned) {
        let candidate = if current.is_empty() {
            paragraph.to_string()
        } else {
            format!("{current}{PARAGRAPH_SEPARATOR}{paragraph}")
        };

        if fits(&candidate) {
            current = candidate;
        } else {
            if !current.is_empty() {
                pages.push(std::mem::take(&mut current));
            }
            current = paragraph.to_string();
        }
    }

    if !current.is_empty() {
        pages.push(current);
    }

    if pages.is_empty() {
        pages.push(cleaned);
    }

    debug!(pages = pages.len(), "Pagination complete");
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> CanvasConfig {
        CanvasConfig::default()
    }

    fn long_paragraph(words: usize) -> String {
        vec!["lorem"; words].join(" ")
    }

    // ── clean_text ──────────────────────────────────────────────────────────

    #[test]
    fn test_clean_text_unescapes_newlines() {
        assert_eq!(clean_text("a\\n\\nb"), "a\n\nb");
    }

    #[test]
    fn test_clean_text_strips_invisible_marks_and_trims() {
        assert_eq!(clean_text("  \u{FEFF}he\u{200B}llo\u{200D}  \n"), "hello");
    }

    #[test]
    fn test_clean_text_normalizes_crlf() {
        assert_eq!(clean_text("a\r\n\r\nb"), "a\n\nb");
    }

    // ── split_paragraphs ────────────────────────────────────────────────────

    #[test]
    fn test_split_paragraphs_on_blank_lines() {
        assert_eq!(split_paragraphs("a\nb\n\nc"), vec!["a\nb", "c"]);
    }

    #[test]
    fn test_split_paragraphs_keeps_extra_newlines() {
        let parts = split_paragraphs("a\n\n\n\nb");
        assert_eq!(parts, vec!["a\n\n", "b"]);
        assert_eq!(parts.join(PARAGRAPH_SEPARATOR), "a\n\n\n\nb");
    }

    // ── paginate ────────────────────────────────────────────────────────────

    #[test]
    fn test_two_short_paragraphs_share_a_page() {
        let pages = paginate("line one\n\nline two", 52, &canvas());
        assert_eq!(pages, vec!["line one\n\nline two".to_string()]);
    }

    #[test]
    fn test_tight_budget_splits_paragraphs() {
        let tight = CanvasConfig {
            max_content_height: 120.0,
            ..CanvasConfig::default()
        };
        let pages = paginate("line one\n\nline two", 52, &tight);
        assert_eq!(pages, vec!["line one".to_string(), "line two".to_string()]);
    }

    #[test]
    fn test_empty_input_yields_single_empty_page() {
        assert_eq!(paginate("", 52, &canvas()), vec![String::new()]);
        assert_eq!(paginate(" \u{200B} ", 52, &canvas()), vec![String::new()]);
    }

    #[test]
    fn test_pagination_is_deterministic() {
        let text = (0..12)
            .map(|i| format!("Paragraph {i}: {}", long_paragraph(40)))
            .collect::<Vec<_>>()
            .join("\n\n");
        let first = paginate(&text, 56, &canvas());
        let second = paginate(&text, 56, &canvas());
        assert_eq!(first, second);
        assert!(first.len() > 1);
    }

    #[test]
    fn test_join_reconstructs_cleaned_input() {
        let raw = format!(
            "\u{FEFF}# Title\\n> a quote with **bold**\n\n{}\n\n\n{}\n\n- item\n\n{}  ",
            long_paragraph(80),
            long_paragraph(120),
            long_paragraph(30)
        );
        let pages = paginate(&raw, 60, &canvas());
        assert!(pages.len() > 1);
        assert_eq!(pages.join(PARAGRAPH_SEPARATOR), clean_text(&raw));
    }

    #[test]
    fn test_oversized_paragraph_is_never_split() {
        let huge = long_paragraph(600);
        let text = format!("intro\n\n{huge}\n\noutro");
        let pages = paginate(&text, 52, &canvas());
        assert_eq!(pages, vec!["intro".to_string(), huge, "outro".to_string()]);
        assert!(measure_height(&pages[1], 52.0, &canvas()) > canvas().max_content_height);
    }

    #[test]
    fn test_pages_fit_budget_unless_single_paragraph() {
        let text = (0..20)
            .map(|_| long_paragraph(35))
            .collect::<Vec<_>>()
            .join("\n\n");
        for page in paginate(&text, 64, &canvas()) {
            let single = split_paragraphs(&page).len() == 1;
            assert!(single || measure_height(&page, 64.0, &canvas()) <= 1100.0);
        }
    }

    #[test]
    fn test_larger_font_never_reduces_page_count() {
        let text = (0..10)
            .map(|_| long_paragraph(45))
            .collect::<Vec<_>>()
            .join("\n\n");
        let small = paginate(&text, 40, &canvas()).len();
        let large = paginate(&text, 72, &canvas()).len();
        assert!(large >= small);
    }

    #[test]
    fn test_paginate_with_custom_fit() {
        let pages = paginate_with("a\n\nb\n\nc", |candidate| candidate.len() <= 4);
        assert_eq!(pages, vec!["a\n\nb".to_string(), "c".to_string()]);
    }
}
