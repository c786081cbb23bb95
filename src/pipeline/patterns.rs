//! Text patterns shared by the filter, the zone classifier and validation.

use std::sync::OnceLock;

use regex::Regex;

/// Compiled text patterns.
pub(crate) struct TextPatterns {
    /// "Figure 3", "Fig. 2:", "Table 1.", "Hình 4", "Bảng 2", "<center>Figure"
    pub caption: Regex,
    /// "1. ", "2.1. ", "2.1 Methods", "A. ", "B.2 ", "Chapter 3", "Section 2"
    pub section_number: Regex,
    /// "12", "- 12 -", "Page 3", "page 3 of 10", "Trang 5"
    pub page_number: Regex,
    /// Runs of digits
    pub digits: Regex,
    /// Runs of whitespace
    pub whitespace: Regex,
    /// ATX heading line
    pub markdown_heading: Regex,
    /// Fenced code delimiter
    pub code_fence: Regex,
}

impl TextPatterns {
    fn new() -> Self {
        Self {
            caption: compile(
                r"^\s*(<center>\s*)?(?i:figure|fig\.?|table|tab\.?|hình|bảng|image|chart|photo|diagram)\s*(\d+(\.\d+)*|[IVXLC]+)[a-z]?\s*([.:\-–—)<]|\s|$)",
            ),
            section_number: compile(
                r"^\s*((\d+\.)+(\d+)?|\d+(\.\d+)+|[A-Z]\.(\d+\.?)*|[IVXLC]+\.)\s+\p{Lu}|^\s*(?i:(chapter|section|part|appendix)\s+(\d+|[ivxlc]+|[a-z])\b)",
            ),
            page_number: compile(
                r"(?i)^\s*(\d{1,4}|[-–—]\s*\d{1,4}\s*[-–—]|(page|trang|p\.)\s*\d{1,4}(\s*(of|/)\s*\d{1,4})?|\d{1,4}\s*/\s*\d{1,4})\s*$",
            ),
            digits: compile(r"\d+"),
            whitespace: compile(r"\s+"),
            markdown_heading: compile(r"^(#{1,6})\s+(.+?)(?:\s+#+)?\s*$"),
            code_fence: compile(r"^\s*(```|~~~)"),
        }
    }

    /// Depth of a leading section number: "2" → 1, "2.1" → 2, "2.1.3" → 3.
    ///
    /// Returns `None` when the text does not start with a numeric section
    /// number.
    pub fn numbering_depth(&self, text: &str) -> Option<u32> {
        let first = text.split_whitespace().next()?;
        if !self.section_number.is_match(text) {
            return None;
        }
        let parts = first
            .trim_end_matches('.')
            .split('.')
            .filter(|p| !p.is_empty())
            .count();
        if parts == 0 || !first.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        Some(parts as u32)
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("literal pattern compiles")
}

/// The process-wide compiled pattern set.
pub(crate) fn patterns() -> &'static TextPatterns {
    static PATTERNS: OnceLock<TextPatterns> = OnceLock::new();
    PATTERNS.get_or_init(TextPatterns::new)
}
