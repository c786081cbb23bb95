//! Validation of inferred headings against a companion Markdown rendering.
//!
//! Validation only reports; it never changes the tree.

use serde::{Deserialize, Serialize};

use super::patterns::patterns;

/// A `#`-style heading found in the companion Markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownHeading {
    /// Level, 0 for `#`
    pub level: u32,
    /// Heading text
    pub text: String,
    /// 1-based line number
    pub line: usize,
}

/// A heading inferred by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredHeading {
    /// Block that opened the section
    pub block_id: String,
    /// Heading text
    pub text: String,
    /// Nesting level in the tree
    pub level: u32,
}

/// A mismatch between inferred headings and Markdown markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discrepancy {
    /// An inferred heading has no Markdown marker
    MissingMarker {
        /// Heading block
        block_id: String,
        /// Heading text
        text: String,
        /// Inferred level (shifted so the shallowest is 0)
        level: u32,
    },
    /// A Markdown marker matches no inferred heading
    UnmatchedMarker {
        /// Marker text
        text: String,
        /// Marker level (shifted so the shallowest is 0)
        level: u32,
        /// Line of the marker
        line: usize,
    },
    /// Both sides agree on the heading but not on its level
    LevelMismatch {
        /// Heading block
        block_id: String,
        /// Heading text
        text: String,
        /// Inferred level (shifted)
        inferred: u32,
        /// Marker level (shifted)
        marked: u32,
    },
}

/// Extract ATX headings, skipping fenced code blocks.
pub fn parse_headings(markdown: &str) -> Vec<MarkdownHeading> {
    let p = patterns();
    let mut headings = Vec::new();
    let mut in_code = false;

    for (i, line) in markdown.lines().enumerate() {
        if p.code_fence.is_match(line) {
            in_code = !in_code;
            continue;
        }
        if in_code {
            continue;
        }
        if let Some(caps) = p.markdown_heading.captures(line.trim_end()) {
            let hashes = caps.get(1).map_or(1, |m| m.as_str().len());
            let text = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
            if !text.is_empty() {
                headings.push(MarkdownHeading {
                    level: hashes as u32 - 1,
                    text,
                    line: i + 1,
                });
            }
        }
    }
    headings
}

/// Compare inferred headings with the markers of a Markdown rendering.
///
/// Markers are matched to headings in order by normalized text (equal, or
/// one containing the other). Levels are compared after shifting each side
/// so its shallowest level is 0.
pub fn validate(inferred: &[InferredHeading], markdown: &str) -> Vec<Discrepancy> {
    let markers = parse_headings(markdown);

    let inferred_base = inferred.iter().map(|h| h.level).min().unwrap_or(0);
    let marker_base = markers.iter().map(|m| m.level).min().unwrap_or(0);
    let inferred_keys: Vec<String> = inferred.iter().map(|h| match_key(&h.text)).collect();

    let mut discrepancies = Vec::new();
    let mut next = 0;

    for marker in &markers {
        let key = match_key(&marker.text);
        let found = (next..inferred.len()).find(|&i| keys_match(&inferred_keys[i], &key));

        let Some(found) = found else {
            discrepancies.push(Discrepancy::UnmatchedMarker {
                text: marker.text.clone(),
                level: marker.level - marker_base,
                line: marker.line,
            });
            continue;
        };

        for skipped in &inferred[next..found] {
            discrepancies.push(missing(skipped, inferred_base));
        }

        let heading = &inferred[found];
        let (inferred_level, marked_level) = (heading.level - inferred_base, marker.level - marker_base);
        if inferred_level != marked_level {
            discrepancies.push(Discrepancy::LevelMismatch {
                block_id: heading.block_id.clone(),
                text: heading.text.clone(),
                inferred: inferred_level,
                marked: marked_level,
            });
        }
        next = found + 1;
    }

    for skipped in &inferred[next.min(inferred.len())..] {
        discrepancies.push(missing(skipped, inferred_base));
    }

    if !discrepancies.is_empty() {
        log::debug!(
            "Markdown validation: {} discrepancies over {} headings and {} markers",
            discrepancies.len(),
            inferred.len(),
            markers.len()
        );
    }
    discrepancies
}

fn missing(heading: &InferredHeading, base: u32) -> Discrepancy {
    Discrepancy::MissingMarker {
        block_id: heading.block_id.clone(),
        text: heading.text.clone(),
        level: heading.level - base,
    }
}

/// Lowercased alphanumeric words of a heading.
fn match_key(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn keys_match(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a == b || a.contains(b) || b.contains(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(id: &str, text: &str, level: u32) -> InferredHeading {
        InferredHeading {
            block_id: id.to_string(),
            text: text.to_string(),
            level,
        }
    }

    #[test]
    fn test_parse_headings_skips_code() {
        let md = "# Title\n\nText\n\n```\n# not a heading\n```\n\n## Section *One*\n###NoSpace\n";
        let headings = parse_headings(md);
        assert_eq!(headings.len(), 2);
        assert_eq!(headings[0].level, 0);
        assert_eq!(headings[1].level, 1);
        assert_eq!(headings[1].text, "Section *One*");
        assert_eq!(headings[1].line, 9);
    }

    #[test]
    fn test_closing_hashes_need_whitespace() {
        let headings = parse_headings("# C#\n## Tools ##\n### F# notes\n");
        let texts: Vec<&str> = headings.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["C#", "Tools", "F# notes"]);
    }

    #[test]
    fn test_validate_agreement() {
        let inferred = vec![heading("a", "Report", 0), heading("b", "1. Introduction", 1)];
        let md = "# Report\n\n## 1. Introduction\n\nBody";
        assert!(validate(&inferred, md).is_empty());
    }

    #[test]
    fn test_validate_reports_all_kinds() {
        let inferred = vec![
            heading("a", "Report", 0),
            heading("b", "Methods", 1),
            heading("c", "Results", 1),
        ];
        let md = "# Report\n### Results\n## Appendix\n";
        let found = validate(&inferred, md);
        assert_eq!(
            found,
            vec![
                Discrepancy::MissingMarker {
                    block_id: "b".to_string(),
                    text: "Methods".to_string(),
                    level: 1,
                },
                Discrepancy::LevelMismatch {
                    block_id: "c".to_string(),
                    text: "Results".to_string(),
                    inferred: 1,
                    marked: 2,
                },
                Discrepancy::UnmatchedMarker {
                    text: "Appendix".to_string(),
                    level: 1,
                    line: 3,
                },
            ]
        );
    }

    #[test]
    fn test_levels_are_shifted() {
        let inferred = vec![heading("a", "Intro", 1), heading("b", "Scope", 2)];
        let md = "# Intro\n## Scope\n";
        assert!(validate(&inferred, md).is_empty());
    }
}
