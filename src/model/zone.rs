//! Semantic zones.

use serde::{Deserialize, Serialize};

/// Semantic classification of a layout region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// Document or page title
    Title,
    /// Section heading
    Heading,
    /// Running body text
    Body,
    /// Figure or table caption
    Caption,
    /// Table region
    Table,
    /// Figure, image or chart
    Figure,
    /// Footnote text
    Footnote,
    /// Running headers, footers, page numbers
    PageFurniture,
}

impl Zone {
    /// Map an OCR label that carries its meaning on its own.
    ///
    /// Returns `None` for ambiguous labels ("text", "paragraph", unknown)
    /// that need heuristics to resolve.
    pub fn from_unambiguous_label(label: &str) -> Option<Zone> {
        let zone = match label.trim().to_lowercase().as_str() {
            "title" | "doc_title" => Zone::Title,
            "sub_title" | "subtitle" | "heading" | "section_header" | "section_heading" => {
                Zone::Heading
            }
            "table" => Zone::Table,
            "figure" | "image" | "picture" | "chart" => Zone::Figure,
            "caption" | "figure_caption" | "table_caption" | "image_caption" | "imagecaption"
            | "tablecaption" => Zone::Caption,
            "footnote" | "table_footnote" | "tablefootnote" => Zone::Footnote,
            "header" | "footer" | "page_header" | "page_footer" | "page_number"
            | "page_furniture" => Zone::PageFurniture,
            "equation" | "formula" | "list" | "list_item" => Zone::Body,
            _ => return None,
        };
        Some(zone)
    }

    /// Map a raw label verbatim, without any heuristics.
    pub fn from_raw_label(label: &str) -> Zone {
        Self::from_unambiguous_label(label).unwrap_or(Zone::Body)
    }

    /// Check if this zone opens a section in the hierarchy.
    pub fn is_sectioning(&self) -> bool {
        matches!(self, Zone::Title | Zone::Heading)
    }

    /// Check if this zone holds running text.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            Zone::Title | Zone::Heading | Zone::Body | Zone::Caption | Zone::Footnote
        )
    }
}

/// Check if an OCR label marks page furniture.
pub fn is_furniture_label(label: &str) -> bool {
    Zone::from_unambiguous_label(label) == Some(Zone::PageFurniture)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unambiguous_labels() {
        assert_eq!(Zone::from_unambiguous_label("Table"), Some(Zone::Table));
        assert_eq!(Zone::from_unambiguous_label(" image "), Some(Zone::Figure));
        assert_eq!(Zone::from_unambiguous_label("sub_title"), Some(Zone::Heading));
        assert_eq!(
            Zone::from_unambiguous_label("page_number"),
            Some(Zone::PageFurniture)
        );
        assert_eq!(Zone::from_unambiguous_label("text"), None);
    }

    #[test]
    fn test_raw_label_fallback() {
        assert_eq!(Zone::from_raw_label("text"), Zone::Body);
        assert_eq!(Zone::from_raw_label("mystery"), Zone::Body);
        assert_eq!(Zone::from_raw_label("title"), Zone::Title);
    }

    #[test]
    fn test_zone_serialization() {
        let json = serde_json::to_string(&Zone::PageFurniture).unwrap();
        assert_eq!(json, "\"page_furniture\"");
    }
}
