//! Columns and blocks.

use serde::{Deserialize, Serialize};

use super::{BoundingBox, Zone};

/// A vertical band of a page holding an independent reading flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Page the column belongs to
    pub page: u32,
    /// Column index on the page (0 = leftmost)
    pub index: usize,
    /// Left boundary
    pub left: f32,
    /// Right boundary
    pub right: f32,
    /// Member element ids, top to bottom
    pub member_element_ids: Vec<String>,
}

impl Column {
    /// Create an empty column spanning `[left, right]`.
    pub fn new(page: u32, index: usize, left: f32, right: f32) -> Self {
        Self {
            page,
            index,
            left,
            right,
            member_element_ids: Vec::new(),
        }
    }

    /// Check if an X coordinate falls within this column.
    pub fn contains(&self, x: f32) -> bool {
        x >= self.left && x <= self.right
    }

    /// Column width.
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Stable identifier, e.g. `p3-c1`.
    pub fn id(&self) -> String {
        format!("p{}-c{}", self.page, self.index)
    }
}

/// One or more layout elements merged into a single reading unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block identifier, e.g. `p1-c0-b2`
    pub id: String,
    /// Page the block sits on
    pub page: u32,
    /// Column index on the page
    pub column: usize,
    /// Union of the member bounding boxes
    pub bbox: BoundingBox,
    /// Zone shared by all members
    pub zone: Zone,
    /// Member texts concatenated in line order
    pub text_full: String,
    /// Position in the column's local reading order
    pub order_index: usize,
    /// Member element ids in line order
    pub element_ids: Vec<String>,
    /// Whether the block crosses a column gutter
    pub spanning: bool,
    /// Estimated glyph height of the block's text
    pub glyph_size: f32,
    /// Whitespace above the block within its column (0.0 at the column top)
    pub gap_before: f32,
    /// Figure or table block this caption describes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption_of: Option<String>,
    /// Earliest raw emission index among the members
    pub source_index: usize,
}

impl Block {
    /// Check if the block has no text.
    pub fn is_empty(&self) -> bool {
        self.text_full.trim().is_empty()
    }

    /// Check if the block opens a section.
    pub fn is_sectioning(&self) -> bool {
        self.zone.is_sectioning()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_contains() {
        let col = Column::new(1, 0, 0.1, 0.5);
        assert!(col.contains(0.1));
        assert!(col.contains(0.3));
        assert!(col.contains(0.5));
        assert!(!col.contains(0.05));
        assert!(!col.contains(0.51));
        assert_eq!(col.id(), "p1-c0");
        assert!((col.width() - 0.4).abs() < 1e-6);
    }
}
