//! Layout elements as delivered by the OCR collaborator.

use serde::{Deserialize, Serialize};

use super::BoundingBox;

/// Ratio of line pitch to glyph height used by the glyph-size estimate.
const LINE_PITCH: f32 = 1.2;

/// Average glyph advance as a fraction of glyph height.
const GLYPH_ADVANCE: f32 = 0.5;

/// An unvalidated layout record, exactly as the OCR stage emits it.
///
/// Every field is optional; [`crate::pipeline::ingest`] turns records into
/// [`LayoutElement`]s and reports the ones it has to drop. Both the
/// `bbox: [x0, y0, x1, y1]` form and the flat `bbox_x1..bbox_y2` form are
/// accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawElement {
    /// Element identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// 1-based page number
    #[serde(default, alias = "page_number", skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Bounding box as `[x0, y0, x1, y1]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f32>>,

    /// Flat bounding box form: left edge
    #[serde(default, alias = "x1", skip_serializing_if = "Option::is_none")]
    pub bbox_x1: Option<f32>,

    /// Flat bounding box form: top edge
    #[serde(default, alias = "y1", skip_serializing_if = "Option::is_none")]
    pub bbox_y1: Option<f32>,

    /// Flat bounding box form: right edge
    #[serde(default, alias = "x2", skip_serializing_if = "Option::is_none")]
    pub bbox_x2: Option<f32>,

    /// Flat bounding box form: bottom edge
    #[serde(default, alias = "y2", skip_serializing_if = "Option::is_none")]
    pub bbox_y2: Option<f32>,

    /// OCR-supplied coarse class ("title", "text", "table", ...)
    #[serde(default, alias = "raw_label", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Short, possibly truncated text
    #[serde(default, alias = "text", skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    /// Complete text of the element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_full: Option<String>,

    /// Page width in the unit of the coordinates (when not normalized)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_width: Option<f32>,

    /// Page height in the unit of the coordinates (when not normalized)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_height: Option<f32>,
}

impl RawElement {
    /// Create a record with the essential fields set.
    pub fn new(page: u32, bbox: [f32; 4], label: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            page: Some(page),
            bbox: Some(bbox.to_vec()),
            label: Some(label.into()),
            text_content: Some(text.clone()),
            text_full: Some(text),
            ..Self::default()
        }
    }

    /// Set the element id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the page dimensions the coordinates are expressed in.
    pub fn with_page_size(mut self, width: f32, height: f32) -> Self {
        self.page_width = Some(width);
        self.page_height = Some(height);
        self
    }

    /// Resolve the coordinates from whichever bbox form is present.
    pub fn coordinates(&self) -> Option<[f32; 4]> {
        if let Some(bbox) = &self.bbox {
            if bbox.len() == 4 {
                return Some([bbox[0], bbox[1], bbox[2], bbox[3]]);
            }
            return None;
        }
        Some([self.bbox_x1?, self.bbox_y1?, self.bbox_x2?, self.bbox_y2?])
    }
}

/// An atomic OCR-detected region, validated and normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutElement {
    /// Stable identifier, unique within the document
    pub id: String,

    /// 1-based page index
    pub page: u32,

    /// Page-normalized bounding box
    pub bbox: BoundingBox,

    /// OCR-supplied coarse class
    pub raw_label: String,

    /// Short/representative text
    pub text_content: String,

    /// Complete text (may be empty for non-text elements)
    pub text_full: String,

    /// Page height divided by page width (1.0 when unknown)
    pub aspect: f32,

    /// Position in the raw OCR emission order
    pub source_index: usize,
}

impl LayoutElement {
    /// The most complete text available for this element.
    pub fn text(&self) -> &str {
        if self.text_full.trim().is_empty() {
            &self.text_content
        } else {
            &self.text_full
        }
    }

    /// Raw label lowercased and trimmed.
    pub fn label(&self) -> String {
        self.raw_label.trim().to_lowercase()
    }

    /// Number of non-empty lines in the element's text.
    pub fn explicit_lines(&self) -> usize {
        self.text().lines().filter(|l| !l.trim().is_empty()).count()
    }

    /// Estimate the glyph height of the element's text.
    ///
    /// Multi-line text with explicit breaks divides the height by the line
    /// count. Otherwise the smaller of the single-line estimate and the
    /// area-based estimate (text area shared between all characters) is used,
    /// so wrapped paragraphs without line breaks are not mistaken for large
    /// type. The result is in page-height units.
    pub fn glyph_size(&self) -> f32 {
        let height = self.bbox.height();
        let single_line = height / LINE_PITCH;

        let lines = self.explicit_lines();
        if lines > 1 {
            return height / (LINE_PITCH * lines as f32);
        }

        let chars = self.text().trim().chars().count();
        if chars == 0 {
            return single_line;
        }

        // Width expressed in page-height units so both axes share a scale.
        let width = self.bbox.width() / self.aspect.max(f32::EPSILON);
        let by_area = (height * width / (LINE_PITCH * GLYPH_ADVANCE * chars as f32)).sqrt();
        single_line.min(by_area)
    }
}
