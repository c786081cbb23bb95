//! Pipeline options and tunable thresholds.

use serde::{Deserialize, Serialize};

/// Options for the structure pipeline.
///
/// The five stage toggles are independent. All thresholds live in
/// [`Thresholds`]; the defaults are the values the adaptive calibration falls
/// back to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Remove running headers/footers and noise
    pub use_filters: bool,

    /// Classify zones with heuristics (otherwise zone := raw label)
    pub use_zone_classification: bool,

    /// Compute reading order (otherwise keep OCR emission order)
    pub use_reading_order: bool,

    /// Cross-check headings against a companion Markdown rendering
    pub use_markdown_validation: bool,

    /// Calibrate thresholds per document (otherwise use fixed defaults)
    pub use_adaptive_thresholds: bool,

    /// Process independent documents in parallel
    pub parallel: bool,

    /// Tunable thresholds
    pub thresholds: Thresholds,
}

impl PipelineOptions {
    /// Create new pipeline options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable header/footer filtering.
    pub fn with_filters(mut self, enabled: bool) -> Self {
        self.use_filters = enabled;
        self
    }

    /// Enable or disable zone classification.
    pub fn with_zone_classification(mut self, enabled: bool) -> Self {
        self.use_zone_classification = enabled;
        self
    }

    /// Enable or disable reading-order computation.
    pub fn with_reading_order(mut self, enabled: bool) -> Self {
        self.use_reading_order = enabled;
        self
    }

    /// Enable or disable Markdown validation.
    pub fn with_markdown_validation(mut self, enabled: bool) -> Self {
        self.use_markdown_validation = enabled;
        self
    }

    /// Enable or disable per-document calibration.
    pub fn with_adaptive_thresholds(mut self, enabled: bool) -> Self {
        self.use_adaptive_thresholds = enabled;
        self
    }

    /// Enable or disable parallel batch processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel batch processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Replace the thresholds.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Load options from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            use_filters: true,
            use_zone_classification: true,
            use_reading_order: true,
            use_markdown_validation: true,
            use_adaptive_thresholds: true,
            parallel: true,
            thresholds: Thresholds::default(),
        }
    }
}

/// Tunable thresholds. Distances are in page-normalized units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    // Element filter
    /// Fraction of pages an element must recur on to be furniture
    pub recurrence_threshold: f32,
    /// Maximum coordinate drift for "the same position"
    pub position_tolerance: f32,
    /// Elements smaller than this fraction of the page are noise
    pub min_area_ratio: f32,
    /// Drop small elements sitting in the side margins
    pub filter_margins: bool,
    /// Width of the side margin bands
    pub margin_ratio: f32,

    // Zone classifier
    /// Glyph size over page median that makes a heading
    pub heading_size_ratio: f32,
    /// Glyph size over page median that makes a title candidate
    pub title_size_ratio: f32,
    /// Longest text still considered a heading/title
    pub max_heading_chars: usize,
    /// Titles must start above this line (or be centered)
    pub title_band: f32,
    /// Height of the top/bottom bands where page numbers live
    pub furniture_band: f32,
    /// Footnotes start below this line
    pub footnote_band: f32,
    /// Largest distance between a caption and its figure/table
    pub caption_distance: f32,

    // Column grouper
    /// Number of histogram bins across the page width
    pub histogram_bins: usize,
    /// Narrowest gutter that splits columns
    pub min_gap_width: f32,
    /// Narrowest column a split may leave behind
    pub min_column_width: f32,
    /// Bins covered over less than this share of the content height are gaps
    pub gap_coverage: f32,
    /// How far an element may cross a gutter before it is spanning
    pub spanning_tolerance: f32,
    /// Largest vertical distance between a caption block and the
    /// figure/table block it describes
    pub caption_link_distance: f32,
    /// Vertical overlap that puts two elements on one line
    pub line_overlap: f32,
    /// Horizontal overlap required to merge consecutive lines
    pub min_horizontal_overlap: f32,

    // Calibration / hierarchy
    /// Percentile of same-column gaps used as the merge gap
    pub merge_gap_percentile: f32,
    /// Fixed merge gap, in median glyph heights
    pub default_merge_gap_ratio: f32,
    /// Percentile of preceding gaps that counts as unusually large
    pub large_gap_percentile: f32,
    /// Fixed large-gap threshold
    pub default_large_gap: f32,
    /// Relative size step that always separates heading tiers
    pub tier_floor: f32,
    /// Deepest heading level
    pub max_heading_depth: u32,
    /// Minimum heading candidates for adaptive calibration
    pub min_calibration_samples: usize,
    /// Fixed heading/body glyph ratio for level 1
    pub default_level1_ratio: f32,
    /// Fixed heading/body glyph ratio for level 2
    pub default_level2_ratio: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            recurrence_threshold: 0.6,
            position_tolerance: 0.05,
            min_area_ratio: 0.0001,
            filter_margins: false,
            margin_ratio: 0.05,

            heading_size_ratio: 1.3,
            title_size_ratio: 1.8,
            max_heading_chars: 120,
            title_band: 0.25,
            furniture_band: 0.06,
            footnote_band: 0.85,
            caption_distance: 0.05,

            histogram_bins: 200,
            min_gap_width: 0.02,
            min_column_width: 0.1,
            gap_coverage: 0.5,
            spanning_tolerance: 0.02,
            caption_link_distance: 0.15,
            line_overlap: 0.5,
            min_horizontal_overlap: 0.3,

            merge_gap_percentile: 0.7,
            default_merge_gap_ratio: 1.5,
            large_gap_percentile: 0.9,
            default_large_gap: 0.04,
            tier_floor: 0.08,
            max_heading_depth: 5,
            min_calibration_samples: 3,
            default_level1_ratio: 1.6,
            default_level2_ratio: 1.25,
        }
    }
}
