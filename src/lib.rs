//! # unlayout
//!
//! Document hierarchy reconstruction from OCR layout elements.
//!
//! Given the bounding boxes, coarse labels and text an OCR stage produced
//! for a scanned document, this library recovers its logical structure:
//! sections, headings and the content attached to them, in reading order.
//!
//! ## Quick Start
//!
//! ```
//! use unlayout::{build_tree, render, RawElement};
//!
//! fn main() -> unlayout::Result<()> {
//!     let elements = vec![
//!         RawElement::new(1, [0.1, 0.05, 0.6, 0.09], "title", "Annual Report"),
//!         RawElement::new(1, [0.1, 0.12, 0.82, 0.16], "text", "The year went well."),
//!     ];
//!
//!     let result = build_tree(&elements);
//!     let markdown = render::to_markdown(&result.forest, &render::RenderOptions::default())?;
//!     assert!(markdown.starts_with("# Annual Report"));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Furniture removal**: running headers, footers and page numbers
//! - **Column detection**: gutters found from horizontal coverage
//! - **Reading order**: columns, spanning elements and footnotes
//! - **Adaptive calibration**: thresholds derived from each document
//! - **Markdown validation**: cross-check against a companion rendering
//! - **Parallel processing**: Uses Rayon for batches of documents

pub mod error;
pub mod model;
pub mod pipeline;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use model::{Block, BoundingBox, Column, LayoutElement, RawElement, TreeNode, Zone};
pub use pipeline::{
    Discrepancy, Pipeline, PipelineOptions, PipelineReport, StructureResult, Thresholds,
};
pub use render::{JsonFormat, RenderOptions};

use rayon::prelude::*;

/// Reconstruct the hierarchy of one document with default options.
///
/// # Example
///
/// ```
/// use unlayout::build_tree;
///
/// let result = build_tree(&[]);
/// assert!(result.forest.is_empty());
/// ```
pub fn build_tree(elements: &[RawElement]) -> StructureResult {
    Pipeline::default().run(elements)
}

/// Reconstruct the hierarchy of one document with custom options.
///
/// # Example
///
/// ```
/// use unlayout::{build_tree_with_options, PipelineOptions};
///
/// let options = PipelineOptions::new().with_filters(false);
/// let result = build_tree_with_options(&[], &options);
/// assert!(result.report.discarded.is_empty());
/// ```
pub fn build_tree_with_options(elements: &[RawElement], options: &PipelineOptions) -> StructureResult {
    Pipeline::new(options.clone()).run(elements)
}

/// Parse a JSON array of elements and reconstruct its hierarchy.
///
/// Fails only when the input is not a JSON array; malformed elements are
/// dropped and reported.
pub fn build_tree_from_json(json: &str) -> Result<StructureResult> {
    Pipeline::default().run_json(json)
}

/// Reconstruct the hierarchy while validating headings against a Markdown
/// rendering of the same document.
pub fn build_tree_with_markdown(elements: &[RawElement], markdown: &str) -> StructureResult {
    Pipeline::default().run_with_markdown(elements, Some(markdown))
}

/// Reconstruct the hierarchies of independent documents.
///
/// Documents are processed on the Rayon pool when `options.parallel` is set;
/// results come back in input order either way.
pub fn build_trees_parallel(
    documents: &[Vec<RawElement>],
    options: &PipelineOptions,
) -> Vec<StructureResult> {
    let pipeline = Pipeline::new(options.clone());
    if options.parallel {
        documents.par_iter().map(|doc| pipeline.run(doc)).collect()
    } else {
        documents.iter().map(|doc| pipeline.run(doc)).collect()
    }
}

/// Builder for reconstructing and rendering documents.
///
/// # Example
///
/// ```
/// use unlayout::{RawElement, Unlayout};
///
/// let elements = vec![RawElement::new(1, [0.1, 0.05, 0.6, 0.09], "title", "Report")];
/// let markdown = Unlayout::new()
///     .without_filters()
///     .with_max_heading(3)
///     .build(&elements)
///     .to_markdown()?;
/// assert_eq!(markdown, "# Report");
/// # Ok::<(), unlayout::Error>(())
/// ```
pub struct Unlayout {
    pipeline_options: PipelineOptions,
    render_options: RenderOptions,
}

impl Unlayout {
    /// Create a new Unlayout builder.
    pub fn new() -> Self {
        Self {
            pipeline_options: PipelineOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Keep running headers, footers and noise.
    pub fn without_filters(mut self) -> Self {
        self.pipeline_options = self.pipeline_options.with_filters(false);
        self
    }

    /// Trust the OCR labels instead of classifying zones.
    pub fn without_zone_classification(mut self) -> Self {
        self.pipeline_options = self.pipeline_options.with_zone_classification(false);
        self
    }

    /// Use fixed thresholds instead of per-document calibration.
    pub fn with_fixed_thresholds(mut self) -> Self {
        self.pipeline_options = self.pipeline_options.with_adaptive_thresholds(false);
        self
    }

    /// Replace the tunable thresholds.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.pipeline_options = self.pipeline_options.with_thresholds(thresholds);
        self
    }

    /// Set the deepest Markdown heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.render_options = self.render_options.with_max_heading(level);
        self
    }

    /// Render only headings.
    pub fn headings_only(mut self) -> Self {
        self.render_options = self.render_options.with_content(false);
        self
    }

    /// Reconstruct a document and return a result wrapper.
    pub fn build(self, elements: &[RawElement]) -> UnlayoutResult {
        let result = Pipeline::new(self.pipeline_options).run(elements);
        UnlayoutResult {
            result,
            render_options: self.render_options,
        }
    }

    /// Reconstruct a document from a JSON element array.
    pub fn build_json(self, json: &str) -> Result<UnlayoutResult> {
        let result = Pipeline::new(self.pipeline_options).run_json(json)?;
        Ok(UnlayoutResult {
            result,
            render_options: self.render_options,
        })
    }
}

impl Default for Unlayout {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of reconstructing a document.
pub struct UnlayoutResult {
    /// The pipeline output
    pub result: StructureResult,
    /// Render options to use
    render_options: RenderOptions,
}

impl UnlayoutResult {
    /// Convert to Markdown.
    pub fn to_markdown(&self) -> Result<String> {
        render::to_markdown(&self.result.forest, &self.render_options)
    }

    /// Convert the forest to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.result.forest, format)
    }

    /// Root-level sections.
    pub fn forest(&self) -> &[TreeNode] {
        &self.result.forest
    }

    /// Diagnostics of the run.
    pub fn report(&self) -> &PipelineReport {
        &self.result.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<RawElement> {
        vec![
            RawElement::new(1, [0.1, 0.05, 0.6, 0.09], "title", "Annual Report"),
            RawElement::new(
                1,
                [0.1, 0.12, 0.82, 0.1632],
                "text",
                "The year went well for everyone involved. ".repeat(8),
            ),
        ]
    }

    #[test]
    fn test_unlayout_builder() {
        let builder = Unlayout::new()
            .without_filters()
            .with_fixed_thresholds()
            .headings_only();

        assert!(!builder.pipeline_options.use_filters);
        assert!(!builder.pipeline_options.use_adaptive_thresholds);
        assert!(!builder.render_options.include_content);
    }

    #[test]
    fn test_unlayout_builder_default() {
        let builder = Unlayout::default();
        assert!(builder.pipeline_options.use_filters);
        assert_eq!(builder.render_options.max_heading_level, 6);
    }

    #[test]
    fn test_build_tree_from_json_invalid() {
        assert!(matches!(
            build_tree_from_json("null"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(build_tree_from_json("{\"page\": 1}"), Err(Error::InvalidInput(_))));
        assert!(matches!(build_tree_from_json("[1, "), Err(Error::Json(_))));
    }

    #[test]
    fn test_builder_outputs() {
        let out = Unlayout::new().headings_only().build(&sample());
        assert_eq!(out.to_markdown().unwrap(), "# Annual Report");
        assert_eq!(out.forest().len(), 1);
        assert!(out.to_json(JsonFormat::Compact).unwrap().contains("Annual Report"));
        assert!(out.report().dropped.is_empty());
    }

    #[test]
    fn test_build_trees_parallel_preserves_order() {
        let docs = vec![sample(), Vec::new(), sample()];
        let parallel = build_trees_parallel(&docs, &PipelineOptions::default());
        let sequential = build_trees_parallel(&docs, &PipelineOptions::new().sequential());
        assert_eq!(parallel, sequential);
        assert!(parallel[1].forest.is_empty());
    }
}
