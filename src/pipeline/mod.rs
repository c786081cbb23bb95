//! Structure reconstruction pipeline.
//!
//! Stages run in a fixed order, each consuming the previous stage's output
//! and allocating its own:
//!
//! 1. [`ingest`]: validate and normalize raw records
//! 2. [`filter_elements`]: drop running headers/footers and noise
//! 3. [`classify_zones`]: one [`Zone`](crate::model::Zone) per element
//! 4. [`layout_columns`]: columns per page and element placement
//! 5. [`Calibration::compute`]: per-document thresholds
//! 6. [`build_blocks`]: lines and blocks inside columns
//! 7. [`sequence`]: reading order
//! 8. [`assign_levels`] and [`assemble`]: hierarchy and tree
//! 9. [`validate`]: optional cross-check against a Markdown rendering

mod assemble;
mod calibration;
mod columns;
mod filter;
mod grouping;
mod hierarchy;
mod ingest;
mod markdown;
mod options;
mod patterns;
mod reading_order;
mod report;
mod zones;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Block, RawElement, TreeNode, Zone};

pub use assemble::{assemble, UNTITLED_SECTION};
pub use calibration::{Calibration, CalibrationSource, GlyphStats, HeadingTier};
pub use columns::{detect_columns, layout_columns, ColumnLayout, Placement};
pub use filter::{filter_elements, normalize_text, FilterOutcome};
pub use grouping::build_blocks;
pub use hierarchy::{assign_levels, BlockLevel};
pub use ingest::{ingest, parse_elements_json};
pub use markdown::{parse_headings, validate, Discrepancy, InferredHeading, MarkdownHeading};
pub use options::{PipelineOptions, Thresholds};
pub use reading_order::sequence;
pub use report::{Diagnostic, DiscardReason, Discarded, DropReason, PipelineReport};
pub use zones::{classify_zones, Classified};

/// Fewest pages for which furniture is detected from content rather than labels.
const RECURRENCE_MIN_PAGES: usize = 3;

/// Output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureResult {
    /// Root-level sections, in reading order
    pub forest: Vec<TreeNode>,
    /// Every block, in reading order
    pub blocks: Vec<Block>,
    /// Diagnostics and calibration of the run
    pub report: PipelineReport,
}

impl StructureResult {
    /// Block ids in reading order.
    pub fn reading_order(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.id.as_str()).collect()
    }

    /// Look up a block by id.
    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }
}

/// Structure reconstruction pipeline for one document at a time.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    /// Create a pipeline with the given options.
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    /// Options this pipeline runs with.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Reconstruct the hierarchy of one document.
    pub fn run(&self, raw: &[RawElement]) -> StructureResult {
        self.run_with_markdown(raw, None)
    }

    /// Parse a JSON element array and reconstruct its hierarchy.
    pub fn run_json(&self, json: &str) -> Result<StructureResult> {
        let raw = parse_elements_json(json)?;
        Ok(self.run(&raw))
    }

    /// Reconstruct the hierarchy, validating headings against `markdown`
    /// when validation is enabled and a rendering is given.
    pub fn run_with_markdown(&self, raw: &[RawElement], markdown: Option<&str>) -> StructureResult {
        let options = &self.options;
        let thresholds = &options.thresholds;
        let mut report = PipelineReport::default();

        let (elements, dropped) = ingest(raw);
        report.dropped = dropped;
        report.elements_ingested = elements.len();

        let source_pages = elements.iter().map(|e| e.page).collect::<BTreeSet<_>>().len();
        let elements = if options.use_filters {
            let outcome = filter_elements(elements, thresholds);
            report.discarded = outcome.discarded;
            outcome.retained
        } else {
            elements
        };

        let mut classified = classify_zones(elements, thresholds, options.use_zone_classification);
        // Short documents are judged by raw label alone.
        if options.use_filters && source_pages >= RECURRENCE_MIN_PAGES {
            let (furniture, kept): (Vec<_>, Vec<_>) = classified
                .into_iter()
                .partition(|c| c.zone == Zone::PageFurniture);
            report
                .discarded
                .extend(furniture.into_iter().map(|c| Discarded {
                    element_id: c.element.id,
                    page: c.element.page,
                    reason: DiscardReason::ClassifiedFurniture,
                }));
            classified = kept;
        }
        report.elements_retained = classified.len();
        report.page_count = classified
            .iter()
            .map(|c| c.element.page)
            .collect::<BTreeSet<_>>()
            .len();

        let layout = layout_columns(&classified, thresholds);
        report.columns_per_page = layout.counts();

        let calibration = Calibration::compute(
            &classified,
            &layout.placements,
            thresholds,
            options.use_adaptive_thresholds,
        );

        let blocks = build_blocks(&classified, &layout.placements, &calibration, thresholds);
        let blocks = sequence(blocks, options.use_reading_order);
        report.block_count = blocks.len();

        let levels = assign_levels(&blocks, &calibration);
        let forest = assemble(&blocks, &levels);

        if options.use_markdown_validation {
            if let Some(markdown) = markdown {
                let inferred = inferred_headings(&forest, &blocks, &levels);
                report.discrepancies = validate(&inferred, markdown);
            }
        }

        report.calibration = calibration;

        log::debug!(
            "Pipeline: {} elements in, {} retained, {} blocks, {} root sections",
            report.elements_ingested,
            report.elements_retained,
            report.block_count,
            forest.len()
        );

        StructureResult {
            forest,
            blocks,
            report,
        }
    }
}

/// Headings of the assembled forest with their nesting levels.
fn inferred_headings(forest: &[TreeNode], blocks: &[Block], levels: &[BlockLevel]) -> Vec<InferredHeading> {
    let sections: BTreeSet<&str> = blocks
        .iter()
        .zip(levels)
        .filter(|(_, level)| level.section().is_some())
        .map(|(block, _)| block.id.as_str())
        .collect();

    crate::model::walk_forest(forest)
        .filter_map(|node| {
            let first = node.source_block_ids.first()?;
            sections.contains(first.as_str()).then(|| InferredHeading {
                block_id: first.clone(),
                text: node.title.clone(),
                level: node.level,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(page: u32, y0: f32, text: &str) -> RawElement {
        RawElement::new(page, [0.1, y0, 0.82, y0 + 0.0432], "text", text)
    }

    #[test]
    fn test_empty_input() {
        let result = Pipeline::default().run(&[]);
        assert!(result.forest.is_empty());
        assert!(result.blocks.is_empty());
        assert_eq!(result.report.elements_ingested, 0);
    }

    #[test]
    fn test_run_single_section() {
        let raw = vec![
            RawElement::new(1, [0.1, 0.05, 0.6, 0.09], "title", "Annual Report"),
            body(1, 0.12, &"The year went well for everyone involved. ".repeat(8)),
            body(1, 0.2, &"Revenue grew in all regions we operate in. ".repeat(8)),
        ];
        let result = Pipeline::default().run(&raw);
        assert_eq!(result.forest.len(), 1);
        assert_eq!(result.forest[0].title, "Annual Report");
        assert_eq!(result.forest[0].level, 0);
        assert!(result.forest[0].content.contains("Revenue grew"));
    }

    #[test]
    fn test_short_documents_keep_classified_furniture() {
        let mut raw = vec![
            body(1, 0.1, &"First part of the text. ".repeat(12)),
            body(1, 0.2, &"Second part of the text. ".repeat(12)),
            body(1, 0.3, &"Third part of the text. ".repeat(12)),
            RawElement::new(1, [0.48, 0.96, 0.52, 0.975], "text", "7"),
        ];
        let result = Pipeline::default().run(&raw);
        assert!(result.report.discarded.is_empty());
        assert_eq!(result.report.elements_retained, 4);

        raw.push(RawElement::new(2, [0.48, 0.96, 0.52, 0.975], "page_number", "8"));
        raw.push(body(2, 0.1, &"Fourth part of the text. ".repeat(12)));
        let result = Pipeline::default().run(&raw);
        let reasons: Vec<DiscardReason> = result.report.discarded.iter().map(|d| d.reason).collect();
        assert_eq!(reasons, vec![DiscardReason::FurnitureLabel]);
        assert_eq!(result.report.elements_retained, 5);
    }

    #[test]
    fn test_run_json_rejects_null() {
        assert!(Pipeline::default().run_json("null").is_err());
        let result = Pipeline::default().run_json("[]").unwrap();
        assert!(result.forest.is_empty());
    }

    #[test]
    fn test_markdown_validation_toggle() {
        let raw = vec![
            RawElement::new(1, [0.1, 0.05, 0.6, 0.09], "title", "Annual Report"),
            body(1, 0.12, &"Some text about the year. ".repeat(10)),
        ];
        let md = "# Something Else\n";

        let result = Pipeline::default().run_with_markdown(&raw, Some(md));
        assert_eq!(result.report.discrepancies.len(), 2);

        let off = Pipeline::new(PipelineOptions::new().with_markdown_validation(false))
            .run_with_markdown(&raw, Some(md));
        assert!(off.report.discrepancies.is_empty());
        assert_eq!(off.forest, result.forest);
    }
}
