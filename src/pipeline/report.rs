//! Diagnostics collected while the pipeline runs.

use serde::{Deserialize, Serialize};

use super::calibration::Calibration;
use super::markdown::Discrepancy;

/// Why an input record was rejected at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// No page number
    MissingPage,
    /// Page number 0
    InvalidPage,
    /// No usable bounding box
    MissingBbox,
    /// Bounding box contains NaN or infinity
    NonFiniteBbox,
    /// Bounding box has no area after normalization
    DegenerateBbox,
    /// Id already used by an earlier element
    DuplicateId,
}

/// A record dropped at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Position in the input sequence
    pub index: usize,
    /// Element id, when the record had one
    pub element_id: Option<String>,
    /// Why it was dropped
    pub reason: DropReason,
}

/// Why a valid element was excluded from structural analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    /// Recurs at the same position across most pages
    RecurringFurniture,
    /// OCR labelled it header/footer/page number (short documents)
    FurnitureLabel,
    /// Too small to carry content
    Noise,
    /// Small element in a side margin
    Margin,
    /// Zone classifier found page furniture
    ClassifiedFurniture,
}

/// An element removed by the filter stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discarded {
    /// Element id
    pub element_id: String,
    /// Page of the element
    pub page: u32,
    /// Why it was removed
    pub reason: DiscardReason,
}

/// Everything the caller may want to know about a run besides the tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Records rejected at ingestion
    pub dropped: Vec<Diagnostic>,
    /// Elements removed by the filters
    pub discarded: Vec<Discarded>,
    /// Thresholds used for this document
    pub calibration: Calibration,
    /// Markdown validation mismatches (never applied to the tree)
    pub discrepancies: Vec<Discrepancy>,
    /// Number of elements accepted at ingestion
    pub elements_ingested: usize,
    /// Number of elements that reached grouping
    pub elements_retained: usize,
    /// Number of pages with retained content
    pub page_count: usize,
    /// Detected columns per page, in page order
    pub columns_per_page: Vec<(u32, usize)>,
    /// Number of blocks built
    pub block_count: usize,
}

impl PipelineReport {
    /// Check if calibration fell back for lack of samples.
    pub fn is_low_confidence(&self) -> bool {
        self.calibration.low_confidence
    }

    /// Check if the run produced any validation mismatch.
    pub fn has_discrepancies(&self) -> bool {
        !self.discrepancies.is_empty()
    }
}
