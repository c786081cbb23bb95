//! Per-document threshold calibration.
//!
//! A [`Calibration`] is computed once per document from the classified,
//! column-assigned elements and is read-only afterwards. Block grouping uses
//! its merge gap; the hierarchy builder uses its heading tiers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Zone;

use super::columns::Placement;
use super::options::Thresholds;
use super::patterns::patterns;
use super::zones::Classified;

/// Fewest text elements a page needs to get its own glyph median.
const MIN_PAGE_SAMPLES: usize = 3;

/// Where the thresholds of a run came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationSource {
    /// Derived from the document's own statistics
    Adaptive,
    /// Fixed defaults, adaptive thresholds disabled
    #[default]
    Defaults,
    /// Fixed defaults, too few samples to calibrate
    InsufficientSamples,
}

/// A band of heading glyph sizes sharing one level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadingTier {
    /// Heading level (1 = shallowest heading)
    pub level: u32,
    /// Smallest glyph size in the tier
    pub min_size: f32,
    /// Largest glyph size in the tier
    pub max_size: f32,
}

impl HeadingTier {
    fn distance(&self, size: f32) -> f32 {
        if size < self.min_size {
            self.min_size - size
        } else if size > self.max_size {
            size - self.max_size
        } else {
            0.0
        }
    }
}

/// Thresholds used for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Where the thresholds came from
    pub source: CalibrationSource,
    /// Set when calibration fell back for lack of heading samples
    pub low_confidence: bool,
    /// Median body glyph size over the document
    pub median_glyph: f32,
    /// Median glyph size per page (pages with enough text only)
    pub page_medians: BTreeMap<u32, f32>,
    /// Median heading glyph size (0.0 without headings)
    pub median_heading_glyph: f32,
    /// Largest vertical gap that still merges two lines into one block
    pub merge_gap: f32,
    /// Gaps above this are unusually large
    pub large_gap: f32,
    /// Heading tiers, largest type first (empty when using defaults)
    pub tiers: Vec<HeadingTier>,
    /// Number of heading candidates seen
    pub heading_samples: usize,
    /// Deepest heading level assigned
    pub max_depth: u32,
    /// Heading/body ratio for level 1 under defaults
    pub level1_ratio: f32,
    /// Heading/body ratio for level 2 under defaults
    pub level2_ratio: f32,
}

impl Calibration {
    /// Fixed thresholds for a document with the given median body glyph.
    pub fn defaults(median_glyph: f32, thresholds: &Thresholds) -> Self {
        Self {
            source: CalibrationSource::Defaults,
            low_confidence: false,
            median_glyph,
            page_medians: BTreeMap::new(),
            median_heading_glyph: 0.0,
            merge_gap: thresholds.default_merge_gap_ratio * median_glyph,
            large_gap: thresholds.default_large_gap,
            tiers: Vec::new(),
            heading_samples: 0,
            max_depth: thresholds.max_heading_depth.max(1),
            level1_ratio: thresholds.default_level1_ratio,
            level2_ratio: thresholds.default_level2_ratio,
        }
    }

    /// Calibrate from classified elements and their column placement.
    ///
    /// `elements` and `placements` are parallel. With `adaptive` off, or with
    /// fewer than `min_calibration_samples` heading candidates, the fixed
    /// defaults are used; only the second case is flagged low-confidence.
    pub fn compute(
        elements: &[Classified],
        placements: &[Placement],
        thresholds: &Thresholds,
        adaptive: bool,
    ) -> Self {
        let stats = GlyphStats::compute(
            elements
                .iter()
                .filter(|c| c.zone == Zone::Body && !c.element.text().trim().is_empty())
                .map(|c| (c.element.page, c.glyph_size)),
        );

        let mut headings: Vec<f32> = elements
            .iter()
            .filter(|c| c.zone == Zone::Heading)
            .map(|c| c.glyph_size)
            .collect();
        headings.sort_by(|a, b| b.total_cmp(a));

        let mut calibration = Self::defaults(stats.document, thresholds);
        calibration.page_medians = stats.pages.clone();
        calibration.heading_samples = headings.len();
        calibration.median_heading_glyph = median(&headings).unwrap_or(0.0);

        if !adaptive {
            log::debug!("Adaptive thresholds disabled, using defaults");
            return calibration;
        }

        let min_samples = thresholds.min_calibration_samples.max(1);
        let gaps = column_gaps(elements, placements);

        if gaps.len() >= min_samples && stats.document > 0.0 {
            if let Some(gap) = percentile(&gaps, thresholds.merge_gap_percentile) {
                calibration.merge_gap = gap.clamp(0.5 * stats.document, 3.0 * stats.document);
            }
            if let Some(gap) = percentile(&gaps, thresholds.large_gap_percentile) {
                calibration.large_gap = gap.max(calibration.merge_gap);
            }
        }

        if headings.len() < min_samples {
            log::warn!(
                "Only {} heading candidates (need {}), using default heading thresholds",
                headings.len(),
                min_samples
            );
            calibration.source = CalibrationSource::InsufficientSamples;
            calibration.low_confidence = true;
            return calibration;
        }

        calibration.source = CalibrationSource::Adaptive;
        calibration.tiers = heading_tiers(&headings, thresholds.tier_floor, calibration.max_depth);

        log::debug!(
            "Calibrated: median glyph {:.4}, merge gap {:.4}, large gap {:.4}, {} heading tiers",
            calibration.median_glyph,
            calibration.merge_gap,
            calibration.large_gap,
            calibration.tiers.len()
        );
        calibration
    }

    /// Glyph median for a page, falling back to the document median.
    pub fn page_median(&self, page: u32) -> f32 {
        self.page_medians
            .get(&page)
            .copied()
            .unwrap_or(self.median_glyph)
    }

    /// Level of a heading with the given glyph size, preceding gap and text.
    ///
    /// Level 1 is the shallowest heading; titles are handled by the caller.
    pub fn heading_level(&self, glyph_size: f32, gap_before: f32, text: &str) -> u32 {
        if self.tiers.is_empty() {
            return self.default_level(glyph_size);
        }

        if self.tiers.len() == 1 {
            let depth = patterns().numbering_depth(text).unwrap_or(1);
            return depth.clamp(1, self.max_depth);
        }

        let mut level = self
            .tiers
            .iter()
            .min_by(|a, b| a.distance(glyph_size).total_cmp(&b.distance(glyph_size)))
            .map(|tier| tier.level)
            .unwrap_or(1);

        if level > 1 && gap_before > self.large_gap && glyph_size > self.median_heading_glyph {
            level -= 1;
        }
        level
    }

    fn default_level(&self, glyph_size: f32) -> u32 {
        if self.median_glyph <= 0.0 {
            return 1;
        }
        let ratio = glyph_size / self.median_glyph;
        let level = if ratio >= self.level1_ratio {
            1
        } else if ratio >= self.level2_ratio {
            2
        } else {
            3
        };
        level.min(self.max_depth)
    }
}

/// Glyph size medians per document and per page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphStats {
    /// Median over all samples (0.0 without samples)
    pub document: f32,
    /// Median per page, for pages with enough samples
    pub pages: BTreeMap<u32, f32>,
}

impl GlyphStats {
    /// Compute medians from `(page, glyph_size)` samples.
    pub fn compute(samples: impl Iterator<Item = (u32, f32)>) -> Self {
        let mut all = Vec::new();
        let mut by_page: BTreeMap<u32, Vec<f32>> = BTreeMap::new();
        for (page, size) in samples {
            all.push(size);
            by_page.entry(page).or_default().push(size);
        }

        let pages = by_page
            .into_iter()
            .filter(|(_, sizes)| sizes.len() >= MIN_PAGE_SAMPLES)
            .filter_map(|(page, sizes)| median(&sizes).map(|m| (page, m)))
            .collect();

        Self {
            document: median(&all).unwrap_or(0.0),
            pages,
        }
    }

    /// Median for a page, falling back to the document median.
    pub fn page(&self, page: u32) -> f32 {
        self.pages.get(&page).copied().unwrap_or(self.document)
    }
}

/// Median of unsorted values.
pub(crate) fn median(values: &[f32]) -> Option<f32> {
    percentile(values, 0.5)
}

/// Linear-interpolated percentile (`q` in 0..=1) of unsorted values.
pub(crate) fn percentile(values: &[f32], q: f32) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f32;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f32;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Non-negative gaps between vertically consecutive text elements sharing a
/// column.
fn column_gaps(elements: &[Classified], placements: &[Placement]) -> Vec<f32> {
    let mut columns: BTreeMap<(u32, usize), Vec<&Classified>> = BTreeMap::new();
    for (classified, placement) in elements.iter().zip(placements) {
        if placement.spanning || !classified.zone.is_textual() {
            continue;
        }
        columns
            .entry((classified.element.page, placement.column))
            .or_default()
            .push(classified);
    }

    let mut gaps = Vec::new();
    for members in columns.values_mut() {
        members.sort_by(|a, b| a.element.bbox.y0.total_cmp(&b.element.bbox.y0));
        for pair in members.windows(2) {
            let gap = pair[0].element.bbox.vertical_gap_to(&pair[1].element.bbox);
            if gap >= 0.0 {
                gaps.push(gap);
            }
        }
    }
    gaps
}

/// Split heading sizes (sorted descending) into tiers.
fn heading_tiers(sizes: &[f32], tier_floor: f32, max_depth: u32) -> Vec<HeadingTier> {
    let diffs: Vec<f32> = sizes.windows(2).map(|w| w[0] - w[1]).collect();
    let median_size = median(sizes).unwrap_or(0.0);
    let median_diff = median(&diffs).unwrap_or(0.0);
    let split = (tier_floor * median_size).max(2.0 * median_diff);

    let mut bands: Vec<(f32, f32)> = Vec::new();
    for (i, &size) in sizes.iter().enumerate() {
        let starts_tier = i == 0 || diffs[i - 1] > split;
        match bands.last_mut() {
            Some(band) if !starts_tier => band.0 = size,
            _ => bands.push((size, size)),
        }
    }

    // Collapse the smallest bands into the deepest allowed level.
    let max_tiers = max_depth.max(1) as usize;
    while bands.len() > max_tiers {
        if let Some((min, _)) = bands.pop() {
            if let Some(last) = bands.last_mut() {
                last.0 = min;
            }
        }
    }

    bands
        .into_iter()
        .enumerate()
        .map(|(i, (min_size, max_size))| HeadingTier {
            level: i as u32 + 1,
            min_size,
            max_size,
        })
        .collect()
}
