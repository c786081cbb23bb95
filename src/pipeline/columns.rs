//! Column detection.
//!
//! Each page's x-axis is sliced into bins; every element adds its height to
//! the bins it covers. A run of bins covered over less than `gap_coverage`
//! of the content height, with dense bins on both sides, is a gutter. The
//! widest qualifying gutter splits the page and each side is searched again
//! until no gutter remains.

use std::collections::BTreeMap;

use crate::model::{BoundingBox, Column};

use super::options::Thresholds;
use super::zones::Classified;

/// Column placement of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Index of the column holding the element's x-center
    pub column: usize,
    /// Whether the element crosses a gutter
    pub spanning: bool,
}

/// Columns of every page and the placement of every element.
#[derive(Debug, Clone, Default)]
pub struct ColumnLayout {
    /// Columns, grouped by page in page order, left to right within a page
    pub columns: Vec<Column>,
    /// Placement per element, parallel to the input
    pub placements: Vec<Placement>,
}

impl ColumnLayout {
    /// Columns of one page.
    pub fn page_columns(&self, page: u32) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(move |c| c.page == page)
    }

    /// Number of columns per page, in page order.
    pub fn counts(&self) -> Vec<(u32, usize)> {
        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for column in &self.columns {
            *counts.entry(column.page).or_default() += 1;
        }
        counts.into_iter().collect()
    }
}

/// Detect columns on every page and place each element.
pub fn layout_columns(elements: &[Classified], thresholds: &Thresholds) -> ColumnLayout {
    let mut pages: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (i, classified) in elements.iter().enumerate() {
        pages.entry(classified.element.page).or_default().push(i);
    }

    let mut layout = ColumnLayout {
        columns: Vec::new(),
        placements: vec![
            Placement {
                column: 0,
                spanning: false,
            };
            elements.len()
        ],
    };

    for (page, members) in pages {
        let boxes: Vec<BoundingBox> = members.iter().map(|&i| elements[i].element.bbox).collect();
        let mut columns = detect_columns(page, &boxes, thresholds);
        let gutters: Vec<f32> = columns.iter().skip(1).map(|c| c.left).collect();

        let mut placed: Vec<(usize, usize)> = Vec::with_capacity(members.len());
        for &i in &members {
            let bbox = &elements[i].element.bbox;
            let column = column_of(&columns, bbox.center_x());
            let spanning = gutters.iter().any(|&g| {
                bbox.x0 < g - thresholds.spanning_tolerance && bbox.x1 > g + thresholds.spanning_tolerance
            });
            layout.placements[i] = Placement { column, spanning };
            placed.push((column, i));
        }

        placed.sort_by(|&(ca, a), &(cb, b)| {
            let (ea, eb) = (&elements[a].element, &elements[b].element);
            ca.cmp(&cb)
                .then(ea.bbox.y0.total_cmp(&eb.bbox.y0))
                .then(ea.bbox.x0.total_cmp(&eb.bbox.x0))
                .then(ea.source_index.cmp(&eb.source_index))
        });
        for (column, i) in placed {
            columns[column]
                .member_element_ids
                .push(elements[i].element.id.clone());
        }

        log::debug!("Page {}: {} column(s)", page, columns.len());
        layout.columns.extend(columns);
    }

    layout
}

/// Index of the column containing `x`; columns partition [0, 1].
fn column_of(columns: &[Column], x: f32) -> usize {
    columns
        .iter()
        .position(|c| x < c.right)
        .unwrap_or(columns.len().saturating_sub(1))
}

/// Detect the columns of one page from its element boxes.
///
/// Returns at least one column. Columns are left to right and partition the
/// page width: the first starts at 0.0, the last ends at 1.0 and adjacent
/// columns meet at the gutter center.
pub fn detect_columns(page: u32, boxes: &[BoundingBox], thresholds: &Thresholds) -> Vec<Column> {
    let single = || vec![Column::new(page, 0, 0.0, 1.0)];
    if boxes.is_empty() {
        return single();
    }

    let bins = thresholds.histogram_bins.max(2);
    let bin_width = 1.0 / bins as f32;

    let top = boxes.iter().map(|b| b.y0).fold(f32::MAX, f32::min);
    let bottom = boxes.iter().map(|b| b.y1).fold(f32::MIN, f32::max);
    let content_height = bottom - top;
    if content_height <= 0.0 {
        return single();
    }

    let mut coverage = vec![0.0f32; bins];
    for bbox in boxes {
        let start = ((bbox.x0 / bin_width) as usize).min(bins - 1);
        let end = ((bbox.x1 / bin_width) as usize).min(bins - 1);
        for slot in coverage.iter_mut().take(end + 1).skip(start) {
            *slot += bbox.height();
        }
    }

    let first = coverage.iter().position(|&c| c > 0.0).unwrap_or(0);
    let last = coverage.iter().rposition(|&c| c > 0.0).unwrap_or(bins - 1);

    let dense = content_height * thresholds.gap_coverage;
    let min_gap_bins = (thresholds.min_gap_width / bin_width).ceil().max(1.0) as usize;
    let min_column_bins = (thresholds.min_column_width / bin_width).ceil() as usize;

    // Gutter centers in bin units; search ranges are inclusive bin ranges.
    let mut splits: Vec<f32> = Vec::new();
    let mut pending = vec![(first, last)];
    while let Some((lo, hi)) = pending.pop() {
        let Some((gap_start, gap_end)) =
            widest_gap(&coverage, lo, hi, dense, min_gap_bins, min_column_bins)
        else {
            continue;
        };
        let center = (gap_start + gap_end + 1) as f32 / 2.0;
        log::debug!(
            "Page {}: gutter at x={:.3} ({} bins wide)",
            page,
            center * bin_width,
            gap_end + 1 - gap_start
        );
        splits.push(center);
        pending.push((lo, gap_start.saturating_sub(1)));
        pending.push((gap_end + 1, hi));
    }

    if splits.is_empty() {
        return single();
    }
    splits.sort_by(|a, b| a.total_cmp(b));

    let mut edges = vec![0.0];
    edges.extend(splits.iter().map(|s| s * bin_width));
    edges.push(1.0);
    edges
        .windows(2)
        .enumerate()
        .map(|(index, w)| Column::new(page, index, w[0], w[1]))
        .collect()
}

/// Find the widest run of sparse bins in `lo..=hi` that has dense bins on
/// both sides and leaves wide enough columns.
fn widest_gap(
    coverage: &[f32],
    lo: usize,
    hi: usize,
    dense: f32,
    min_gap_bins: usize,
    min_column_bins: usize,
) -> Option<(usize, usize)> {
    if hi <= lo {
        return None;
    }

    let mut best: Option<(usize, usize)> = None;
    let mut run_start: Option<usize> = None;

    for i in lo..=hi + 1 {
        let sparse = i <= hi && coverage[i] < dense;
        match (sparse, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                run_start = None;
                let end = i - 1;
                if end - start + 1 < min_gap_bins || i > hi {
                    continue;
                }
                let dense_left = coverage[lo..start].iter().any(|&c| c >= dense);
                let dense_right = coverage[i..=hi].iter().any(|&c| c >= dense);
                let center2 = start + end + 1;
                let wide_left = center2 >= 2 * (lo + min_column_bins);
                let wide_right = 2 * (hi + 1) >= center2 + 2 * min_column_bins;
                if !(dense_left && dense_right && wide_left && wide_right) {
                    continue;
                }
                let wider = match best {
                    None => true,
                    Some((bs, be)) => end - start > be - bs,
                };
                if wider {
                    best = Some((start, end));
                }
            }
            _ => {}
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxes(specs: &[[f32; 4]]) -> Vec<BoundingBox> {
        specs
            .iter()
            .map(|b| BoundingBox::new(b[0], b[1], b[2], b[3]))
            .collect()
    }

    #[test]
    fn test_single_column() {
        let page = boxes(&[
            [0.1, 0.1, 0.9, 0.3],
            [0.1, 0.32, 0.6, 0.35],
            [0.1, 0.4, 0.9, 0.8],
        ]);
        let columns = detect_columns(1, &page, &Thresholds::default());
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].left, 0.0);
        assert_eq!(columns[0].right, 1.0);
    }

    #[test]
    fn test_two_columns() {
        let page = boxes(&[
            [0.08, 0.1, 0.46, 0.4],
            [0.08, 0.42, 0.46, 0.9],
            [0.54, 0.1, 0.92, 0.5],
            [0.54, 0.52, 0.92, 0.9],
        ]);
        let columns = detect_columns(1, &page, &Thresholds::default());
        assert_eq!(columns.len(), 2);
        assert!(columns[0].right > 0.46 && columns[0].right < 0.54);
        assert_eq!(columns[1].left, columns[0].right);
        assert_eq!(columns[1].index, 1);
    }

    #[test]
    fn test_three_columns() {
        let page = boxes(&[
            [0.05, 0.1, 0.3, 0.9],
            [0.36, 0.1, 0.64, 0.9],
            [0.7, 0.1, 0.95, 0.9],
        ]);
        let columns = detect_columns(2, &page, &Thresholds::default());
        assert_eq!(columns.len(), 3);
        assert!(columns.iter().all(|c| c.page == 2));
    }

    #[test]
    fn test_spanning_title_keeps_gutter() {
        let page = boxes(&[
            [0.1, 0.04, 0.9, 0.08],
            [0.08, 0.1, 0.46, 0.9],
            [0.54, 0.1, 0.92, 0.9],
        ]);
        let columns = detect_columns(1, &page, &Thresholds::default());
        assert_eq!(columns.len(), 2);
    }

    #[test]
    fn test_narrow_gap_ignored() {
        let page = boxes(&[[0.1, 0.1, 0.495, 0.9], [0.505, 0.1, 0.9, 0.9]]);
        let columns = detect_columns(1, &page, &Thresholds::default());
        assert_eq!(columns.len(), 1);
    }
}
