//! Line and block grouping inside columns.

use std::collections::BTreeMap;

use crate::model::{Block, BoundingBox, Zone};

use super::calibration::{median, Calibration};
use super::columns::Placement;
use super::options::Thresholds;
use super::patterns::patterns;
use super::zones::Classified;

/// Largest gap between two lines of one heading, in heading glyph heights.
const HEADING_LINE_GAP: f32 = 0.6;

/// Largest glyph size ratio between two lines of one heading.
const HEADING_SIZE_RATIO: f32 = 1.2;

/// Elements sharing a zone and a baseline band.
#[derive(Debug, Clone)]
struct Line<'a> {
    members: Vec<&'a Classified>,
    bbox: BoundingBox,
    zone: Zone,
    spanning: bool,
}

impl<'a> Line<'a> {
    fn new(first: &'a Classified, spanning: bool) -> Self {
        Self {
            members: vec![first],
            bbox: first.element.bbox,
            zone: first.zone,
            spanning,
        }
    }

    fn push(&mut self, member: &'a Classified) {
        self.bbox = self.bbox.union(&member.element.bbox);
        self.members.push(member);
    }

    fn text(&self) -> String {
        let mut members = self.members.clone();
        members.sort_by(|a, b| a.element.bbox.x0.total_cmp(&b.element.bbox.x0));
        members
            .iter()
            .map(|m| m.element.text().trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn glyph_size(&self) -> f32 {
        self.members
            .iter()
            .map(|m| m.glyph_size)
            .fold(0.0, f32::max)
    }
}

/// Group placed elements into blocks, column by column.
///
/// Blocks come out grouped by page and column, top to bottom within a
/// column; `order_index` is the column-local position.
pub fn build_blocks(
    elements: &[Classified],
    placements: &[Placement],
    calibration: &Calibration,
    thresholds: &Thresholds,
) -> Vec<Block> {
    let mut columns: BTreeMap<(u32, usize), Vec<(&Classified, bool)>> = BTreeMap::new();
    for (classified, placement) in elements.iter().zip(placements) {
        columns
            .entry((classified.element.page, placement.column))
            .or_default()
            .push((classified, placement.spanning));
    }

    let mut blocks = Vec::new();
    for ((page, column), mut members) in columns {
        members.sort_by(|(a, _), (b, _)| {
            a.element
                .bbox
                .y0
                .total_cmp(&b.element.bbox.y0)
                .then(a.element.bbox.x0.total_cmp(&b.element.bbox.x0))
                .then(a.element.source_index.cmp(&b.element.source_index))
        });

        let lines = group_lines(&members, thresholds);
        let groups = merge_lines(lines, calibration, thresholds);

        let mut previous_bottom: Option<f32> = None;
        for (order_index, group) in groups.into_iter().enumerate() {
            let block = make_block(page, column, order_index, &group, previous_bottom);
            previous_bottom = Some(block.bbox.y1);
            blocks.push(block);
        }
    }

    link_captions(&mut blocks, thresholds);
    log::debug!("Built {} blocks", blocks.len());
    blocks
}

/// Split a column's members (sorted top to bottom) into lines.
fn group_lines<'a>(members: &[(&'a Classified, bool)], thresholds: &Thresholds) -> Vec<Line<'a>> {
    let mut lines: Vec<Line<'a>> = Vec::new();
    for &(member, spanning) in members {
        if let Some(line) = lines.last_mut() {
            if line.zone == member.zone
                && line.spanning == spanning
                && line.bbox.vertical_overlap(&member.element.bbox) >= thresholds.line_overlap
            {
                line.push(member);
                continue;
            }
        }
        lines.push(Line::new(member, spanning));
    }
    lines
}

/// Merge consecutive lines into block groups.
fn merge_lines<'a>(
    lines: Vec<Line<'a>>,
    calibration: &Calibration,
    thresholds: &Thresholds,
) -> Vec<Vec<Line<'a>>> {
    let mut groups: Vec<Vec<Line<'a>>> = Vec::new();
    for line in lines {
        let merge = match groups.last() {
            Some(group) => match group.last() {
                Some(previous) => continues(group, previous, &line, calibration, thresholds),
                None => false,
            },
            None => false,
        };

        if merge {
            if let Some(group) = groups.last_mut() {
                group.push(line);
            }
        } else {
            groups.push(vec![line]);
        }
    }
    groups
}

/// Decide whether `line` continues the block ending with `previous`.
fn continues(
    group: &[Line<'_>],
    previous: &Line<'_>,
    line: &Line<'_>,
    calibration: &Calibration,
    thresholds: &Thresholds,
) -> bool {
    if previous.zone != line.zone || previous.spanning != line.spanning {
        return false;
    }

    let gap = previous.bbox.vertical_gap_to(&line.bbox);
    let aligned = previous.bbox.horizontal_overlap(&line.bbox) >= thresholds.min_horizontal_overlap;
    if !aligned {
        return false;
    }

    match line.zone {
        Zone::Table | Zone::Figure | Zone::PageFurniture => false,
        Zone::Title | Zone::Heading => {
            // A heading continues over one more line at the same size; a new
            // section number always starts a new heading.
            let (a, b) = (previous.glyph_size(), line.glyph_size());
            let similar = a.max(b) <= a.min(b) * HEADING_SIZE_RATIO;
            let tight = gap <= HEADING_LINE_GAP * a.max(b);
            group.len() < 2
                && similar
                && tight
                && !patterns().section_number.is_match(&line.text())
        }
        Zone::Body | Zone::Caption | Zone::Footnote => gap <= calibration.merge_gap,
    }
}

fn make_block(
    page: u32,
    column: usize,
    order_index: usize,
    lines: &[Line<'_>],
    previous_bottom: Option<f32>,
) -> Block {
    let mut bbox = lines[0].bbox;
    for line in &lines[1..] {
        bbox = bbox.union(&line.bbox);
    }

    let mut element_ids = Vec::new();
    let mut glyphs = Vec::new();
    let mut source_index = usize::MAX;
    for line in lines {
        let mut members = line.members.clone();
        members.sort_by(|a, b| a.element.bbox.x0.total_cmp(&b.element.bbox.x0));
        for member in members {
            element_ids.push(member.element.id.clone());
            glyphs.push(member.glyph_size);
            source_index = source_index.min(member.element.source_index);
        }
    }

    let zone = lines[0].zone;
    let glyph_size = if zone.is_sectioning() {
        glyphs.iter().copied().fold(0.0, f32::max)
    } else {
        median(&glyphs).unwrap_or(0.0)
    };

    let separator = if zone.is_sectioning() { " " } else { "\n" };
    let text_full = lines
        .iter()
        .map(|l| l.text())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(separator);

    Block {
        id: format!("p{}-c{}-b{}", page, column, order_index),
        page,
        column,
        bbox,
        zone,
        text_full,
        order_index,
        element_ids,
        spanning: lines[0].spanning,
        glyph_size,
        gap_before: previous_bottom.map_or(0.0, |bottom| (bbox.y0 - bottom).max(0.0)),
        caption_of: None,
        source_index,
    }
}

/// Link every caption to the nearest aligned figure/table on its page.
fn link_captions(blocks: &mut [Block], thresholds: &Thresholds) {
    let mut links = Vec::new();
    for (i, caption) in blocks.iter().enumerate() {
        if caption.zone != Zone::Caption {
            continue;
        }
        let nearest = blocks
            .iter()
            .filter(|b| b.page == caption.page && matches!(b.zone, Zone::Figure | Zone::Table))
            .filter(|b| b.bbox.horizontal_overlap(&caption.bbox) > 0.0)
            .map(|b| {
                let distance = (b.bbox.y0 - caption.bbox.y1)
                    .max(caption.bbox.y0 - b.bbox.y1)
                    .max(0.0);
                (distance, b)
            })
            .filter(|(distance, _)| *distance <= thresholds.caption_link_distance)
            .min_by(|(da, a), (db, b)| da.total_cmp(db).then(a.id.cmp(&b.id)));
        if let Some((_, target)) = nearest {
            links.push((i, target.id.clone()));
        }
    }
    for (i, target) in links {
        blocks[i].caption_of = Some(target);
    }
}
