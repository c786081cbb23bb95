//! Zone classification.
//!
//! Labels that carry their meaning on their own map directly. Ambiguous
//! labels ("text", "paragraph", anything unknown) go through an ordered
//! decision table; the first rule that fires wins and Body is the fallback.

use std::collections::BTreeMap;

use crate::model::{LayoutElement, Zone};

use super::calibration::GlyphStats;
use super::options::Thresholds;
use super::patterns::patterns;

/// Characters at the end of a line that mark running text.
const TERMINAL_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '。', '？', '！'];

/// Longest line a text-shape heading may have, in words.
const MAX_HEADING_WORDS: usize = 12;

/// Half-width of the band around the page center that counts as centered.
const CENTER_TOLERANCE: f32 = 0.1;

/// An element together with its zone and estimated glyph size.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    /// The element
    pub element: LayoutElement,
    /// Assigned zone
    pub zone: Zone,
    /// Estimated glyph height
    pub glyph_size: f32,
}

/// Which rule assigned a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Label,
    Caption,
    PageNumber,
    Footnote,
    Size,
    Shape,
    Fallback,
}

/// Assign exactly one zone to every element.
///
/// With `enabled` off the raw label is mapped verbatim (unknown → Body).
pub fn classify_zones(
    elements: Vec<LayoutElement>,
    thresholds: &Thresholds,
    enabled: bool,
) -> Vec<Classified> {
    let glyphs: Vec<f32> = elements.iter().map(|e| e.glyph_size()).collect();

    if !enabled {
        return elements
            .into_iter()
            .zip(glyphs)
            .map(|(element, glyph_size)| Classified {
                zone: Zone::from_raw_label(&element.raw_label),
                element,
                glyph_size,
            })
            .collect();
    }

    let classifier = ZoneClassifier::new(&elements, &glyphs, thresholds);
    let mut zones: Vec<(Zone, Rule)> = (0..elements.len()).map(|i| classifier.classify(i)).collect();
    resolve_title_ties(&elements, &mut zones);

    let mut counts: BTreeMap<Zone, usize> = BTreeMap::new();
    for (zone, _) in &zones {
        *counts.entry(*zone).or_default() += 1;
    }
    log::debug!("Zone counts: {:?}", counts);

    elements
        .into_iter()
        .zip(glyphs)
        .zip(zones)
        .map(|((element, glyph_size), (zone, _))| Classified {
            element,
            zone,
            glyph_size,
        })
        .collect()
}

/// Read-only view over one document used by the decision table.
struct ZoneClassifier<'a> {
    elements: &'a [LayoutElement],
    glyphs: &'a [f32],
    thresholds: &'a Thresholds,
    stats: GlyphStats,
    /// Largest text glyph per page
    page_max: BTreeMap<u32, f32>,
    /// Indices of figure/table elements per page
    anchors: BTreeMap<u32, Vec<usize>>,
}

impl<'a> ZoneClassifier<'a> {
    fn new(elements: &'a [LayoutElement], glyphs: &'a [f32], thresholds: &'a Thresholds) -> Self {
        let is_text = |e: &LayoutElement| {
            !e.text().trim().is_empty()
                && matches!(Zone::from_unambiguous_label(&e.raw_label), None | Some(Zone::Body))
        };

        let stats = GlyphStats::compute(
            elements
                .iter()
                .zip(glyphs)
                .filter(|(e, _)| is_text(e))
                .map(|(e, &g)| (e.page, g)),
        );

        let mut page_max: BTreeMap<u32, f32> = BTreeMap::new();
        let mut anchors: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (i, element) in elements.iter().enumerate() {
            if is_text(element) {
                let max = page_max.entry(element.page).or_insert(0.0);
                *max = max.max(glyphs[i]);
            }
            if matches!(
                Zone::from_unambiguous_label(&element.raw_label),
                Some(Zone::Figure | Zone::Table)
            ) {
                anchors.entry(element.page).or_default().push(i);
            }
        }

        Self {
            elements,
            glyphs,
            thresholds,
            stats,
            page_max,
            anchors,
        }
    }

    fn classify(&self, index: usize) -> (Zone, Rule) {
        let element = &self.elements[index];
        if let Some(zone) = Zone::from_unambiguous_label(&element.raw_label) {
            return (zone, Rule::Label);
        }

        let text = element.text().trim();
        if text.is_empty() {
            return (Zone::Body, Rule::Fallback);
        }

        let p = patterns();
        let t = self.thresholds;
        let glyph = self.glyphs[index];
        let median = self.stats.page(element.page);
        let bbox = &element.bbox;

        if p.caption.is_match(text) && self.is_near_anchor(index) {
            return (Zone::Caption, Rule::Caption);
        }

        let in_band = bbox.center_y() < t.furniture_band || bbox.center_y() > 1.0 - t.furniture_band;
        if in_band && p.page_number.is_match(text) {
            return (Zone::PageFurniture, Rule::PageNumber);
        }

        if bbox.y0 >= t.footnote_band && median > 0.0 && glyph < median {
            return (Zone::Footnote, Rule::Footnote);
        }

        let chars = text.chars().count();
        let short = chars <= t.max_heading_chars;
        if median > 0.0 && short && glyph > median * t.heading_size_ratio {
            let page_max = self.page_max.get(&element.page).copied().unwrap_or(glyph);
            let placed = bbox.y0 < t.title_band || (bbox.center_x() - 0.5).abs() < CENTER_TOLERANCE;
            if glyph >= median * t.title_size_ratio && glyph >= page_max && placed {
                return (Zone::Title, Rule::Size);
            }
            return (Zone::Heading, Rule::Size);
        }

        if short && element.explicit_lines() <= 1 {
            if p.section_number.is_match(text) {
                return (Zone::Heading, Rule::Shape);
            }
            if self.looks_like_heading_line(index, text) {
                return (Zone::Heading, Rule::Shape);
            }
        }

        (Zone::Body, Rule::Fallback)
    }

    /// Check for a figure or table on the same page within caption distance.
    fn is_near_anchor(&self, index: usize) -> bool {
        let bbox = &self.elements[index].bbox;
        let Some(anchors) = self.anchors.get(&self.elements[index].page) else {
            return false;
        };
        anchors.iter().any(|&a| {
            let other = &self.elements[a].bbox;
            let distance = (other.y0 - bbox.y1).max(bbox.y0 - other.y1).max(0.0);
            distance <= self.thresholds.caption_distance && bbox.horizontal_overlap(other) > 0.0
        })
    }

    /// A short isolated line without terminal punctuation, starting with a
    /// capital letter and at least body-sized.
    fn looks_like_heading_line(&self, index: usize, text: &str) -> bool {
        let element = &self.elements[index];
        let median = self.stats.page(element.page);

        let words = text.split_whitespace().count();
        let capitalized = text.chars().next().is_some_and(|c| c.is_uppercase());
        let unterminated = !text.ends_with(TERMINAL_PUNCTUATION);
        let body_sized = median <= 0.0 || self.glyphs[index] >= median * 0.95;
        // Narrow line: a heading rarely fills its column the way a full line
        // of running text does.
        let narrow = element.bbox.width() < 0.6;

        if !(words <= MAX_HEADING_WORDS && capitalized && unterminated && body_sized && narrow) {
            return false;
        }

        // Isolated: nothing else shares its line (rules out table rows,
        // form fields and run-in fragments).
        !self.elements.iter().enumerate().any(|(j, other)| {
            j != index
                && other.page == element.page
                && other.bbox.vertical_overlap(&element.bbox) > 0.5
        })
    }
}

/// Keep at most one Title per document.
///
/// A Title from the OCR label is already assigned, so every size-rule
/// candidate is demoted. Otherwise the first candidate in page order, then
/// top-to-bottom, then left-to-right, keeps it.
fn resolve_title_ties(elements: &[LayoutElement], zones: &mut [(Zone, Rule)]) {
    let labelled = zones
        .iter()
        .any(|(zone, rule)| *zone == Zone::Title && *rule == Rule::Label);

    let mut candidates: Vec<usize> = zones
        .iter()
        .enumerate()
        .filter(|(_, (zone, rule))| *zone == Zone::Title && *rule == Rule::Size)
        .map(|(i, _)| i)
        .collect();
    candidates.sort_by(|&a, &b| {
        let (ea, eb) = (&elements[a], &elements[b]);
        ea.page
            .cmp(&eb.page)
            .then(ea.bbox.y0.total_cmp(&eb.bbox.y0))
            .then(ea.bbox.x0.total_cmp(&eb.bbox.x0))
            .then(ea.source_index.cmp(&eb.source_index))
    });

    let keep = if labelled { 0 } else { 1 };
    for &i in candidates.iter().skip(keep) {
        zones[i].0 = Zone::Heading;
    }
    if candidates.len() > keep {
        log::debug!("Demoted {} title candidate(s) to headings", candidates.len() - keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    fn element(id: &str, bbox: [f32; 4], label: &str, text: &str) -> LayoutElement {
        LayoutElement {
            id: id.to_string(),
            page: 1,
            bbox: BoundingBox::new(bbox[0], bbox[1], bbox[2], bbox[3]),
            raw_label: label.to_string(),
            text_content: text.to_string(),
            text_full: text.to_string(),
            aspect: 1.0,
            source_index: 0,
        }
    }

    /// A paragraph of `lines` wrapped lines with 0.012 glyphs.
    fn paragraph(id: &str, y0: f32, lines: usize) -> LayoutElement {
        let height = lines as f32 * 1.2 * 0.012;
        let text = "lorem ipsum dolor sit amet ".repeat(lines * 4);
        element(id, [0.1, y0, 0.82, y0 + height], "text", text.trim())
    }

    fn zones_of(elements: Vec<LayoutElement>) -> Vec<Zone> {
        classify_zones(elements, &Thresholds::default(), true)
            .into_iter()
            .map(|c| c.zone)
            .collect()
    }

    #[test]
    fn test_labels_map_directly() {
        let zones = zones_of(vec![
            element("t", [0.1, 0.1, 0.9, 0.4], "table", ""),
            element("f", [0.1, 0.5, 0.9, 0.8], "image", ""),
            element("h", [0.1, 0.01, 0.9, 0.03], "header", "Running head"),
        ]);
        assert_eq!(zones, vec![Zone::Table, Zone::Figure, Zone::PageFurniture]);
    }

    #[test]
    fn test_caption_needs_adjacent_figure() {
        let zones = zones_of(vec![
            element("f", [0.1, 0.1, 0.9, 0.4], "figure", ""),
            element("c", [0.1, 0.41, 0.9, 0.43], "text", "Figure 1: Overview"),
            element("x", [0.1, 0.8, 0.9, 0.82], "text", "Figure 2 shows the rest"),
        ]);
        assert_eq!(zones[1], Zone::Caption);
        assert_ne!(zones[2], Zone::Caption);
    }

    #[test]
    fn test_page_number_and_footnote() {
        let zones = zones_of(vec![
            paragraph("p1", 0.1, 5),
            paragraph("p2", 0.2, 5),
            paragraph("p3", 0.3, 5),
            element("n", [0.48, 0.96, 0.52, 0.975], "text", "- 7 -"),
            element("fn", [0.1, 0.9, 0.82, 0.91], "text", "1 See the appendix for details of the method used."),
        ]);
        assert_eq!(zones[3], Zone::PageFurniture);
        assert_eq!(zones[4], Zone::Footnote);
    }

    #[test]
    fn test_size_heading_and_single_title() {
        let zones = zones_of(vec![
            element("t1", [0.2, 0.03, 0.8, 0.08], "text", "A Study of Layouts"),
            element("t2", [0.2, 0.09, 0.8, 0.14], "text", "Another Big Line"),
            paragraph("p1", 0.2, 5),
            element("h", [0.1, 0.3, 0.5, 0.325], "text", "Background"),
            paragraph("p2", 0.33, 5),
            paragraph("p3", 0.45, 5),
        ]);
        assert_eq!(zones[0], Zone::Title);
        assert_eq!(zones[1], Zone::Heading);
        assert_eq!(zones[3], Zone::Heading);
        assert_eq!(zones[2], Zone::Body);
    }

    /// A large centered line on `page`, well above body size.
    fn chapter(id: &str, page: u32, text: &str) -> LayoutElement {
        let mut e = element(id, [0.3, 0.1, 0.7, 0.145], "text", text);
        e.page = page;
        e
    }

    fn body_on(id: &str, page: u32, y0: f32) -> LayoutElement {
        let mut e = paragraph(id, y0, 5);
        e.page = page;
        e
    }

    #[test]
    fn test_labelled_title_blocks_heuristic_titles() {
        let mut elements = vec![element("t", [0.2, 0.03, 0.8, 0.08], "title", "Handbook")];
        for page in 1..=3 {
            elements.push(chapter(&format!("c{}", page), page, &format!("Chapter {}", page)));
            for (i, y0) in [0.2, 0.3, 0.4].iter().enumerate() {
                elements.push(body_on(&format!("p{}-{}", page, i), page, *y0));
            }
        }
        let zones = zones_of(elements);

        assert_eq!(zones[0], Zone::Title);
        assert_eq!(zones.iter().filter(|z| **z == Zone::Title).count(), 1);
        for chapter in [1, 5, 9] {
            assert_eq!(zones[chapter], Zone::Heading);
        }
    }

    #[test]
    fn test_first_heuristic_title_in_document_wins() {
        let mut elements = Vec::new();
        for page in (1..=3).rev() {
            elements.push(chapter(&format!("c{}", page), page, &format!("Part {}", page)));
            for (i, y0) in [0.2, 0.3, 0.4].iter().enumerate() {
                elements.push(body_on(&format!("p{}-{}", page, i), page, *y0));
            }
        }
        let zones = zones_of(elements);

        // Emitted page 3 first; page 1's candidate still wins.
        assert_eq!(zones[8], Zone::Title);
        assert_eq!(zones[0], Zone::Heading);
        assert_eq!(zones[4], Zone::Heading);
    }

    #[test]
    fn test_section_number_heading() {
        let zones = zones_of(vec![
            paragraph("p1", 0.1, 5),
            element("h", [0.1, 0.2, 0.4, 0.2144], "text", "2.1 Methods"),
            paragraph("p2", 0.22, 5),
            paragraph("p3", 0.32, 5),
        ]);
        assert_eq!(zones[1], Zone::Heading);
    }

    #[test]
    fn test_disabled_uses_raw_label() {
        let classified = classify_zones(
            vec![
                element("a", [0.1, 0.1, 0.9, 0.2], "text", "Figure 1: x"),
                element("b", [0.1, 0.3, 0.9, 0.4], "sub_title", "Intro"),
            ],
            &Thresholds::default(),
            false,
        );
        assert_eq!(classified[0].zone, Zone::Body);
        assert_eq!(classified[1].zone, Zone::Heading);
    }
}
