//! Element filter: running headers/footers, noise and margin clutter.

use std::collections::{BTreeMap, BTreeSet};

use unicode_normalization::UnicodeNormalization;

use crate::model::{is_furniture_label, LayoutElement};

use super::options::Thresholds;
use super::patterns::patterns;
use super::report::{DiscardReason, Discarded};

/// Elements kept for structural analysis and the ones removed.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Retained elements, in input order
    pub retained: Vec<LayoutElement>,
    /// Removed elements with their reason, in input order
    pub discarded: Vec<Discarded>,
}

/// Normalize text so that running headers/footers compare equal across pages.
///
/// NFKC, lowercase, every run of digits replaced by `#` (so "Page 3" and
/// "Page 4", or "3" and "4", share a signature) and whitespace collapsed.
pub fn normalize_text(text: &str) -> String {
    let p = patterns();
    let folded: String = text.nfkc().collect::<String>().to_lowercase();
    let marked = p.digits.replace_all(&folded, "#");
    p.whitespace.replace_all(marked.trim(), " ").into_owned()
}

/// Remove page furniture and noise.
///
/// * one page: nothing is removed
/// * two pages: elements labelled header/footer/page number are removed
/// * three or more pages: elements whose (label, normalized text) signature
///   recurs near the same position on more than `recurrence_threshold` of
///   the pages are removed, whatever their label
///
/// From two pages on, elements below `min_area_ratio` of the page, and, when
/// enabled, elements lying entirely in a side margin are removed too.
pub fn filter_elements(elements: Vec<LayoutElement>, thresholds: &Thresholds) -> FilterOutcome {
    let pages: BTreeSet<u32> = elements.iter().map(|e| e.page).collect();
    let page_count = pages.len();

    if page_count <= 1 {
        log::debug!("Single-page document, header/footer filter skipped");
        return FilterOutcome {
            retained: elements,
            discarded: Vec::new(),
        };
    }

    let mut reasons: Vec<Option<DiscardReason>> = elements
        .iter()
        .map(|e| local_reason(e, thresholds))
        .collect();

    if page_count == 2 {
        for (reason, element) in reasons.iter_mut().zip(&elements) {
            if reason.is_none() && is_furniture_label(&element.raw_label) {
                *reason = Some(DiscardReason::FurnitureLabel);
            }
        }
    } else {
        for index in recurring(&elements, page_count, thresholds) {
            if reasons[index].is_none() {
                reasons[index] = Some(DiscardReason::RecurringFurniture);
            }
        }
    }

    let mut outcome = FilterOutcome::default();
    for (element, reason) in elements.into_iter().zip(reasons) {
        match reason {
            Some(reason) => outcome.discarded.push(Discarded {
                element_id: element.id,
                page: element.page,
                reason,
            }),
            None => outcome.retained.push(element),
        }
    }

    log::debug!(
        "Filter kept {} elements, discarded {} over {} pages",
        outcome.retained.len(),
        outcome.discarded.len(),
        page_count
    );
    outcome
}

/// Reasons that depend on the element alone.
fn local_reason(element: &LayoutElement, thresholds: &Thresholds) -> Option<DiscardReason> {
    if element.bbox.area() < thresholds.min_area_ratio {
        return Some(DiscardReason::Noise);
    }
    if thresholds.filter_margins {
        let margin = thresholds.margin_ratio;
        if element.bbox.x1 <= margin || element.bbox.x0 >= 1.0 - margin {
            return Some(DiscardReason::Margin);
        }
    }
    None
}

/// Indices of elements whose signature recurs on most pages.
fn recurring(elements: &[LayoutElement], page_count: usize, thresholds: &Thresholds) -> Vec<usize> {
    let mut groups: BTreeMap<(String, String), Vec<usize>> = BTreeMap::new();
    for (index, element) in elements.iter().enumerate() {
        let key = (element.label(), normalize_text(element.text()));
        groups.entry(key).or_default().push(index);
    }

    let mut result = Vec::new();
    for members in groups.values() {
        // A signature seen on too few pages cannot recur often enough.
        let group_pages: BTreeSet<u32> = members.iter().map(|&i| elements[i].page).collect();
        if (group_pages.len() as f32 / page_count as f32) <= thresholds.recurrence_threshold {
            continue;
        }

        for &i in members {
            let anchor = &elements[i].bbox;
            let pages_here: BTreeSet<u32> = members
                .iter()
                .map(|&j| &elements[j])
                .filter(|other| other.bbox.is_near(anchor, thresholds.position_tolerance))
                .map(|other| other.page)
                .collect();
            let ratio = pages_here.len() as f32 / page_count as f32;
            if ratio > thresholds.recurrence_threshold {
                result.push(i);
            }
        }
    }
    result.sort_unstable();
    result
}
