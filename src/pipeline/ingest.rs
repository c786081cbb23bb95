//! Validation and normalization of raw OCR records.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::model::{BoundingBox, LayoutElement, RawElement};

use super::report::{Diagnostic, DropReason};

/// Parse the OCR element sequence from JSON.
///
/// The sequence itself must be a JSON array; `null` or any other value is an
/// input-contract violation. Individual malformed records are not an error
/// here, they are reported by [`ingest`].
pub fn parse_elements_json(json: &str) -> Result<Vec<RawElement>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    match value {
        serde_json::Value::Array(_) => Ok(serde_json::from_value(value)?),
        serde_json::Value::Null => Err(Error::InvalidInput(
            "expected an array of layout elements, found null".to_string(),
        )),
        other => Err(Error::InvalidInput(format!(
            "expected an array of layout elements, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Validate raw records and normalize their coordinates into [0, 1].
///
/// Records with no page, no usable bbox, non-finite or degenerate geometry,
/// or a duplicate id are dropped with a [`Diagnostic`]. Coordinates larger
/// than 1 are divided by the record's page size when given, otherwise by the
/// largest extent seen anywhere in the document.
pub fn ingest(raw: &[RawElement]) -> (Vec<LayoutElement>, Vec<Diagnostic>) {
    let (extent_x, extent_y) = document_extents(raw);

    let mut elements = Vec::with_capacity(raw.len());
    let mut dropped = Vec::new();
    let mut seen_ids = BTreeSet::new();

    for (index, record) in raw.iter().enumerate() {
        let drop = |reason| Diagnostic {
            index,
            element_id: record.id.clone(),
            reason,
        };

        let page = match record.page {
            None => {
                dropped.push(drop(DropReason::MissingPage));
                continue;
            }
            Some(0) => {
                dropped.push(drop(DropReason::InvalidPage));
                continue;
            }
            Some(page) => page,
        };

        let Some([x0, y0, x1, y1]) = record.coordinates() else {
            dropped.push(drop(DropReason::MissingBbox));
            continue;
        };
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            dropped.push(drop(DropReason::NonFiniteBbox));
            continue;
        }

        let needs_scaling = x1 > 1.0 || y1 > 1.0;
        let (scale_x, scale_y) = match (record.page_width, record.page_height) {
            (Some(w), Some(h)) if needs_scaling && w > 0.0 && h > 0.0 => (w, h),
            _ if needs_scaling => (extent_x, extent_y),
            _ => (1.0, 1.0),
        };
        let aspect = match (record.page_width, record.page_height) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => h / w,
            _ if needs_scaling => extent_y / extent_x,
            _ => 1.0,
        };

        let bbox =
            BoundingBox::new(x0 / scale_x, y0 / scale_y, x1 / scale_x, y1 / scale_y).clamped();
        if !bbox.is_valid() {
            dropped.push(drop(DropReason::DegenerateBbox));
            continue;
        }

        let id = record.id.clone().unwrap_or_else(|| format!("e{}", index));
        if !seen_ids.insert(id.clone()) {
            dropped.push(drop(DropReason::DuplicateId));
            continue;
        }

        let text_content = record.text_content.clone().unwrap_or_default();
        let text_full = record
            .text_full
            .clone()
            .unwrap_or_else(|| text_content.clone());

        elements.push(LayoutElement {
            id,
            page,
            bbox,
            raw_label: record.label.clone().unwrap_or_else(|| "text".to_string()),
            text_content,
            text_full,
            aspect,
            source_index: index,
        });
    }

    for diagnostic in &dropped {
        log::warn!(
            "Dropped input element #{} ({:?}): {:?}",
            diagnostic.index,
            diagnostic.element_id,
            diagnostic.reason
        );
    }

    (elements, dropped)
}

/// Largest right/bottom coordinates over all finite records.
fn document_extents(raw: &[RawElement]) -> (f32, f32) {
    let mut max_x = 0.0f32;
    let mut max_y = 0.0f32;
    for [_, _, x1, y1] in raw.iter().filter_map(|r| r.coordinates()) {
        if x1.is_finite() {
            max_x = max_x.max(x1);
        }
        if y1.is_finite() {
            max_y = max_y.max(y1);
        }
    }
    (max_x.max(1.0), max_y.max(1.0))
}
