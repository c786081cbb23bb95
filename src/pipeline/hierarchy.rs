//! Heading level assignment.

use serde::{Deserialize, Serialize};

use crate::model::{Block, Zone};

use super::calibration::Calibration;

/// Structural role of a block in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockLevel {
    /// Opens a section at the given level (0 = title)
    Section(u32),
    /// Content of the nearest preceding section
    Attached,
}

impl BlockLevel {
    /// The section level, if the block opens a section.
    pub fn section(&self) -> Option<u32> {
        match self {
            BlockLevel::Section(level) => Some(*level),
            BlockLevel::Attached => None,
        }
    }
}

/// Assign a [`BlockLevel`] to every block.
///
/// Titles open level 0, headings open the level given by the calibrated
/// tiers and everything else is attached. Section blocks without text are
/// attached since they cannot title a node.
pub fn assign_levels(blocks: &[Block], calibration: &Calibration) -> Vec<BlockLevel> {
    blocks
        .iter()
        .map(|block| {
            if block.is_empty() {
                return BlockLevel::Attached;
            }
            match block.zone {
                Zone::Title => BlockLevel::Section(0),
                Zone::Heading => BlockLevel::Section(calibration.heading_level(
                    block.glyph_size,
                    block.gap_before,
                    &block.text_full,
                )),
                _ => BlockLevel::Attached,
            }
        })
        .collect()
}
