//! Data model for layout analysis.
//!
//! Elements come in from the OCR collaborator, columns and blocks are built
//! by the pipeline, and the tree is what goes out. Every stage allocates new
//! values and refers to earlier ones by id; nothing is mutated in place.

mod block;
mod element;
mod geometry;
mod tree;
mod zone;

pub use block::{Block, Column};
pub use element::{LayoutElement, RawElement};
pub use geometry::BoundingBox;
pub use tree::{block_order, max_level, node_count, walk_forest, PreOrder, TreeNode};
pub use zone::{is_furniture_label, Zone};
