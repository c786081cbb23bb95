//! Rendering module for converting document trees to output formats.

mod json;
mod markdown;
mod options;

pub use json::{from_json, result_to_json, to_json, JsonFormat};
pub use markdown::{to_markdown, MarkdownRenderer};
pub use options::RenderOptions;
