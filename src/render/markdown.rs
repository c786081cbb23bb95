//! Markdown rendering for document trees.

use crate::error::Result;
use crate::model::TreeNode;
use crate::pipeline::UNTITLED_SECTION;

use super::RenderOptions;

/// Convert a forest to Markdown.
///
/// Node level 0 becomes `#`, level 1 `##` and so on, so the output is itself
/// a valid companion rendering for heading validation.
pub fn to_markdown(forest: &[TreeNode], options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(forest)
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a forest to Markdown.
    pub fn render(&self, forest: &[TreeNode]) -> Result<String> {
        let mut output = String::new();
        for node in crate::model::walk_forest(forest) {
            self.render_node(&mut output, node);
        }
        Ok(output.trim().to_string())
    }

    fn render_node(&self, output: &mut String, node: &TreeNode) {
        let synthesized = node.title == UNTITLED_SECTION && node.level == 0;
        if !synthesized || self.options.include_untitled {
            let hashes = (node.level as usize + 1).min(self.options.max_heading_level as usize);
            output.push_str(&"#".repeat(hashes.max(1)));
            output.push(' ');
            output.push_str(&escape_heading(&node.title));
            output.push_str("\n\n");
        }

        if self.options.include_content && !node.content.is_empty() {
            output.push_str(&node.content);
            output.push_str("\n\n");
        }
    }
}

/// Keep a title on one line and stop a leading `#` from changing its level.
fn escape_heading(title: &str) -> String {
    let single_line = title.split_whitespace().collect::<Vec<_>>().join(" ");
    match single_line.strip_prefix('#') {
        Some(rest) => format!("\\#{}", rest),
        None => single_line,
    }
}
