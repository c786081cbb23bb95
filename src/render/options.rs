//! Rendering options.

/// Options for rendering a forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Maximum heading level (1-6); deeper nodes are clamped to it
    pub max_heading_level: u8,

    /// Emit the body text attached to each node
    pub include_content: bool,

    /// Emit a heading line for synthesized "Untitled section" nodes
    pub include_untitled: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    /// Include or omit node content.
    pub fn with_content(mut self, include: bool) -> Self {
        self.include_content = include;
        self
    }

    /// Render headings for synthesized nodes too.
    pub fn with_untitled(mut self, include: bool) -> Self {
        self.include_untitled = include;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_heading_level: 6,
            include_content: true,
            include_untitled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_max_heading(9)
            .with_content(false)
            .with_untitled(true);

        assert_eq!(options.max_heading_level, 6);
        assert!(!options.include_content);
        assert!(options.include_untitled);
    }
}
