//! Output hierarchy.

use serde::{Deserialize, Serialize};

/// One node of the reconstructed document hierarchy.
///
/// Children are owned by their parent; `parent_id` is a back-reference only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Node identifier, e.g. `n0004`
    pub id: String,

    /// Nesting depth (0 = root-level section)
    pub level: u32,

    /// Heading text, or a synthesized title
    pub title: String,

    /// First page the section appears on
    pub page: u32,

    /// Body text attached to this node, blocks separated by blank lines
    #[serde(default)]
    pub content: String,

    /// Blocks this node was built from, in reading order
    pub source_block_ids: Vec<String>,

    /// Nested sections, in reading order
    #[serde(default)]
    pub children: Vec<TreeNode>,

    /// Parent node id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl TreeNode {
    /// Check if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Visit this node and its descendants in pre-order.
    pub fn walk(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }
}

/// Pre-order iterator over a tree, driven by an explicit stack.
pub struct PreOrder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Visit every node of a forest in pre-order.
pub fn walk_forest(forest: &[TreeNode]) -> impl Iterator<Item = &TreeNode> {
    forest.iter().flat_map(|root| root.walk())
}

/// Block ids of the forest in document order.
pub fn block_order(forest: &[TreeNode]) -> Vec<String> {
    walk_forest(forest)
        .flat_map(|node| node.source_block_ids.iter().cloned())
        .collect()
}

/// Total number of nodes in a forest.
pub fn node_count(forest: &[TreeNode]) -> usize {
    walk_forest(forest).count()
}

/// Deepest level present in a forest (None for an empty forest).
pub fn max_level(forest: &[TreeNode]) -> Option<u32> {
    walk_forest(forest).map(|n| n.level).max()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, level: u32, blocks: &[&str], children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            id: id.to_string(),
            level,
            title: id.to_string(),
            page: 1,
            content: String::new(),
            source_block_ids: blocks.iter().map(|b| b.to_string()).collect(),
            children,
            parent_id: None,
        }
    }

    #[test]
    fn test_preorder_block_order() {
        let forest = vec![
            node(
                "a",
                0,
                &["b1", "b2"],
                vec![node("b", 1, &["b3"], vec![]), node("c", 1, &["b4"], vec![])],
            ),
            node("d", 0, &["b5"], vec![]),
        ];
        assert_eq!(block_order(&forest), vec!["b1", "b2", "b3", "b4", "b5"]);
        assert_eq!(node_count(&forest), 4);
        assert_eq!(max_level(&forest), Some(1));
    }

    #[test]
    fn test_camel_case_serialization() {
        let n = node("a", 0, &["b1"], vec![]);
        let json = serde_json::to_string(&n).unwrap();
        assert!(json.contains("\"sourceBlockIds\""));
        assert!(!json.contains("parentId"));
    }
}
