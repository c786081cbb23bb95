//! JSON rendering for document trees.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::TreeNode;
use crate::pipeline::StructureResult;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a forest to a JSON array of nested nodes.
pub fn to_json(forest: &[TreeNode], format: JsonFormat) -> Result<String> {
    serialize(&forest, format)
}

/// Convert a whole pipeline result (forest, blocks and report) to JSON.
pub fn result_to_json(result: &StructureResult, format: JsonFormat) -> Result<String> {
    serialize(result, format)
}

/// Read a forest back from JSON produced by [`to_json`].
pub fn from_json(json: &str) -> Result<Vec<TreeNode>> {
    Ok(serde_json::from_str(json)?)
}

fn serialize<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest() -> Vec<TreeNode> {
        vec![TreeNode {
            id: "n0000".to_string(),
            level: 0,
            title: "Report".to_string(),
            page: 1,
            content: "Body".to_string(),
            source_block_ids: vec!["p1-c0-b0".to_string(), "p1-c0-b1".to_string()],
            children: vec![TreeNode {
                id: "n0001".to_string(),
                level: 1,
                title: "Intro".to_string(),
                page: 1,
                content: String::new(),
                source_block_ids: vec!["p1-c0-b2".to_string()],
                children: Vec::new(),
                parent_id: Some("n0000".to_string()),
            }],
            parent_id: None,
        }]
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&forest(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"sourceBlockIds\""));
        assert!(json.contains("\"parentId\": \"n0000\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&forest(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.starts_with("[{\"id\":\"n0000\""));
    }

    #[test]
    fn test_json_round_trip() {
        let original = forest();
        let json = to_json(&original, JsonFormat::Compact).unwrap();
        assert_eq!(from_json(&json).unwrap(), original);
    }
}
