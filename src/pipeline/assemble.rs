//! Tree assembly.
//!
//! Nodes live in a flat arena while the tree is built; a stack holds the
//! chain of open sections. The owned forest is produced afterwards by
//! walking the arena backwards: children always have larger indices than
//! their parent, so every child is finished before its parent is.

use crate::model::{Block, TreeNode};

use super::hierarchy::BlockLevel;

/// Title given to content that precedes every heading.
pub const UNTITLED_SECTION: &str = "Untitled section";

/// Assigned level of a synthesized node; any section closes it.
const SYNTHESIZED: u32 = u32::MAX;

#[derive(Debug)]
struct ArenaNode {
    id: String,
    assigned: u32,
    depth: u32,
    title: String,
    page: u32,
    content: Vec<String>,
    source_block_ids: Vec<String>,
    children: Vec<usize>,
    parent: Option<usize>,
}

/// Arena plus the stack of open nodes.
#[derive(Debug, Default)]
struct Assembler {
    arena: Vec<ArenaNode>,
    stack: Vec<usize>,
    roots: Vec<usize>,
}

impl Assembler {
    fn open(&mut self, assigned: u32, title: String, page: u32) -> usize {
        let index = self.arena.len();
        let parent = self.stack.last().copied();
        self.arena.push(ArenaNode {
            id: format!("n{:04}", index),
            assigned,
            depth: self.stack.len() as u32,
            title,
            page,
            content: Vec::new(),
            source_block_ids: Vec::new(),
            children: Vec::new(),
            parent,
        });
        match parent {
            Some(p) => self.arena[p].children.push(index),
            None => self.roots.push(index),
        }
        self.stack.push(index);
        index
    }

    fn section(&mut self, block: &Block, level: u32) {
        while let Some(&top) = self.stack.last() {
            if self.arena[top].assigned >= level {
                self.stack.pop();
            } else {
                break;
            }
        }
        let index = self.open(level, block.text_full.trim().to_string(), block.page);
        self.arena[index].source_block_ids.push(block.id.clone());
    }

    fn attach(&mut self, block: &Block) {
        let top = match self.stack.last() {
            Some(&top) => top,
            None => self.open(SYNTHESIZED, UNTITLED_SECTION.to_string(), block.page),
        };
        let node = &mut self.arena[top];
        node.source_block_ids.push(block.id.clone());
        let text = block.text_full.trim();
        if !text.is_empty() {
            node.content.push(text.to_string());
        }
    }

    fn finish(self) -> Vec<TreeNode> {
        let ids: Vec<String> = self.arena.iter().map(|n| n.id.clone()).collect();
        let mut built: Vec<Option<TreeNode>> = Vec::with_capacity(self.arena.len());
        built.resize_with(self.arena.len(), || None);

        for (index, node) in self.arena.into_iter().enumerate().rev() {
            let children = node
                .children
                .iter()
                .filter_map(|&c| built[c].take())
                .collect();
            built[index] = Some(TreeNode {
                id: node.id,
                level: node.depth,
                title: node.title,
                page: node.page,
                content: node.content.join("\n\n"),
                source_block_ids: node.source_block_ids,
                children,
                parent_id: node.parent.map(|p| ids[p].clone()),
            });
        }

        self.roots
            .iter()
            .filter_map(|&r| built[r].take())
            .collect()
    }
}

/// Build the forest from blocks in reading order and their levels.
///
/// A section block closes every open node whose assigned level is at least
/// its own and opens a child of whatever remains open. An attached block
/// joins the innermost open node. Node levels are nesting depths.
pub fn assemble(blocks: &[Block], levels: &[BlockLevel]) -> Vec<TreeNode> {
    let mut assembler = Assembler::default();
    for (block, level) in blocks.iter().zip(levels) {
        match level {
            BlockLevel::Section(level) => assembler.section(block, *level),
            BlockLevel::Attached => assembler.attach(block),
        }
    }
    let forest = assembler.finish();
    log::debug!("Assembled {} root node(s)", forest.len());
    forest
}
