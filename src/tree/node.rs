// src/tree/node.rs
// =============================================================================
// The in-memory mirror of a repository.
//
// A node is either a file (has content, no children) or a directory (has
// children, no content). The enum makes "both" or "neither" unrepresentable.
//
// Serialized shape (what the analysis prompt and `--json` output see):
//   { "name": "README", "content": "..." }
//   { "name": "src", "children": [ ... ] }
// =============================================================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(flatten)]
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeKind {
    File { content: String },
    Dir { children: Vec<TreeNode> },
}

impl TreeNode {
    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File {
                content: content.into(),
            },
        }
    }

    pub fn dir(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Dir { children },
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    /// File content, or `None` for a directory.
    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { content } => Some(content),
            NodeKind::Dir { .. } => None,
        }
    }

    /// Child nodes, or `None` for a file.
    pub fn children(&self) -> Option<&[TreeNode]> {
        match &self.kind {
            NodeKind::File { .. } => None,
            NodeKind::Dir { children } => Some(children),
        }
    }

    // Looks up a node by slash-separated path relative to this node.
    // "" (or "/") is this node itself.
    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        let mut current = self;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .children()?
                .iter()
                .find(|child| child.name == segment)?;
        }
        Some(current)
    }

    pub fn count_files(&self) -> usize {
        self.iter().filter(|node| node.is_file()).count()
    }

    /// Directory count, this node included when it is a directory.
    pub fn count_dirs(&self) -> usize {
        self.iter().filter(|node| !node.is_file()).count()
    }

    // Pre-order walk over this node and all descendants, without recursion
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            if let Some(children) = node.children() {
                stack.extend(children.iter().rev());
            }
            Some(node)
        })
    }
}
