// src/tree/mod.rs
// =============================================================================
// The repository tree and the walk that builds it.
//
// Submodules:
// - node: the TreeNode data model (file leaf or directory)
// - builder: mirrors a remote repository into a TreeNode
// =============================================================================

mod builder;
mod node;

pub use builder::{BuildOptions, TreeBuilder};
pub use node::TreeNode;
