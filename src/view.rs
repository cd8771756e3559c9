// src/view.rs
// =============================================================================
// Text rendering of the repository tree, plus node selection.
//
// Output looks like:
//
//   Hello-World/
//   ├── README
//   └── src/
//       └── main.rs
//
// Nothing is drawn until the view is mounted, i.e. until the session has
// confirmed it owns an interactive terminal/output. Selecting ("clicking") a
// node hands the full node back to the caller, which decides what to do with
// a file versus a directory.
// =============================================================================

use crate::tree::TreeNode;

/// Selected-content text for a directory node.
pub const DIRECTORY_SELECTION: &str = "This is a directory.";

#[derive(Debug, Default)]
pub struct TreeView {
    mounted: bool,
}

impl TreeView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self) {
        self.mounted = true;
    }

    // Renders `tree`, or nothing while unmounted or while no tree is loaded
    pub fn render(&self, tree: Option<&TreeNode>) -> Option<String> {
        if !self.mounted {
            return None;
        }
        tree.map(render_tree)
    }

    // Reports the node under `path`, if there is one
    pub fn click<'t>(&self, tree: &'t TreeNode, path: &str) -> Option<&'t TreeNode> {
        tree.find(path)
    }
}

// What the selection panel should hold after `node` was clicked
pub fn selection_for(node: &TreeNode) -> String {
    match node.content() {
        Some(content) => content.to_string(),
        None => DIRECTORY_SELECTION.to_string(),
    }
}

fn render_tree(root: &TreeNode) -> String {
    let mut out = String::new();
    push_label(&mut out, root);
    out.push('\n');

    // (node, prefix for its own line, prefix for its children)
    let mut stack: Vec<(&TreeNode, String, String)> = Vec::new();
    push_children(&mut stack, root, "");

    while let Some((node, line_prefix, child_prefix)) = stack.pop() {
        out.push_str(&line_prefix);
        push_label(&mut out, node);
        out.push('\n');
        push_children(&mut stack, node, &child_prefix);
    }

    out
}

// Pushes children in reverse so they pop off the stack in listing order
fn push_children<'t>(
    stack: &mut Vec<(&'t TreeNode, String, String)>,
    node: &'t TreeNode,
    prefix: &str,
) {
    let Some(children) = node.children() else {
        return;
    };

    let last = children.len().saturating_sub(1);
    for (index, child) in children.iter().enumerate().rev() {
        let (branch, indent) = if index == last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        stack.push((child, format!("{prefix}{branch}"), format!("{prefix}{indent}")));
    }
}

fn push_label(out: &mut String, node: &TreeNode) {
    out.push_str(&node.name);
    if !node.is_file() {
        out.push('/');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::dir(
            "Hello-World",
            vec![
                TreeNode::file("README", "Hello World!"),
                TreeNode::dir(
                    "src",
                    vec![TreeNode::file("lib.rs", ""), TreeNode::file("main.rs", "fn main() {}")],
                ),
                TreeNode::file("LICENSE", "MIT"),
            ],
        )
    }

    #[test]
    fn test_render_suppressed_until_mounted() {
        let tree = sample();
        let mut view = TreeView::new();
        assert!(view.render(Some(&tree)).is_none());

        view.mount();
        assert!(view.render(Some(&tree)).is_some());
        assert!(view.render(None).is_none());
    }

    #[test]
    fn test_render_layout() {
        let mut view = TreeView::new();
        view.mount();

        let expected = "\
Hello-World/
├── README
├── src/
│   ├── lib.rs
│   └── main.rs
└── LICENSE
";
        assert_eq!(view.render(Some(&sample())).unwrap(), expected);
    }

    #[test]
    fn test_click_reports_node_payload() {
        let tree = sample();
        let view = TreeView::new();

        let readme = view.click(&tree, "README").unwrap();
        assert_eq!(selection_for(readme), "Hello World!");

        let src = view.click(&tree, "src").unwrap();
        assert_eq!(selection_for(src), "This is a directory.");

        assert!(view.click(&tree, "nope").is_none());
    }

    #[test]
    fn test_empty_file_selection_is_empty_string() {
        let tree = sample();
        let view = TreeView::new();
        assert_eq!(selection_for(view.click(&tree, "src/lib.rs").unwrap()), "");
    }
}
