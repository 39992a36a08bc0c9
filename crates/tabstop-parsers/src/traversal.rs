//! Syntax tree traversal with explicit enter/exit callbacks

use tree_sitter::Node;

/// Action to take after entering a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitAction {
    /// Visit the children of this node, then exit it
    Continue,
    /// Do not visit children; the node is exited immediately
    SkipChildren,
    /// Stop traversal entirely; no further enter or exit calls are made
    Stop,
}

/// Node visitor with separate pre-order and post-order hooks
pub trait NodeVisitor<'t> {
    /// Called before visiting a node's children
    fn enter(&mut self, node: Node<'t>) -> VisitAction;

    /// Called after all children of `node` have been visited
    fn exit(&mut self, _node: Node<'t>) {}
}

/// Iterative depth-first walker over a tree-sitter tree
pub struct TreeWalker;

impl TreeWalker {
    /// Walk the tree rooted at `root`, left to right.
    ///
    /// Every node whose `enter` returns [`VisitAction::Continue`] or
    /// [`VisitAction::SkipChildren`] gets exactly one matching `exit`, after
    /// the exits of its descendants. Returns `false` if a visitor stopped the
    /// walk early.
    pub fn walk<'t, V: NodeVisitor<'t>>(root: Node<'t>, visitor: &mut V) -> bool {
        let mut cursor = root.walk();
        loop {
            let node = cursor.node();
            match visitor.enter(node) {
                VisitAction::Stop => return false,
                VisitAction::Continue if cursor.goto_first_child() => continue,
                VisitAction::Continue | VisitAction::SkipChildren => {}
            }

            // Exit the finished node, then climb until a sibling is found.
            let mut done = node;
            loop {
                visitor.exit(done);
                if done.id() == root.id() {
                    return true;
                }
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return true;
                }
                done = cursor.node();
            }
        }
    }
}

/// Source text of a node, or the empty string when the span is not a valid
/// slice of `src`
pub fn node_text<'s>(node: Node<'_>, src: &'s str) -> &'s str {
    src.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

/// Whether `pos` lies strictly inside the node's byte span
pub fn cursor_inside(node: Node<'_>, pos: usize) -> bool {
    node.start_byte() < pos && pos < node.end_byte()
}
