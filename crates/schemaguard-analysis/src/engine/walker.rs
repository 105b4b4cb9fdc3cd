//! Pre-order depth-first traversal over a tree-sitter tree.

use tree_sitter::Node;

/// Visit `root` and every descendant exactly once, parents before children,
/// siblings in source order. Iterative, so deep trees cannot overflow the stack.
pub fn walk<'t>(root: Node<'t>, mut visit: impl FnMut(Node<'t>)) {
    let mut cursor = root.walk();
    loop {
        visit(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.node().id() == root.id() {
                return;
            }
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}
