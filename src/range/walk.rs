//! Tree Walking
//!
//! Document-order navigation over any [`TreeAccess`] host: pre-order
//! successor and its mirror, first/last leaves, boundary point comparison
//! and subtree iteration. Everything here is read-only.

use crate::dom::{NodeId, TreeAccess};
use std::cmp::Ordering;

use super::boundary::Boundary;

/// Successor in document (pre-order) order
///
/// First child if any, else the nearest following sibling of the node or
/// one of its ancestors.
pub fn next<T: TreeAccess + ?Sized>(tree: &T, node: NodeId) -> Option<NodeId> {
    tree.first_child_of(node).or_else(|| next_outside(tree, node))
}

/// Successor in document order that skips the node's own subtree
pub fn next_outside<T: TreeAccess + ?Sized>(tree: &T, node: NodeId) -> Option<NodeId> {
    let mut current = node;
    loop {
        if let Some(sibling) = tree.next_sibling_of(current) {
            return Some(sibling);
        }
        current = tree.parent_of(current)?;
    }
}

/// Mirror of [`next`]: last child if any, else the nearest preceding
/// sibling of the node or one of its ancestors
///
/// Visits text leaves in exactly the reverse of their document order.
pub fn prev<T: TreeAccess + ?Sized>(tree: &T, node: NodeId) -> Option<NodeId> {
    if let Some(child) = tree.last_child_of(node) {
        return Some(child);
    }
    let mut current = node;
    loop {
        if let Some(sibling) = tree.prev_sibling_of(current) {
            return Some(sibling);
        }
        current = tree.parent_of(current)?;
    }
}

/// Deepest first descendant (the node itself when it has no children)
pub fn first_leaf<T: TreeAccess + ?Sized>(tree: &T, node: NodeId) -> NodeId {
    let mut current = node;
    while let Some(child) = tree.first_child_of(current) {
        current = child;
    }
    current
}

/// Deepest last descendant (the node itself when it has no children)
pub fn last_leaf<T: TreeAccess + ?Sized>(tree: &T, node: NodeId) -> NodeId {
    let mut current = node;
    while let Some(child) = tree.last_child_of(current) {
        current = child;
    }
    current
}

/// Whether `node` is `ancestor` or one of its descendants
pub fn contains<T: TreeAccess + ?Sized>(tree: &T, ancestor: NodeId, node: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        current = tree.parent_of(id);
    }
    false
}

/// Chain from the top of the tree down to `node`, inclusive
fn lineage<T: TreeAccess + ?Sized>(tree: &T, node: NodeId) -> Vec<NodeId> {
    let mut chain = vec![node];
    let mut current = node;
    while let Some(parent) = tree.parent_of(current) {
        chain.push(parent);
        current = parent;
    }
    chain.reverse();
    chain
}

/// Deepest node containing both `a` and `b`, or `None` for disconnected nodes
pub fn common_ancestor<T: TreeAccess + ?Sized>(tree: &T, a: NodeId, b: NodeId) -> Option<NodeId> {
    let left = lineage(tree, a);
    let right = lineage(tree, b);
    left.iter()
        .zip(right.iter())
        .take_while(|(x, y)| x == y)
        .last()
        .map(|(x, _)| *x)
}

/// Position of a node among its siblings
pub fn index_of<T: TreeAccess + ?Sized>(tree: &T, node: NodeId) -> usize {
    let mut index = 0;
    let mut current = node;
    while let Some(sibling) = tree.prev_sibling_of(current) {
        index += 1;
        current = sibling;
    }
    index
}

/// Relative document order of two nodes
///
/// Ancestors precede their descendants. Returns `None` when the nodes do
/// not share a tree.
pub fn document_order<T: TreeAccess + ?Sized>(tree: &T, a: NodeId, b: NodeId) -> Option<Ordering> {
    if a == b {
        return Some(Ordering::Equal);
    }
    let left = lineage(tree, a);
    let right = lineage(tree, b);
    if left.first() != right.first() {
        return None;
    }

    let split = left.iter().zip(right.iter()).take_while(|(x, y)| x == y).count();
    match (left.get(split), right.get(split)) {
        // a is an ancestor of b
        (None, _) => Some(Ordering::Less),
        (_, None) => Some(Ordering::Greater),
        (Some(&x), Some(&y)) => {
            let mut sibling = tree.next_sibling_of(x);
            while let Some(id) = sibling {
                if id == y {
                    return Some(Ordering::Less);
                }
                sibling = tree.next_sibling_of(id);
            }
            Some(Ordering::Greater)
        }
    }
}

/// Relative order of two boundary points
///
/// Follows DOM boundary-point comparison. Returns `None` when the points
/// live in different trees.
pub fn compare_points<T: TreeAccess + ?Sized>(tree: &T, a: Boundary, b: Boundary) -> Option<Ordering> {
    if a.container == b.container {
        return Some(a.offset.cmp(&b.offset));
    }
    match document_order(tree, a.container, b.container)? {
        Ordering::Greater => compare_points(tree, b, a).map(Ordering::reverse),
        _ => {
            // a's container precedes b's; only containment can flip that
            if contains(tree, a.container, b.container) {
                let mut child = b.container;
                while let Some(parent) = tree.parent_of(child) {
                    if parent == a.container {
                        break;
                    }
                    child = parent;
                }
                if index_of(tree, child) < a.offset {
                    return Some(Ordering::Greater);
                }
            }
            Some(Ordering::Less)
        }
    }
}

/// Length of a node as a range offset space: chars for character data,
/// child count for everything else
pub fn node_length<T: TreeAccess + ?Sized>(tree: &T, node: NodeId) -> usize {
    match tree.kind(node) {
        Some(kind) if kind.has_character_data() => tree.text_len(node),
        Some(_) => tree.child_count(node),
        None => 0,
    }
}

/// Pre-order iterator over a subtree, the scope node included
pub struct Subtree<'t, T: ?Sized> {
    tree: &'t T,
    scope: NodeId,
    next: Option<NodeId>,
}

impl<'t, T: TreeAccess + ?Sized> Iterator for Subtree<'t, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = match self.tree.first_child_of(current) {
            Some(child) => Some(child),
            None => {
                let mut node = current;
                loop {
                    if node == self.scope {
                        break None;
                    }
                    if let Some(sibling) = self.tree.next_sibling_of(node) {
                        break Some(sibling);
                    }
                    match self.tree.parent_of(node) {
                        Some(parent) => node = parent,
                        None => break None,
                    }
                }
            }
        };
        Some(current)
    }
}

/// Every node of the subtree rooted at `scope`, in document order
pub fn subtree<T: TreeAccess + ?Sized>(tree: &T, scope: NodeId) -> Subtree<'_, T> {
    Subtree {
        tree,
        scope,
        next: tree.kind(scope).map(|_| scope),
    }
}

/// Text leaves of the subtree rooted at `scope`, in document order
pub fn text_leaves<T: TreeAccess + ?Sized>(tree: &T, scope: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    subtree(tree, scope).filter(move |&id| tree.kind(id).is_some_and(|k| k.is_text_leaf()))
}
