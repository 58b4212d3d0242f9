//! DOM Module - Arena-based document tree
//!
//! Implements an efficient tree representation using:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for cache-friendly traversal
//! - String interning for names and character data
//!
//! The range algorithms never touch the arena directly. They are written
//! against [`TreeAccess`] (read-only navigation) and [`TreeMut`] (the one
//! mutation they need: splitting a text leaf), so any host tree that can
//! answer these questions can be addressed.

pub mod document;
pub mod markup;
pub mod node;
pub mod strings;

pub use document::{Document, ParseOptions};
pub use node::{NodeId, NodeKind, XmlAttribute, XmlNode};
pub use strings::StringPool;

use crate::error::RangeError;
use crate::range::path::Path;

/// Outcome of a host-provided path lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Found(NodeId),
    Missing,
    /// The host has no fast path; fall back to the structural scan
    Unsupported,
}

/// Read-only navigation over a tree of nodes
pub trait TreeAccess {
    /// Kind of a node, or `None` if the id does not name a node
    fn kind(&self, id: NodeId) -> Option<NodeKind>;

    fn parent_of(&self, id: NodeId) -> Option<NodeId>;
    fn first_child_of(&self, id: NodeId) -> Option<NodeId>;
    fn last_child_of(&self, id: NodeId) -> Option<NodeId>;
    fn next_sibling_of(&self, id: NodeId) -> Option<NodeId>;
    fn prev_sibling_of(&self, id: NodeId) -> Option<NodeId>;

    /// Tag name of an element, or target of a processing instruction
    fn node_name(&self, id: NodeId) -> Option<&str>;

    /// Character data of text, CDATA and comment nodes
    fn text_content(&self, id: NodeId) -> Option<&str>;

    /// Length of the character data in chars
    fn text_len(&self, id: NodeId) -> usize {
        self.text_content(id).map(strings::char_len).unwrap_or(0)
    }

    fn child_count(&self, id: NodeId) -> usize {
        children(self, id).count()
    }

    fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        children(self, id).nth(index)
    }

    /// Native path resolution, if the host has one
    ///
    /// Implementations must agree with the structural scan in
    /// [`crate::range::path::resolve_scan`].
    fn lookup_path(&self, _root: NodeId, _path: &Path) -> Lookup {
        Lookup::Unsupported
    }
}

/// The mutation the range algebra needs from a host tree
pub trait TreeMut: TreeAccess {
    /// Split a text leaf at a char offset, inserting the tail as its next sibling
    ///
    /// Callers validate `0 < offset < text_len(leaf)`; the returned id names
    /// the new tail node.
    fn split_leaf(&mut self, leaf: NodeId, offset: usize) -> Result<NodeId, RangeError>;
}

/// Iterator over the children of a node
pub struct ChildIter<'t, T: ?Sized> {
    tree: &'t T,
    current: Option<NodeId>,
}

impl<'t, T: TreeAccess + ?Sized> Iterator for ChildIter<'t, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.tree.next_sibling_of(id);
        Some(id)
    }
}

/// Children of `id` in order
pub fn children<T: TreeAccess + ?Sized>(tree: &T, id: NodeId) -> ChildIter<'_, T> {
    ChildIter {
        tree,
        current: tree.first_child_of(id),
    }
}
