//! Range serialization
//!
//! Converts live ranges to and from durable (path, char offset) pairs.
//! Each boundary is anchored on its nearest element and the offset counts
//! the chars of that element's text leaves that precede the boundary, so a
//! serialized range survives re-parsing the same document and does not
//! depend on how its text happens to be split into leaves.

use super::boundary::{normalize_boundaries, split_boundaries, Boundary, Range};
use super::path::{path_of, resolve, Path};
use super::walk::{compare_points, contains, text_leaves};
use crate::dom::{NodeId, NodeKind, TreeAccess, TreeMut};
use crate::error::{RangeError, Side};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Durable form of a range
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedRange {
    pub start: Path,
    pub start_offset: usize,
    pub end: Path,
    pub end_offset: usize,
}

impl SerializedRange {
    /// Resolve back into a live range under `root`
    pub fn to_range<T: TreeAccess + ?Sized>(&self, tree: &T, root: NodeId) -> Result<Range, RangeError> {
        deserialize(tree, root, &self.start, self.start_offset, &self.end, self.end_offset)
    }
}

/// Predicate marking elements a boundary must not be anchored on
pub type IgnoreFn<'a> = &'a dyn Fn(NodeId) -> bool;

/// Nearest element ancestor-or-self of `node` that is not ignored, never above `root`
fn anchor_for<T: TreeAccess + ?Sized>(
    tree: &T,
    node: NodeId,
    root: NodeId,
    ignore: Option<IgnoreFn<'_>>,
) -> Result<NodeId, RangeError> {
    tree.kind(node).ok_or(RangeError::UnknownNode(node))?;
    let mut current = node;
    loop {
        if current == root {
            return Ok(root);
        }
        let is_element = tree.kind(current) == Some(NodeKind::Element);
        if is_element && !ignore.is_some_and(|skip| skip(current)) {
            return Ok(current);
        }
        current = tree.parent_of(current).ok_or(RangeError::NodeNotInRoot)?;
    }
}

/// Chars of `anchor`'s text leaves that precede `point`
fn text_offset<T: TreeAccess + ?Sized>(tree: &T, anchor: NodeId, point: Boundary) -> usize {
    let mut total = 0;
    for leaf in text_leaves(tree, anchor) {
        let len = tree.text_len(leaf);
        if leaf == point.container {
            return total + point.offset.min(len);
        }
        match compare_points(tree, Boundary::new(leaf, 0), point) {
            Some(Ordering::Less) => total += len,
            _ => break,
        }
    }
    total
}

fn encode_boundary<T: TreeAccess + ?Sized>(
    tree: &T,
    point: Boundary,
    root: NodeId,
    ignore: Option<IgnoreFn<'_>>,
) -> Result<(Path, usize), RangeError> {
    let anchor = anchor_for(tree, point.container, root, ignore)?;
    let path = path_of(tree, anchor, root)?;
    Ok((path, text_offset(tree, anchor, point)))
}

/// Express a range as paths relative to `root` plus char offsets
///
/// Does not touch the tree. `ignore` marks elements (highlight wrappers and
/// the like) that boundaries must not be anchored on.
pub fn serialize<T: TreeAccess + ?Sized>(
    tree: &T,
    range: &Range,
    root: NodeId,
    ignore: Option<IgnoreFn<'_>>,
) -> Result<SerializedRange, RangeError> {
    let (start, start_offset) = encode_boundary(tree, range.start, root, ignore)?;
    let (end, end_offset) = encode_boundary(tree, range.end, root, ignore)?;
    debug!(%start, start_offset, %end, end_offset, "serialized range");
    Ok(SerializedRange {
        start,
        start_offset,
        end,
        end_offset,
    })
}

/// Fail unless both boundary containers exist and sit under `root`
///
/// Run before anything that splits leaves, so a range that cannot be
/// serialized leaves the tree as it was.
pub fn check_in_root<T: TreeAccess + ?Sized>(tree: &T, range: &Range, root: NodeId) -> Result<(), RangeError> {
    for point in [range.start, range.end] {
        tree.kind(point.container).ok_or(RangeError::UnknownNode(point.container))?;
        if !contains(tree, root, point.container) {
            return Err(RangeError::NodeNotInRoot);
        }
    }
    Ok(())
}

/// Split, normalize, then serialize
///
/// The range is updated in place to its normalized form and the tree gains
/// the text leaves the split creates. A range outside `root` is rejected
/// before the tree is touched.
pub fn serialize_normalized<T: TreeMut + ?Sized>(
    tree: &mut T,
    range: &mut Range,
    root: NodeId,
    ignore: Option<IgnoreFn<'_>>,
) -> Result<SerializedRange, RangeError> {
    check_in_root(tree, range, root)?;
    split_boundaries(tree, range)?;
    normalize_boundaries(tree, range);
    serialize(tree, range, root, ignore)
}

/// Find the text leaf holding char `offset` of the node at `path`
///
/// A start offset lands at the beginning of the leaf holding that char; an
/// end offset prefers the end of the preceding leaf. A node with no text
/// accepts offset 0 as a point at its own start.
fn find_boundary<T: TreeAccess + ?Sized>(
    tree: &T,
    root: NodeId,
    path: &Path,
    offset: usize,
    which: Side,
) -> Result<Boundary, RangeError> {
    let node = resolve(tree, path, root).ok_or(RangeError::NotFound { which })?;

    let mut remaining = offset;
    let mut last_text = None;
    for leaf in text_leaves(tree, node) {
        let len = tree.text_len(leaf);
        let fits = match which {
            Side::Start => remaining < len,
            Side::End => remaining <= len,
        };
        if fits {
            return Ok(Boundary::new(leaf, remaining));
        }
        remaining -= len;
        if len > 0 {
            last_text = Some((leaf, len));
        }
    }

    match last_text {
        // A start at the very end of the node's text
        Some((leaf, len)) if remaining == 0 => Ok(Boundary::new(leaf, len)),
        None if offset == 0 => Ok(Boundary::new(node, 0)),
        _ => Err(RangeError::IndexOutOfRange { which }),
    }
}

/// Rebuild a live range from paths relative to `root` and char offsets
///
/// The start is resolved before the end, so when both are bad the error
/// names the start.
pub fn deserialize<T: TreeAccess + ?Sized>(
    tree: &T,
    root: NodeId,
    start: &Path,
    start_offset: usize,
    end: &Path,
    end_offset: usize,
) -> Result<Range, RangeError> {
    let start = find_boundary(tree, root, start, start_offset, Side::Start)?;
    let end = find_boundary(tree, root, end, end_offset, Side::End)?;
    Ok(Range::new(start, end))
}
