//! Boundaries, ranges and boundary normalization
//!
//! A [`Boundary`] is a (container, offset) point: the offset counts chars
//! when the container carries character data and children otherwise. A
//! [`Range`] is an ordered pair of boundaries.
//!
//! Normalization moves both ends of a range onto text leaves without
//! changing the characters it covers, so the range can be re-expressed as
//! (path, char offset) pairs.

use super::split::split_text;
use super::walk::{
    common_ancestor, compare_points, first_leaf, index_of, last_leaf, next, node_length, prev, text_leaves,
};
use crate::dom::strings::char_slice;
use crate::dom::{NodeId, TreeAccess, TreeMut};
use crate::error::RangeError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::trace;

/// A point in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Boundary {
    pub container: NodeId,
    pub offset: usize,
}

impl Boundary {
    pub fn new(container: NodeId, offset: usize) -> Self {
        Boundary { container, offset }
    }
}

/// A live range between two boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Boundary,
    pub end: Boundary,
}

impl Range {
    pub fn new(start: Boundary, end: Boundary) -> Self {
        Range { start, end }
    }

    /// Empty range at a single point
    pub fn collapsed(at: Boundary) -> Self {
        Range { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Deepest node containing both boundaries
    pub fn common_ancestor<T: TreeAccess + ?Sized>(&self, tree: &T) -> Option<NodeId> {
        common_ancestor(tree, self.start.container, self.end.container)
    }
}

/// Characters covered by a range, in document order
pub fn range_text<T: TreeAccess + ?Sized>(tree: &T, range: &Range) -> String {
    let Some(scope) = range.common_ancestor(tree) else {
        return String::new();
    };
    let (start, end) = (range.start, range.end);

    let mut out = String::new();
    for leaf in text_leaves(tree, scope) {
        let len = tree.text_len(leaf);
        let before = |point: Boundary| compare_points(tree, Boundary::new(leaf, 0), point) == Some(Ordering::Less);

        let from = if leaf == start.container {
            start.offset.min(len)
        } else if before(start) {
            continue;
        } else {
            0
        };
        let to = if leaf == end.container {
            end.offset.min(len)
        } else if before(end) {
            len
        } else {
            break;
        };

        if from < to {
            out.push_str(char_slice(tree.text_content(leaf).unwrap_or_default(), from, to));
        }
        if leaf == end.container {
            break;
        }
    }
    out
}

/// Snap a container-form start onto the leaf just before the child offset
fn snap_start<T: TreeAccess + ?Sized>(tree: &T, at: Boundary) -> Boundary {
    if !tree.kind(at.container).is_some_and(|k| k.is_container()) {
        return at;
    }
    if at.offset == 0 {
        return Boundary::new(first_leaf(tree, at.container), 0);
    }
    match tree.child_at(at.container, at.offset - 1) {
        Some(child) => {
            let leaf = last_leaf(tree, child);
            Boundary::new(leaf, node_length(tree, leaf))
        }
        None => at,
    }
}

/// Snap a container-form end onto the leaf just after the child offset
fn snap_end<T: TreeAccess + ?Sized>(tree: &T, at: Boundary) -> Boundary {
    if !tree.kind(at.container).is_some_and(|k| k.is_container()) {
        return at;
    }
    match tree.child_at(at.container, at.offset) {
        Some(child) => Boundary::new(first_leaf(tree, child), 0),
        None if at.offset > 0 && tree.first_child_of(at.container).is_some() => {
            let leaf = last_leaf(tree, at.container);
            Boundary::new(leaf, node_length(tree, leaf))
        }
        None => at,
    }
}

/// Chars of `leaf` that fall between the two snapped boundaries
fn chars_in_range<T: TreeAccess + ?Sized>(tree: &T, leaf: NodeId, start: Boundary, end: Boundary) -> usize {
    if !tree.kind(leaf).is_some_and(|k| k.is_text_leaf()) {
        return 0;
    }
    let len = tree.text_len(leaf);
    let hi = if leaf == end.container { end.offset.min(len) } else { len };
    let lo = if leaf == start.container { start.offset.min(len) } else { 0 };
    hi.saturating_sub(lo)
}

/// Move both ends of a range onto text leaves, keeping its content
///
/// The start lands on the first text leaf holding a selected character and
/// the end on the last one. Element-form boundaries are resolved to the
/// leaves they touch first, and empty or fully excluded leaves at the edges
/// are skipped. A range selecting no characters collapses onto its start.
pub fn normalize_boundaries<T: TreeAccess + ?Sized>(tree: &T, range: &mut Range) {
    let start = snap_start(tree, range.start);
    let end = snap_end(tree, range.end);

    let mut first = None;
    let mut cursor = Some(start.container);
    while let Some(node) = cursor {
        if chars_in_range(tree, node, start, end) > 0 {
            first = Some(node);
            break;
        }
        if node == end.container {
            break;
        }
        cursor = next(tree, node);
    }

    let mut last = None;
    let mut cursor = Some(end.container);
    while let Some(node) = cursor {
        if chars_in_range(tree, node, start, end) > 0 {
            last = Some(node);
            break;
        }
        if node == start.container {
            break;
        }
        cursor = prev(tree, node);
    }

    *range = match (first, last) {
        (Some(s), Some(e)) if compare_points(tree, Boundary::new(s, 0), Boundary::new(e, 0)) != Some(Ordering::Greater) => {
            let start_offset = if s == start.container { start.offset } else { 0 };
            let end_offset = if e == end.container { end.offset } else { tree.text_len(e) };
            Range::new(Boundary::new(s, start_offset), Boundary::new(e, end_offset))
        }
        _ => {
            trace!(container = start.container, offset = start.offset, "range selects no text, collapsing");
            Range::collapsed(start)
        }
    };
}

/// Whether a boundary sits strictly inside a text leaf
fn is_mid_leaf<T: TreeAccess + ?Sized>(tree: &T, at: Boundary) -> bool {
    tree.kind(at.container).is_some_and(|k| k.is_text_leaf()) && at.offset > 0 && at.offset < tree.text_len(at.container)
}

/// Keep an element-form boundary on the same position after `leaf` gained a tail sibling
fn shift_past_split<T: TreeAccess + ?Sized>(tree: &T, at: Boundary, leaf: NodeId) -> Boundary {
    match tree.parent_of(leaf) {
        Some(parent) if at.container == parent && at.offset > index_of(tree, leaf) => {
            Boundary::new(parent, at.offset + 1)
        }
        _ => at,
    }
}

/// Split the text leaves a range's boundaries fall inside
///
/// Afterwards no boundary sits strictly inside a text leaf: a split
/// boundary moves to offset 0 of the new tail. The end is split first so a
/// start inside the same leaf keeps its offset.
pub fn split_boundaries<T: TreeMut + ?Sized>(tree: &mut T, range: &mut Range) -> Result<(), RangeError> {
    let Range { mut start, mut end } = *range;

    if is_mid_leaf(tree, end) {
        let leaf = end.container;
        let tail = split_text(tree, leaf, end.offset)?;
        end = Boundary::new(tail, 0);
        start = shift_past_split(tree, start, leaf);
    }

    if is_mid_leaf(tree, start) {
        let leaf = start.container;
        let tail = split_text(tree, leaf, start.offset)?;
        if end.container == leaf {
            // The end sat at the far edge of the same leaf, which now belongs to the tail
            end = Boundary::new(tail, end.offset.saturating_sub(start.offset));
        } else {
            end = shift_past_split(tree, end, leaf);
        }
        start = Boundary::new(tail, 0);
    }

    *range = Range::new(start, end);
    Ok(())
}
