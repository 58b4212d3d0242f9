//! Range limiting
//!
//! Clip a range to the contents of a bounding node.

use super::boundary::{Boundary, Range};
use super::walk::{compare_points, contains, node_length};
use crate::dom::{NodeId, TreeAccess};
use std::cmp::Ordering;

/// Clip `range` to the contents of `bounds`
///
/// A boundary outside `bounds` is replaced by the matching edge of
/// `bounds`. Returns `None` when the range and `bounds` do not intersect,
/// including when they live in different trees.
pub fn limit<T: TreeAccess + ?Sized>(tree: &T, range: &Range, bounds: NodeId) -> Option<Range> {
    tree.kind(bounds)?;
    let inner_start = Boundary::new(bounds, 0);
    let inner_end = Boundary::new(bounds, node_length(tree, bounds));

    let starts_before_end = matches!(
        compare_points(tree, range.start, inner_end),
        Some(Ordering::Less | Ordering::Equal)
    );
    let ends_after_start = matches!(
        compare_points(tree, range.end, inner_start),
        Some(Ordering::Greater | Ordering::Equal)
    );
    if !(starts_before_end && ends_after_start) {
        return None;
    }

    let start = if contains(tree, bounds, range.start.container) {
        range.start
    } else {
        inner_start
    };
    let end = if contains(tree, bounds, range.end.container) {
        range.end
    } else {
        inner_end
    };
    Some(Range::new(start, end))
}
