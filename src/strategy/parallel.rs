//! Parallel range conversion
//!
//! Uses Rayon to convert many stored positions against one document. Only
//! the read-only operations run here; splitting leaves needs the tree
//! exclusively.

use crate::dom::{NodeId, TreeAccess};
use crate::error::RangeError;
use crate::range::boundary::Range;
use crate::range::codec::{serialize, SerializedRange};
use rayon::prelude::*;

/// Resolve many serialized ranges in parallel, keeping input order
pub fn deserialize_parallel<T: TreeAccess + Sync + ?Sized>(
    tree: &T,
    root: NodeId,
    stored: &[SerializedRange],
) -> Vec<Result<Range, RangeError>> {
    stored.par_iter().map(|s| s.to_range(tree, root)).collect()
}

/// Serialize many ranges in parallel, keeping input order
pub fn serialize_parallel<T: TreeAccess + Sync + ?Sized>(
    tree: &T,
    ranges: &[Range],
    root: NodeId,
) -> Vec<Result<SerializedRange, RangeError>> {
    ranges.par_iter().map(|range| serialize(tree, range, root, None)).collect()
}
