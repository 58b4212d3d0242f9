//! Text leaf splitting

use crate::dom::{NodeId, TreeMut};
use crate::error::RangeError;
use tracing::debug;

/// Split a text leaf at a char offset
///
/// The leaf keeps chars `[0, offset)` and a new leaf holding the rest is
/// inserted as its next sibling; its id is returned. The offset must lie
/// strictly inside the leaf.
pub fn split_text<T: TreeMut + ?Sized>(tree: &mut T, leaf: NodeId, offset: usize) -> Result<NodeId, RangeError> {
    let kind = tree.kind(leaf).ok_or(RangeError::UnknownNode(leaf))?;
    if !kind.is_text_leaf() {
        return Err(RangeError::NotATextLeaf(leaf));
    }
    let length = tree.text_len(leaf);
    if offset == 0 || offset >= length {
        return Err(RangeError::InvalidSplitOffset { offset, length });
    }

    let tail = tree.split_leaf(leaf, offset)?;
    debug!(leaf, offset, tail, "split text leaf");
    Ok(tail)
}
