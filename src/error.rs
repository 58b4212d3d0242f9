//! Range Errors
//!
//! Every failure of the path/range algebra is reported as a [`RangeError`]
//! at the point it is detected. Nothing is retried and no partial result is
//! produced.

use crate::dom::NodeId;
use std::fmt;

/// Which end of a range an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Start,
    End,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Start => "start",
            Side::End => "end",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// `path_of` reached the top of the tree without meeting the root
    #[error("the supplied node is not contained by the root node")]
    NodeNotInRoot,

    /// A structural path does not resolve under the given root
    #[error("the {which} node was not found")]
    NotFound { which: Side },

    /// A lone path lookup found no node
    #[error("no node at path {0}")]
    PathNotFound(String),

    /// A character offset runs past the text of the resolved node
    #[error("there is no text at the requested {which} offset")]
    IndexOutOfRange { which: Side },

    #[error("malformed path {path:?}: {reason}")]
    MalformedPath { path: String, reason: &'static str },

    #[error("cannot split a text leaf of length {length} at offset {offset}")]
    InvalidSplitOffset { offset: usize, length: usize },

    #[error("node {0} is not a text leaf")]
    NotATextLeaf(NodeId),

    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
}

impl RangeError {
    /// Short machine-readable name, used as the error atom at the NIF boundary
    pub fn kind(&self) -> &'static str {
        match self {
            RangeError::NodeNotInRoot => "not_in_root",
            RangeError::NotFound { .. } | RangeError::PathNotFound(_) => "not_found",
            RangeError::IndexOutOfRange { .. } => "index_out_of_range",
            RangeError::MalformedPath { .. } => "malformed_path",
            RangeError::InvalidSplitOffset { .. } => "invalid_split_offset",
            RangeError::NotATextLeaf(_) => "not_a_text_leaf",
            RangeError::UnknownNode(_) => "unknown_node",
        }
    }

    /// The range end involved, for errors raised while decoding a boundary
    pub fn side(&self) -> Option<Side> {
        match self {
            RangeError::NotFound { which } | RangeError::IndexOutOfRange { which } => Some(*which),
            _ => None,
        }
    }
}
