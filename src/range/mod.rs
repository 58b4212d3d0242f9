//! Range addressing
//!
//! Everything needed to turn a live range into durable (path, offset)
//! pairs and back:
//!
//! - `walk`: document-order navigation and boundary comparison
//! - `path`: structural paths to and from nodes
//! - `split`: splitting text leaves
//! - `boundary`: boundary normalization
//! - `limit`: clipping a range to a node
//! - `codec`: serialization of whole ranges
//! - `cache`: LRU of parsed paths

pub mod boundary;
pub mod cache;
pub mod codec;
pub mod limit;
pub mod path;
pub mod split;
pub mod walk;

#[cfg(test)]
pub(crate) mod testing;

pub use boundary::{normalize_boundaries, range_text, split_boundaries, Boundary, Range};
pub use cache::PathCache;
pub use codec::{deserialize, serialize, serialize_normalized, SerializedRange};
pub use limit::limit;
pub use path::{path_of, resolve, Path, Step, StepName};
pub use split::split_text;
