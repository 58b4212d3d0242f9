//! Batch Strategies
//!
//! Converting stored positions one at a time is fine for a single range; a
//! document opened with hundreds of saved highlights resolves them in
//! parallel instead.

pub mod parallel;

pub use parallel::{deserialize_parallel, serialize_parallel};
