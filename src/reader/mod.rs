//! Markup Reader Module
//!
//! - SliceReader: zero-copy pull reader over a string slice
//! - Events: event types produced by the reader

pub mod events;
pub mod slice;
