//! Core markup primitives
//!
//! The low-level building blocks the reader is made of:
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Entities: reference decoding with Cow (zero-copy when possible)
//! - Attributes: attribute list parsing

pub mod attributes;
pub mod entities;
pub mod scanner;
