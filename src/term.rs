//! Elixir Term Conversion Utilities
//!
//! Converts boundaries, ranges and errors to Elixir terms and back.
//!
//! - node: non-negative integer id
//! - boundary: `{node, offset}`
//! - range: `{{start_node, start_offset}, {end_node, end_offset}}`
//! - serialized range: `%{start: path, start_offset: n, end: path, end_offset: n}`
//! - error: `{:error, {kind, :start | :end}}` or `{:error, {kind, message}}`

use crate::error::{RangeError, Side};
use crate::range::boundary::{Boundary, Range};
use crate::range::codec::SerializedRange;
use crate::resource::AccessError;
use rustler::{Atom, Encoder, Env, Term};

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    ok,
    error,
    start,
    end,
    start_offset,
    end_offset,
    not_in_root,
    not_found,
    index_out_of_range,
    malformed_path,
    invalid_split_offset,
    not_a_text_leaf,
    unknown_node,
    mutex_poisoned,
    no_root,
}

/// Plain tuple form of a range as it crosses the NIF boundary
pub type RangeTuple = ((u32, usize), (u32, usize));

pub fn range_from_tuple(((sn, so), (en, eo)): RangeTuple) -> Range {
    Range::new(Boundary::new(sn, so), Boundary::new(en, eo))
}

pub fn range_to_tuple(range: &Range) -> RangeTuple {
    (
        (range.start.container, range.start.offset),
        (range.end.container, range.end.offset),
    )
}

fn side_atom(side: Side) -> Atom {
    match side {
        Side::Start => start(),
        Side::End => end(),
    }
}

fn kind_atom(err: &RangeError) -> Atom {
    match err {
        RangeError::NodeNotInRoot => not_in_root(),
        RangeError::NotFound { .. } | RangeError::PathNotFound(_) => not_found(),
        RangeError::IndexOutOfRange { .. } => index_out_of_range(),
        RangeError::MalformedPath { .. } => malformed_path(),
        RangeError::InvalidSplitOffset { .. } => invalid_split_offset(),
        RangeError::NotATextLeaf(_) => not_a_text_leaf(),
        RangeError::UnknownNode(_) => unknown_node(),
    }
}

/// `{:error, reason}` for a range failure
pub fn range_error_to_term<'a>(env: Env<'a>, err: &RangeError) -> Term<'a> {
    let reason = match err.side() {
        Some(side) => (kind_atom(err), side_atom(side)).encode(env),
        None => (kind_atom(err), err.to_string()).encode(env),
    };
    (error(), reason).encode(env)
}

pub fn access_error_to_term<'a>(env: Env<'a>, err: &AccessError) -> Term<'a> {
    match err {
        AccessError::Poisoned => (error(), mutex_poisoned()).encode(env),
        AccessError::Range(inner) => range_error_to_term(env, inner),
    }
}

/// `{:ok, value}` or the matching error term
pub fn result_to_term<'a, T: Encoder>(env: Env<'a>, result: Result<T, RangeError>) -> Term<'a> {
    match result {
        Ok(value) => (ok(), value).encode(env),
        Err(err) => range_error_to_term(env, &err),
    }
}

pub fn serialized_to_term<'a>(env: Env<'a>, serialized: &SerializedRange) -> Term<'a> {
    let pairs = [
        (start().encode(env), serialized.start.to_string().encode(env)),
        (start_offset().encode(env), serialized.start_offset.encode(env)),
        (end().encode(env), serialized.end.to_string().encode(env)),
        (end_offset().encode(env), serialized.end_offset.encode(env)),
    ];
    // Keys are distinct atoms, so building the map cannot fail
    Term::map_from_pairs(env, &pairs).unwrap_or_else(|_| error().encode(env))
}
