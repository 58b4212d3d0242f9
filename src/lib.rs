//! RustyRange - durable addresses for text ranges in XML documents
//!
//! A live range is a pair of (node, offset) boundaries inside a parsed
//! document. It is converted to (structural path, char offset) pairs that
//! survive re-parsing the same markup, and back again.
//!
//! Layers:
//! - `core` + `reader`: zero-copy XML reader feeding the DOM builder
//! - `dom`: arena document and the `TreeAccess`/`TreeMut` seam
//! - `range`: paths, boundary normalization and range serialization
//! - `strategy`: parallel batch conversion (Rayon)
//! - NIFs below, for the `RustyRange.Native` Elixir module

use rustler::{Binary, Encoder, Env, NifResult, ResourceArc, Term};

mod core;
pub mod dom;
pub mod error;
pub mod range;
mod reader;
mod resource;
pub mod strategy;
mod term;

pub use dom::{Document, NodeId, NodeKind, ParseOptions, TreeAccess, TreeMut};
pub use error::{RangeError, Side};
pub use range::{Boundary, Path, Range, SerializedRange};

use dom::markup::to_markup;
use range::codec::{self, SerializedRange as Stored};
use resource::{AccessError, DocumentRef, DocumentResource};
use term::{access_error_to_term, range_from_tuple, range_to_tuple, result_to_term, serialized_to_term, RangeTuple};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Stored position as it arrives from Elixir: `{start, start_offset, end, end_offset}`
type StoredTuple<'a> = (&'a str, usize, &'a str, usize);

/// Resolve a stored position, parsing its paths through the resource cache
fn stored_from_tuple(doc_ref: &DocumentResource, (start, so, end, eo): StoredTuple<'_>) -> Result<Stored, AccessError> {
    Ok(Stored {
        start: doc_ref.path(start)?,
        start_offset: so,
        end: doc_ref.path(end)?,
        end_offset: eo,
    })
}

fn encode_access<'a, T: Encoder>(env: Env<'a>, result: Result<Result<T, RangeError>, AccessError>) -> Term<'a> {
    match result {
        Ok(inner) => result_to_term(env, inner),
        Err(err) => access_error_to_term(env, &err),
    }
}

// ============================================================================
// Documents
// ============================================================================

/// Parse XML into a document (returns ResourceArc)
/// Lenient mode - accepts malformed XML
#[rustler::nif]
fn parse(input: Binary) -> DocumentRef {
    ResourceArc::new(DocumentResource::new(Document::parse(input.as_slice())))
}

/// Parse XML in strict mode (returns {:ok, doc} or {:error, reason})
#[rustler::nif]
fn parse_strict<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    match Document::parse_strict(input.as_slice()) {
        Ok(doc) => {
            let arc = ResourceArc::new(DocumentResource::new(doc));
            Ok((term::ok(), arc).encode(env))
        }
        Err(msg) => Ok((term::error(), msg).encode(env)),
    }
}

/// Root element id
#[rustler::nif]
fn root_element<'a>(env: Env<'a>, doc_ref: DocumentRef) -> NifResult<Term<'a>> {
    Ok(match doc_ref.with_doc(|doc| doc.root_element_id()) {
        Ok(Some(id)) => (term::ok(), id).encode(env),
        Ok(None) => (term::error(), term::no_root()).encode(env),
        Err(err) => access_error_to_term(env, &err),
    })
}

/// Markup of a node and its descendants
#[rustler::nif]
fn node_markup<'a>(env: Env<'a>, doc_ref: DocumentRef, node: NodeId) -> NifResult<Term<'a>> {
    let result = doc_ref.with_doc(|doc| match doc.kind(node) {
        Some(_) => Ok(to_markup(doc, node)),
        None => Err(RangeError::UnknownNode(node)),
    });
    Ok(encode_access(env, result))
}

// ============================================================================
// Paths
// ============================================================================

/// Path from `root` to `node`
#[rustler::nif]
fn node_path<'a>(env: Env<'a>, doc_ref: DocumentRef, node: NodeId, root: NodeId) -> NifResult<Term<'a>> {
    let result = doc_ref.with_doc(|doc| range::path_of(doc, node, root).map(|path| path.to_string()));
    Ok(encode_access(env, result))
}

/// Node a path names under `root`
#[rustler::nif]
fn resolve_path<'a>(env: Env<'a>, doc_ref: DocumentRef, path: &str, root: NodeId) -> NifResult<Term<'a>> {
    let result = doc_ref.path(path).and_then(|path| {
        doc_ref.with_doc(|doc| {
            range::resolve(doc, &path, root).ok_or_else(|| RangeError::PathNotFound(path.to_string()))
        })
    });
    Ok(encode_access(env, result))
}

// ============================================================================
// Ranges
// ============================================================================

/// Serialize a live range relative to `root`
///
/// Elements whose tag is in `ignore_tags` are never used as anchors. With
/// `normalize` the boundaries are split and normalized first, which mutates
/// the document; a range outside `root` is rejected before any split.
#[rustler::nif]
fn serialize_range<'a>(
    env: Env<'a>,
    doc_ref: DocumentRef,
    range: RangeTuple,
    root: NodeId,
    ignore_tags: Vec<String>,
    normalize: bool,
) -> NifResult<Term<'a>> {
    let mut live = range_from_tuple(range);
    let result = doc_ref.with_doc_mut(|doc| {
        if normalize {
            codec::check_in_root(&*doc, &live, root)?;
            range::split_boundaries(doc, &mut live)?;
            range::normalize_boundaries(doc, &mut live);
        }
        let doc = &*doc;
        let ignored = |id: NodeId| doc.node_name(id).is_some_and(|name| ignore_tags.iter().any(|t| t == name));
        let ignore: Option<&dyn Fn(NodeId) -> bool> = if ignore_tags.is_empty() { None } else { Some(&ignored) };
        codec::serialize(doc, &live, root, ignore)
    });

    Ok(match result {
        Ok(Ok(serialized)) => (term::ok(), serialized_to_term(env, &serialized)).encode(env),
        Ok(Err(err)) => term::range_error_to_term(env, &err),
        Err(err) => access_error_to_term(env, &err),
    })
}

/// Rebuild a live range from a stored position
#[rustler::nif]
fn deserialize_range<'a>(
    env: Env<'a>,
    doc_ref: DocumentRef,
    root: NodeId,
    stored: StoredTuple<'a>,
) -> NifResult<Term<'a>> {
    let result = stored_from_tuple(&doc_ref, stored)
        .and_then(|stored| doc_ref.with_doc(|doc| stored.to_range(doc, root).map(|r| range_to_tuple(&r))));
    Ok(encode_access(env, result))
}

/// Rebuild many stored positions in parallel (DirtyCpu scheduler)
///
/// Returns one `{:ok, range}` or `{:error, reason}` per input, in order.
#[rustler::nif(schedule = "DirtyCpu")]
fn deserialize_ranges<'a>(
    env: Env<'a>,
    doc_ref: DocumentRef,
    root: NodeId,
    batch: Vec<StoredTuple<'a>>,
) -> NifResult<Term<'a>> {
    let mut stored = Vec::with_capacity(batch.len());
    for item in batch {
        match stored_from_tuple(&doc_ref, item) {
            Ok(s) => stored.push(s),
            Err(err) => return Ok(access_error_to_term(env, &err)),
        }
    }

    let result = doc_ref.with_doc(|doc| strategy::deserialize_parallel(doc, root, &stored));
    let results = match result {
        Ok(results) => results,
        Err(err) => return Ok(access_error_to_term(env, &err)),
    };

    let mut list = Term::list_new_empty(env);
    for result in results.into_iter().rev() {
        list = list.list_prepend(result_to_term(env, result.map(|r| range_to_tuple(&r))));
    }
    Ok(list)
}

/// Text a live range covers
#[rustler::nif]
fn range_text<'a>(env: Env<'a>, doc_ref: DocumentRef, range: RangeTuple) -> NifResult<Term<'a>> {
    let live = range_from_tuple(range);
    Ok(match doc_ref.with_doc(|doc| range::range_text(doc, &live)) {
        Ok(text) => (term::ok(), text).encode(env),
        Err(err) => access_error_to_term(env, &err),
    })
}

/// Split and normalize a live range, returning its new boundaries
#[rustler::nif]
fn normalize_range<'a>(env: Env<'a>, doc_ref: DocumentRef, range: RangeTuple) -> NifResult<Term<'a>> {
    let mut live = range_from_tuple(range);
    let result = doc_ref.with_doc_mut(|doc| {
        range::split_boundaries(doc, &mut live)?;
        range::normalize_boundaries(doc, &mut live);
        Ok::<_, RangeError>(range_to_tuple(&live))
    });
    Ok(encode_access(env, result))
}

/// Clip a live range to the contents of `bounds`
#[rustler::nif]
fn limit_range<'a>(env: Env<'a>, doc_ref: DocumentRef, range: RangeTuple, bounds: NodeId) -> NifResult<Term<'a>> {
    let live = range_from_tuple(range);
    Ok(match doc_ref.with_doc(|doc| range::limit(doc, &live, bounds)) {
        Ok(Some(limited)) => (term::ok(), range_to_tuple(&limited)).encode(env),
        Ok(None) => rustler::types::atom::nil().encode(env),
        Err(err) => access_error_to_term(env, &err),
    })
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.RustyRange.Native");
