//! ResourceArc Wrappers
//!
//! Persistent state for parsed documents. A document is mutated in place
//! when a range's boundaries split its text leaves, so access goes through
//! a mutex.

use crate::dom::Document;
use crate::error::RangeError;
use crate::range::cache::PathCache;
use crate::range::path::Path;
use rustler::ResourceArc;
use std::sync::{Mutex, MutexGuard};

/// A parsed document plus the paths recently parsed against it
pub struct DocumentResource {
    pub doc: Mutex<Document>,
    paths: Mutex<PathCache>,
}

/// Failure to reach the state behind a resource
#[derive(Debug)]
pub enum AccessError {
    Poisoned,
    Range(RangeError),
}

impl From<RangeError> for AccessError {
    fn from(err: RangeError) -> Self {
        AccessError::Range(err)
    }
}

impl DocumentResource {
    pub fn new(doc: Document) -> Self {
        DocumentResource {
            doc: Mutex::new(doc),
            paths: Mutex::new(PathCache::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Document>, AccessError> {
        self.doc.lock().map_err(|_| AccessError::Poisoned)
    }

    /// Run `f` against the document
    pub fn with_doc<F, R>(&self, f: F) -> Result<R, AccessError>
    where
        F: FnOnce(&Document) -> R,
    {
        let guard = self.lock()?;
        Ok(f(&guard))
    }

    /// Run `f` against the document with write access
    pub fn with_doc_mut<F, R>(&self, f: F) -> Result<R, AccessError>
    where
        F: FnOnce(&mut Document) -> R,
    {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }

    /// Parse a path through the resource's cache
    pub fn path(&self, raw: &str) -> Result<Path, AccessError> {
        let mut cache = self.paths.lock().map_err(|_| AccessError::Poisoned)?;
        Ok(cache.get_or_parse(raw)?)
    }
}

#[rustler::resource_impl]
impl rustler::Resource for DocumentResource {}

impl Default for DocumentResource {
    fn default() -> Self {
        DocumentResource::new(Document::new())
    }
}

/// Type alias for document ResourceArc
pub type DocumentRef = ResourceArc<DocumentResource>;
