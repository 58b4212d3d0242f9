//! String Interning Pool
//!
//! Element names and character data live in a single growable buffer and
//! are referenced by `u32` id. Identical strings share one entry, so every
//! `<p>` in a document carries the same name id and path steps can be
//! matched by integer comparison.
//!
//! Entries are never removed. Splitting a text leaf interns the two halves
//! and leaves the old string in place.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// String interning pool
///
/// Memory layout:
/// - `entries`: (offset, byte length) into `data` for each string id
/// - `data`: one buffer holding every interned string back to back
/// - `hash_index`: hash -> ids with that hash (handles rare collisions)
#[derive(Debug, Clone)]
pub struct StringPool {
    entries: Vec<(u32, u32)>,
    data: String,
    hash_index: HashMap<u64, Vec<u32>>,
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

impl StringPool {
    /// Create a new pool; id 0 is the empty string
    pub fn new() -> Self {
        let mut pool = StringPool {
            entries: Vec::with_capacity(256),
            data: String::with_capacity(4096),
            hash_index: HashMap::new(),
        };
        pool.entries.push((0, 0));
        pool
    }

    #[inline]
    fn compute_hash(s: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    /// Intern a string, returning the id of an existing copy when there is one
    pub fn intern(&mut self, s: &str) -> u32 {
        if s.is_empty() {
            return 0;
        }
        let hash = Self::compute_hash(s);
        if let Some(id) = self.find(hash, s) {
            return id;
        }

        let offset = self.data.len() as u32;
        self.data.push_str(s);
        let id = self.entries.len() as u32;
        self.entries.push((offset, s.len() as u32));
        self.hash_index.entry(hash).or_default().push(id);
        id
    }

    /// Id of an already interned string, without inserting it
    pub fn lookup(&self, s: &str) -> Option<u32> {
        if s.is_empty() {
            return Some(0);
        }
        self.find(Self::compute_hash(s), s)
    }

    fn find(&self, hash: u64, s: &str) -> Option<u32> {
        self.hash_index
            .get(&hash)?
            .iter()
            .copied()
            .find(|&id| self.get_str(id) == Some(s))
    }

    /// Get a string by id
    #[inline]
    pub fn get_str(&self, id: u32) -> Option<&str> {
        let &(offset, len) = self.entries.get(id as usize)?;
        let start = offset as usize;
        self.data.get(start..start + len as usize)
    }

    /// Number of interned strings (including the empty string)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Total bytes of string data held
    pub fn data_size(&self) -> usize {
        self.data.len()
    }
}

/// Length of `s` in characters (Unicode scalar values)
#[inline]
pub fn char_len(s: &str) -> usize {
    if s.is_ascii() {
        s.len()
    } else {
        s.chars().count()
    }
}

/// Byte index of the character at `char_offset`, or `s.len()` one past the end
pub fn byte_index(s: &str, char_offset: usize) -> Option<usize> {
    if s.is_ascii() {
        return (char_offset <= s.len()).then_some(char_offset);
    }
    s.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(s.len()))
        .nth(char_offset)
}

/// Substring between two character offsets, clamped to the string
pub fn char_slice(s: &str, from: usize, to: usize) -> &str {
    let end = byte_index(s, to).unwrap_or(s.len());
    let start = byte_index(s, from).unwrap_or(s.len()).min(end);
    &s[start..end]
}
