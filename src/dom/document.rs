//! Document - Arena-based tree representation
//!
//! Efficient storage with:
//! - Arena allocation for nodes
//! - NodeId indices for traversal
//! - String interning for names and character data
//!
//! A `Document` owns everything it references, so it can live inside a
//! `ResourceArc` and be mutated in place when a range splits a text leaf.

use super::node::{NodeId, NodeKind, XmlAttribute, XmlNode};
use super::strings::{self, StringPool};
use super::{Lookup, TreeAccess, TreeMut};
use crate::core::attributes::Attribute;
use crate::error::RangeError;
use crate::range::path::{Path, StepName};
use crate::range::walk;
use crate::reader::events::{StartElement, XmlEvent};
use crate::reader::slice::SliceReader;
use tracing::{debug, trace};

/// Id of the document node in every arena
pub const DOCUMENT_NODE: NodeId = 0;

/// Options accepted by [`Document::parse_with_options`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Reject input that is not well-formed
    pub strict: bool,
    /// Keep comment nodes in the tree
    pub keep_comments: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            strict: false,
            keep_comments: true,
        }
    }
}

/// A document stored in arena format
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<XmlNode>,
    attributes: Vec<XmlAttribute>,
    /// Interned names and character data
    pub strings: StringPool,
    /// Root element node ID (not the document node)
    root_element: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document holding only the document node
    pub fn new() -> Self {
        Document {
            nodes: vec![XmlNode::document()],
            attributes: Vec::new(),
            strings: StringPool::new(),
            root_element: None,
        }
    }

    /// Parse a document (lenient mode)
    ///
    /// Invalid UTF-8 is replaced and malformed markup is kept as text.
    pub fn parse(input: &[u8]) -> Self {
        let text = String::from_utf8_lossy(input);
        let mut doc = Document::new();
        // Lenient building never fails.
        let _ = doc.build_from_events(&text, &ParseOptions::default());
        doc
    }

    /// Parse a document in strict mode
    ///
    /// Returns Err if the document is not well-formed.
    pub fn parse_strict(input: &[u8]) -> Result<Self, String> {
        Self::parse_with_options(
            input,
            &ParseOptions {
                strict: true,
                ..ParseOptions::default()
            },
        )
    }

    pub fn parse_with_options(input: &[u8], options: &ParseOptions) -> Result<Self, String> {
        let text = if options.strict {
            std::borrow::Cow::Borrowed(std::str::from_utf8(input).map_err(|e| format!("Invalid UTF-8: {}", e))?)
        } else {
            String::from_utf8_lossy(input)
        };
        let mut doc = Document::new();
        doc.build_from_events(&text, options)?;
        debug!(nodes = doc.nodes.len(), strings = doc.strings.len(), "parsed document");
        Ok(doc)
    }

    /// Build the tree from reader events
    fn build_from_events(&mut self, input: &str, options: &ParseOptions) -> Result<(), String> {
        let strict = options.strict;
        let mut reader = if strict {
            SliceReader::new_strict(input)
        } else {
            SliceReader::new(input)
        };
        // Open elements with their tag names; the document node sits at the bottom
        let mut stack: Vec<(NodeId, &str)> = vec![(DOCUMENT_NODE, "")];

        while let Some(event) = reader.next_event() {
            let parent = stack.last().map_or(DOCUMENT_NODE, |&(id, _)| id);
            let at_document_level = stack.len() == 1;

            match event {
                XmlEvent::StartElement(elem) => {
                    let name = elem.name;
                    let id = self.open_element(parent, elem, strict)?;
                    stack.push((id, name));
                }

                XmlEvent::EmptyElement(elem) => {
                    self.open_element(parent, elem, strict)?;
                }

                XmlEvent::EndElement(name) => {
                    if strict {
                        match stack.pop() {
                            Some((_, open)) if stack.is_empty() => {
                                debug_assert_eq!(open, "");
                                return Err(format!("Unexpected end tag: </{}> without matching start tag", name));
                            }
                            Some((_, open)) if open != name => {
                                return Err(format!("Tag mismatch: <{}> closed with </{}>", open, name));
                            }
                            _ => {}
                        }
                    } else if let Some(depth) = stack.iter().rposition(|&(_, open)| open == name) {
                        // Lenient: close everything up to the matching start tag
                        if depth > 0 {
                            stack.truncate(depth);
                        }
                    }
                }

                XmlEvent::Text(content) => {
                    if at_document_level {
                        let blank = content.bytes().all(crate::core::scanner::is_whitespace);
                        if blank {
                            continue;
                        }
                        if strict {
                            return Err("Text content not allowed at document level".to_string());
                        }
                    }
                    if !content.is_empty() {
                        self.push_character_data(parent, NodeKind::Text, &content);
                    }
                }

                XmlEvent::CData(content) => {
                    if strict && at_document_level {
                        return Err("CDATA section not allowed at document level".to_string());
                    }
                    self.push_character_data(parent, NodeKind::CData, content);
                }

                XmlEvent::Comment(content) => {
                    if options.keep_comments {
                        self.push_character_data(parent, NodeKind::Comment, content);
                    }
                }

                XmlEvent::ProcessingInstruction { target, data } => {
                    let target_id = self.strings.intern(target);
                    let data_id = self.strings.intern(data);
                    let id = self.push_node(XmlNode::processing_instruction(target_id, data_id, Some(parent)));
                    self.link_child(parent, id);
                }

                XmlEvent::XmlDeclaration { .. } | XmlEvent::DocType(_) => {}
            }
        }

        if let Some(err) = reader.error() {
            return Err(err.to_string());
        }
        if strict {
            if let Some(&(_, open)) = stack.last().filter(|_| stack.len() > 1) {
                return Err(format!("Unclosed element: <{}>", open));
            }
            if self.root_element.is_none() {
                return Err("Document has no root element".to_string());
            }
        }
        Ok(())
    }

    /// Create an element node from a start tag and link it under `parent`
    fn open_element(&mut self, parent: NodeId, elem: StartElement<'_>, strict: bool) -> Result<NodeId, String> {
        if strict {
            if parent == DOCUMENT_NODE && self.root_element.is_some() {
                return Err("Document has multiple root elements".to_string());
            }
            if let Some(dup) = find_duplicate_attribute(&elem.attributes) {
                return Err(format!("Duplicate attribute: {}", dup));
            }
        }

        let id = self.append_element(parent, elem.name);
        let attr_start = self.attributes.len() as u32;
        for attr in &elem.attributes {
            let name_id = self.strings.intern(attr.name);
            let value_id = self.strings.intern(&attr.value);
            self.attributes.push(XmlAttribute { name_id, value_id });
        }
        let node = &mut self.nodes[id as usize];
        node.attr_start = attr_start;
        node.attr_count = elem.attributes.len().min(u16::MAX as usize) as u16;
        Ok(id)
    }

    fn push_node(&mut self, node: XmlNode) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        id
    }

    fn push_character_data(&mut self, parent: NodeId, kind: NodeKind, content: &str) -> NodeId {
        let content_id = self.strings.intern(content);
        let node = XmlNode::character_data(kind, content_id, strings::char_len(content), Some(parent));
        let id = self.push_node(node);
        self.link_child(parent, id);
        id
    }

    /// Link a child node as the last child of its parent
    fn link_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        let last_child_opt = self.nodes[parent_id as usize].last_child;

        if let Some(last_child_id) = last_child_opt {
            self.nodes[child_id as usize].prev_sibling = Some(last_child_id);
            self.nodes[last_child_id as usize].next_sibling = Some(child_id);
        } else {
            self.nodes[parent_id as usize].first_child = Some(child_id);
        }
        self.nodes[parent_id as usize].last_child = Some(child_id);
    }

    /// Link `new_id` as the next sibling of `existing_id`
    fn insert_after(&mut self, existing_id: NodeId, new_id: NodeId) {
        let (parent, next) = {
            let existing = &self.nodes[existing_id as usize];
            (existing.parent, existing.next_sibling)
        };

        let new = &mut self.nodes[new_id as usize];
        new.parent = parent;
        new.prev_sibling = Some(existing_id);
        new.next_sibling = next;
        self.nodes[existing_id as usize].next_sibling = Some(new_id);

        match (next, parent) {
            (Some(next_id), _) => self.nodes[next_id as usize].prev_sibling = Some(new_id),
            (None, Some(parent_id)) => self.nodes[parent_id as usize].last_child = Some(new_id),
            (None, None) => {}
        }
    }

    // ========================================================================
    // Building
    //
    // Programmatic construction. `parent` must be a node of this document.
    // ========================================================================

    /// Append an element as the last child of `parent`
    pub fn append_element(&mut self, parent: NodeId, name: &str) -> NodeId {
        let name_id = self.strings.intern(name);
        let id = self.push_node(XmlNode::element(name_id, Some(parent)));
        self.link_child(parent, id);
        if parent == DOCUMENT_NODE && self.root_element.is_none() {
            self.root_element = Some(id);
        }
        id
    }

    /// Append a text leaf as the last child of `parent`
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push_character_data(parent, NodeKind::Text, text)
    }

    pub fn append_cdata(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push_character_data(parent, NodeKind::CData, text)
    }

    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push_character_data(parent, NodeKind::Comment, text)
    }

    /// Create an element that belongs to no tree
    pub fn create_element(&mut self, name: &str) -> NodeId {
        let name_id = self.strings.intern(name);
        self.push_node(XmlNode::element(name_id, None))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn document_node_id(&self) -> NodeId {
        DOCUMENT_NODE
    }

    /// Root element (first element child of the document node)
    pub fn root_element_id(&self) -> Option<NodeId> {
        self.root_element
    }

    #[inline]
    pub fn get_node(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id as usize)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Attributes of an element
    pub fn attributes(&self, id: NodeId) -> &[XmlAttribute] {
        match self.get_node(id) {
            Some(node) if node.is_element() => {
                let start = node.attr_start as usize;
                self.attributes.get(start..start + node.attr_count as usize).unwrap_or(&[])
            }
            _ => &[],
        }
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let name_id = self.strings.lookup(name)?;
        self.attributes(id)
            .iter()
            .find(|a| a.name_id == name_id)
            .and_then(|a| self.strings.get_str(a.value_id))
    }

    /// Data of a processing instruction, empty for `<?target?>`
    pub fn processing_instruction_data(&self, id: NodeId) -> Option<&str> {
        match self.get_node(id) {
            Some(node) if node.kind == NodeKind::ProcessingInstruction => self.strings.get_str(node.data_id),
            _ => None,
        }
    }

    /// Concatenated text of every text leaf under `id`
    pub fn text_of(&self, id: NodeId) -> String {
        walk::text_leaves(self, id)
            .filter_map(|leaf| self.text_content(leaf))
            .collect()
    }
}

/// Name of the first attribute that appears twice
fn find_duplicate_attribute<'a>(attrs: &[Attribute<'a>]) -> Option<&'a str> {
    attrs
        .iter()
        .enumerate()
        .find(|(i, a)| attrs[..*i].iter().any(|b| b.name == a.name))
        .map(|(_, a)| a.name)
}

// ============================================================================
// Tree trait implementations
// ============================================================================

impl TreeAccess for Document {
    #[inline]
    fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get_node(id).map(|n| n.kind)
    }

    #[inline]
    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.parent
    }

    #[inline]
    fn first_child_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.first_child
    }

    #[inline]
    fn last_child_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.last_child
    }

    #[inline]
    fn next_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.next_sibling
    }

    #[inline]
    fn prev_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.prev_sibling
    }

    fn node_name(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        match node.kind {
            NodeKind::Element | NodeKind::ProcessingInstruction => self.strings.get_str(node.name_id),
            _ => None,
        }
    }

    fn text_content(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        if node.kind.has_character_data() {
            self.strings.get_str(node.name_id)
        } else {
            None
        }
    }

    #[inline]
    fn text_len(&self, id: NodeId) -> usize {
        match self.get_node(id) {
            Some(node) if node.kind.has_character_data() => node.char_len as usize,
            _ => 0,
        }
    }

    /// Walks sibling links comparing interned ids instead of strings
    fn lookup_path(&self, root: NodeId, path: &Path) -> Lookup {
        if self.get_node(root).is_none() {
            return Lookup::Missing;
        }

        let mut current = root;
        for step in path.steps() {
            let wanted_name = match step.name() {
                StepName::Element(name) => match self.strings.lookup(name) {
                    Some(id) => Some(id),
                    // A tag name never interned cannot occur in this document
                    None => return Lookup::Missing,
                },
                _ => None,
            };
            let matches = |node: &XmlNode| match step.name() {
                StepName::Element(_) => node.kind == NodeKind::Element && Some(node.name_id) == wanted_name,
                StepName::Text => node.kind == NodeKind::Text,
                StepName::CData => node.kind == NodeKind::CData,
                StepName::Comment => node.kind == NodeKind::Comment,
                StepName::ProcessingInstruction => node.kind == NodeKind::ProcessingInstruction,
            };

            let mut remaining = step.position();
            let mut child = self.nodes[current as usize].first_child;
            let mut found = None;
            while let (Some(id), true) = (child, remaining > 0) {
                let node = &self.nodes[id as usize];
                if matches(node) {
                    remaining -= 1;
                    if remaining == 0 {
                        found = Some(id);
                    }
                }
                child = node.next_sibling;
            }

            match found {
                Some(id) => current = id,
                None => return Lookup::Missing,
            }
        }
        Lookup::Found(current)
    }
}

impl TreeMut for Document {
    fn split_leaf(&mut self, leaf: NodeId, offset: usize) -> Result<NodeId, RangeError> {
        let node = self.get_node(leaf).ok_or(RangeError::UnknownNode(leaf))?;
        if !node.kind.is_text_leaf() {
            return Err(RangeError::NotATextLeaf(leaf));
        }
        let (kind, content_id, length) = (node.kind, node.name_id, node.char_len as usize);
        if offset == 0 || offset >= length {
            return Err(RangeError::InvalidSplitOffset { offset, length });
        }

        let text = self.strings.get_str(content_id).unwrap_or_default();
        let at = strings::byte_index(text, offset).ok_or(RangeError::InvalidSplitOffset { offset, length })?;
        let (head, tail) = text.split_at(at);
        let (head, tail) = (head.to_owned(), tail.to_owned());

        let head_id = self.strings.intern(&head);
        let tail_id = self.strings.intern(&tail);

        let head_node = &mut self.nodes[leaf as usize];
        head_node.name_id = head_id;
        head_node.char_len = offset as u32;

        let tail_node = XmlNode::character_data(kind, tail_id, length - offset, None);
        let tail_leaf = self.push_node(tail_node);
        self.insert_after(leaf, tail_leaf);

        trace!(leaf, offset, tail_leaf, "split text leaf");
        Ok(tail_leaf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::children;

    fn names(doc: &Document, parent: NodeId) -> Vec<String> {
        children(doc, parent)
            .map(|c| {
                doc.node_name(c)
                    .map(str::to_string)
                    .or_else(|| doc.text_content(c).map(|t| format!("#{}", t)))
                    .unwrap_or_default()
            })
            .collect()
    }

    #[test]
    fn test_parse_simple() {
        let doc = Document::parse(b"<root>hello</root>");
        let root = doc.root_element_id().unwrap();
        assert_eq!(doc.node_name(root), Some("root"));
        assert_eq!(doc.text_of(root), "hello");
    }

    #[test]
    fn test_parse_nested_and_siblings() {
        let doc = Document::parse(b"<root><a/>x<b><c/></b><!--note--></root>");
        let root = doc.root_element_id().unwrap();
        assert_eq!(names(&doc, root), vec!["a", "#x", "b", "#note"]);

        let first = doc.first_child_of(root).unwrap();
        assert!(doc.prev_sibling_of(first).is_none());
        assert_eq!(doc.child_count(root), 4);
        assert_eq!(doc.kind(doc.child_at(root, 3).unwrap()), Some(NodeKind::Comment));
    }

    #[test]
    fn test_drop_comments_option() {
        let options = ParseOptions {
            keep_comments: false,
            ..ParseOptions::default()
        };
        let doc = Document::parse_with_options(b"<r>a<!--x-->b</r>", &options).unwrap();
        let root = doc.root_element_id().unwrap();
        assert_eq!(names(&doc, root), vec!["#a", "#b"]);
    }

    #[test]
    fn test_attributes() {
        let doc = Document::parse(b"<p class=\"hl\" id='x'>t</p>");
        let root = doc.root_element_id().unwrap();
        assert_eq!(doc.get_attribute(root, "class"), Some("hl"));
        assert_eq!(doc.get_attribute(root, "id"), Some("x"));
        assert_eq!(doc.get_attribute(root, "title"), None);
        assert_eq!(doc.attributes(root).len(), 2);
    }

    #[test]
    fn test_char_len_counts_scalars() {
        let doc = Document::parse("<p>naïve &amp; café</p>".as_bytes());
        let leaf = doc.first_child_of(doc.root_element_id().unwrap()).unwrap();
        assert_eq!(doc.text_content(leaf), Some("naïve & café"));
        assert_eq!(doc.text_len(leaf), 12);
    }

    #[test]
    fn test_strict_errors() {
        assert!(Document::parse_strict(b"<a><b></a>").unwrap_err().contains("mismatch"));
        assert!(Document::parse_strict(b"<a/><b/>").unwrap_err().contains("multiple root"));
        assert!(Document::parse_strict(b"<a>").unwrap_err().contains("Unclosed"));
        assert!(Document::parse_strict(b"<a x=\"1\" x=\"2\"/>").unwrap_err().contains("Duplicate"));
        assert!(Document::parse_strict(b"text<a/>").is_err());
        assert!(Document::parse_strict(b"").is_err());
        assert!(Document::parse_strict(b"<?xml version=\"1.0\"?>\n<a>ok</a>\n").is_ok());
    }

    #[test]
    fn test_lenient_recovers_from_mismatch() {
        let doc = Document::parse(b"<div><p>one<b>two</p>three</div>");
        let root = doc.root_element_id().unwrap();
        assert_eq!(names(&doc, root), vec!["p", "#three"]);
        assert_eq!(doc.text_of(root), "onetwothree");
    }

    #[test]
    fn test_processing_instruction_data() {
        let doc = Document::parse(b"<a><?php echo 1?><?bare?>x</a>");
        let a = doc.root_element_id().unwrap();
        let php = doc.first_child_of(a).unwrap();
        let bare = doc.next_sibling_of(php).unwrap();
        assert_eq!(doc.node_name(php), Some("php"));
        assert_eq!(doc.processing_instruction_data(php), Some("echo 1"));
        assert_eq!(doc.processing_instruction_data(bare), Some(""));
        assert_eq!(doc.processing_instruction_data(a), None);
        assert_eq!(doc.text_of(a), "x");
    }

    #[test]
    fn test_builder_api() {
        let mut doc = Document::new();
        let div = doc.append_element(DOCUMENT_NODE, "div");
        let p = doc.append_element(div, "p");
        doc.append_text(p, "hi");
        doc.append_cdata(div, "<raw>");
        let other = doc.create_element("aside");

        assert_eq!(doc.root_element_id(), Some(div));
        assert_eq!(doc.text_of(div), "hi<raw>");
        assert_eq!(doc.parent_of(other), None);
    }

    #[test]
    fn test_split_leaf_relinks_siblings() {
        let mut doc = Document::parse("<p>héllo<b/></p>".as_bytes());
        let p = doc.root_element_id().unwrap();
        let leaf = doc.first_child_of(p).unwrap();
        let b = doc.last_child_of(p).unwrap();

        let tail = doc.split_leaf(leaf, 2).unwrap();
        assert_eq!(doc.text_content(leaf), Some("hé"));
        assert_eq!(doc.text_content(tail), Some("llo"));
        assert_eq!(doc.text_len(leaf), 2);
        assert_eq!(doc.text_len(tail), 3);
        assert_eq!(doc.next_sibling_of(leaf), Some(tail));
        assert_eq!(doc.prev_sibling_of(tail), Some(leaf));
        assert_eq!(doc.next_sibling_of(tail), Some(b));
        assert_eq!(doc.prev_sibling_of(b), Some(tail));
        assert_eq!(doc.parent_of(tail), Some(p));
        assert_eq!(doc.text_of(p), "héllo");
    }

    #[test]
    fn test_split_last_leaf_updates_last_child() {
        let mut doc = Document::parse(b"<p>abc</p>");
        let p = doc.root_element_id().unwrap();
        let leaf = doc.first_child_of(p).unwrap();
        let tail = doc.split_leaf(leaf, 1).unwrap();
        assert_eq!(doc.last_child_of(p), Some(tail));
        assert_eq!(doc.child_count(p), 2);
    }

    #[test]
    fn test_split_leaf_errors() {
        let mut doc = Document::parse(b"<p>abc<!--c--></p>");
        let p = doc.root_element_id().unwrap();
        let leaf = doc.first_child_of(p).unwrap();
        let comment = doc.last_child_of(p).unwrap();

        assert_eq!(
            doc.split_leaf(leaf, 3),
            Err(RangeError::InvalidSplitOffset { offset: 3, length: 3 })
        );
        assert_eq!(
            doc.split_leaf(leaf, 0),
            Err(RangeError::InvalidSplitOffset { offset: 0, length: 3 })
        );
        assert_eq!(doc.split_leaf(p, 1), Err(RangeError::NotATextLeaf(p)));
        assert_eq!(doc.split_leaf(comment, 1), Err(RangeError::NotATextLeaf(comment)));
        assert_eq!(doc.split_leaf(999, 1), Err(RangeError::UnknownNode(999)));
    }

    #[test]
    fn test_lookup_path_native() {
        let doc = Document::parse(b"<div><p>a</p><p>b<em>c</em>d</p></div>");
        let root = doc.root_element_id().unwrap();
        let path: Path = "/p[2]/text()[2]".parse().unwrap();
        match doc.lookup_path(root, &path) {
            Lookup::Found(id) => assert_eq!(doc.text_content(id), Some("d")),
            other => panic!("expected Found, got {:?}", other),
        }

        let missing: Path = "/p[3]".parse().unwrap();
        assert_eq!(doc.lookup_path(root, &missing), Lookup::Missing);
        let unknown_tag: Path = "/table".parse().unwrap();
        assert_eq!(doc.lookup_path(root, &unknown_tag), Lookup::Missing);
        assert_eq!(doc.lookup_path(root, &Path::root()), Lookup::Found(root));
    }
}
