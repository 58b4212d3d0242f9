//! Node representation
//!
//! Uses NodeId (u32) for compact, cache-friendly node references.

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// Type of node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Document root
    Document,
    Element,
    Text,
    /// CDATA section
    CData,
    Comment,
    ProcessingInstruction,
}

impl NodeKind {
    /// Text and CDATA nodes: the leaves whose characters a range counts
    #[inline]
    pub fn is_text_leaf(self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::CData)
    }

    /// Nodes whose boundary offsets count children rather than characters
    #[inline]
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Document | NodeKind::Element)
    }

    /// Nodes that carry their own character data
    #[inline]
    pub fn has_character_data(self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::CData | NodeKind::Comment)
    }
}

/// A node in the arena
#[derive(Debug, Clone)]
pub struct XmlNode {
    pub kind: NodeKind,
    /// Parent node (None for the document node and detached nodes)
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    /// String pool id: tag name (elements), target (PIs) or character data
    pub name_id: u32,
    /// Length of the character data in chars, cached at creation and on split
    pub char_len: u32,
    /// Start of attributes in the attribute arena (for elements)
    pub attr_start: u32,
    pub attr_count: u16,
    /// String pool id of a processing instruction's data
    pub data_id: u32,
}

impl XmlNode {
    fn new(kind: NodeKind, name_id: u32, parent: Option<NodeId>) -> Self {
        XmlNode {
            kind,
            parent,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            name_id,
            char_len: 0,
            attr_start: 0,
            attr_count: 0,
            data_id: 0,
        }
    }

    /// Create a new document root node
    pub fn document() -> Self {
        Self::new(NodeKind::Document, 0, None)
    }

    pub fn element(name_id: u32, parent: Option<NodeId>) -> Self {
        Self::new(NodeKind::Element, name_id, parent)
    }

    /// Create a character data node (text, CDATA or comment)
    pub fn character_data(kind: NodeKind, content_id: u32, char_len: usize, parent: Option<NodeId>) -> Self {
        debug_assert!(kind.has_character_data());
        XmlNode {
            char_len: char_len as u32,
            ..Self::new(kind, content_id, parent)
        }
    }

    pub fn processing_instruction(target_id: u32, data_id: u32, parent: Option<NodeId>) -> Self {
        XmlNode {
            data_id,
            ..Self::new(NodeKind::ProcessingInstruction, target_id, parent)
        }
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }
}

/// Stored attribute
#[derive(Debug, Clone, Copy)]
pub struct XmlAttribute {
    pub name_id: u32,
    pub value_id: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let doc = XmlNode::document();
        assert_eq!(doc.kind, NodeKind::Document);
        assert!(doc.parent.is_none());
        assert!(!doc.has_children());
    }

    #[test]
    fn test_character_data_node() {
        let text = XmlNode::character_data(NodeKind::Text, 4, 12, Some(1));
        assert_eq!(text.kind, NodeKind::Text);
        assert_eq!(text.parent, Some(1));
        assert_eq!(text.char_len, 12);
        assert!(!text.is_element());
    }

    #[test]
    fn test_processing_instruction_keeps_data() {
        let pi = XmlNode::processing_instruction(3, 7, Some(1));
        assert_eq!(pi.kind, NodeKind::ProcessingInstruction);
        assert_eq!(pi.name_id, 3);
        assert_eq!(pi.data_id, 7);
        assert_eq!(XmlNode::element(3, None).data_id, 0);
    }

    #[test]
    fn test_kind_classes() {
        assert!(NodeKind::CData.is_text_leaf());
        assert!(!NodeKind::Comment.is_text_leaf());
        assert!(NodeKind::Comment.has_character_data());
        assert!(NodeKind::Document.is_container());
        assert!(!NodeKind::ProcessingInstruction.is_container());
    }
}
