//! Markup output
//!
//! Writes a subtree back out as XML. Split text leaves are written one
//! after the other, so re-parsing the output merges them again.

use super::document::Document;
use super::node::{NodeId, NodeKind};
use super::TreeAccess;

/// Serialize a node and its descendants
///
/// Iterative with an explicit stack so deep trees cannot overflow the
/// call stack.
pub fn to_markup(doc: &Document, node_id: NodeId) -> String {
    let mut buf = String::with_capacity(1024);

    enum Entry {
        Enter(NodeId),
        Close(NodeId),
    }

    let mut stack: Vec<Entry> = Vec::with_capacity(64);
    stack.push(Entry::Enter(node_id));

    while let Some(entry) = stack.pop() {
        let current = match entry {
            Entry::Close(id) => {
                if let Some(name) = doc.node_name(id) {
                    buf.push_str("</");
                    buf.push_str(name);
                    buf.push('>');
                }
                continue;
            }
            Entry::Enter(id) => id,
        };
        let Some(node) = doc.get_node(current) else {
            continue;
        };

        match node.kind {
            NodeKind::Document => push_children(doc, current, &mut stack, Entry::Enter),
            NodeKind::Element => {
                buf.push('<');
                buf.push_str(doc.node_name(current).unwrap_or_default());
                for attr in doc.attributes(current) {
                    buf.push(' ');
                    buf.push_str(doc.strings.get_str(attr.name_id).unwrap_or_default());
                    buf.push_str("=\"");
                    escape_into(doc.strings.get_str(attr.value_id).unwrap_or_default(), &mut buf);
                    buf.push('"');
                }
                if node.has_children() {
                    buf.push('>');
                    stack.push(Entry::Close(current));
                    push_children(doc, current, &mut stack, Entry::Enter);
                } else {
                    buf.push_str("/>");
                }
            }
            NodeKind::Text => escape_into(doc.text_content(current).unwrap_or_default(), &mut buf),
            NodeKind::CData => {
                buf.push_str("<![CDATA[");
                buf.push_str(doc.text_content(current).unwrap_or_default());
                buf.push_str("]]>");
            }
            NodeKind::Comment => {
                buf.push_str("<!--");
                buf.push_str(doc.text_content(current).unwrap_or_default());
                buf.push_str("-->");
            }
            NodeKind::ProcessingInstruction => {
                buf.push_str("<?");
                buf.push_str(doc.node_name(current).unwrap_or_default());
                let data = doc.processing_instruction_data(current).unwrap_or_default();
                if !data.is_empty() {
                    buf.push(' ');
                    buf.push_str(data);
                }
                buf.push_str("?>");
            }
        }
    }

    buf
}

/// Push children in reverse so they pop in document order
fn push_children<E>(doc: &Document, parent: NodeId, stack: &mut Vec<E>, enter: impl Fn(NodeId) -> E) {
    let mut child = doc.last_child_of(parent);
    while let Some(id) = child {
        stack.push(enter(id));
        child = doc.prev_sibling_of(id);
    }
}

#[inline]
fn escape_into(s: &str, buf: &mut String) {
    for c in s.chars() {
        match c {
            '&' => buf.push_str("&amp;"),
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            '"' => buf.push_str("&quot;"),
            _ => buf.push(c),
        }
    }
}
