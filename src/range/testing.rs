//! Shared fixtures and generators for the range tests

use super::boundary::{Boundary, Range};
use super::path::resolve;
use super::walk::{compare_points, node_length, subtree};
use crate::dom::{Document, NodeId, NodeKind, TreeAccess};
use proptest::prelude::*;
use std::cmp::Ordering;

/// Paths in tests are relative to the outer `div`
pub const FIXTURE: &str = concat!(
    "<div>",
    "<p><strong>Pellentesque habitant morbi tristique</strong> senectus et netus et malesuada fames ac turpis egestas. ",
    "<em>Aenean ultricies mi vitae est.</em> Mauris placerat eleifend leo.</p>",
    "<p>Lorem sed do eiusmod tempor.<br/></p>",
    "<h2>Level 2</h2>",
    "<ol><li>Lorem ipsum</li></ol>",
    "<div>Lorem ipsum<br/><br/>Lorem sed do eiusmod tempor.<br/><br/><br/></div>",
    "<div>Lorem ipsum<br/><p><br/></p>Lorem sed do eiusmod tempor.<br/><p><br/></p><br/></div>",
    "<p>Final words.</p>",
    "</div>"
);

/// Boundary at `offset` inside the node `path` names
pub fn boundary_at(doc: &Document, root: NodeId, path: &str, offset: usize) -> Boundary {
    let node = resolve(doc, &path.parse().unwrap(), root).unwrap_or_else(|| panic!("no node at {}", path));
    Boundary::new(node, offset)
}

/// A tree without a native path lookup
pub struct ScanOnly<'a>(pub &'a Document);

impl TreeAccess for ScanOnly<'_> {
    fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.0.kind(id)
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.0.parent_of(id)
    }

    fn first_child_of(&self, id: NodeId) -> Option<NodeId> {
        self.0.first_child_of(id)
    }

    fn last_child_of(&self, id: NodeId) -> Option<NodeId> {
        self.0.last_child_of(id)
    }

    fn next_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        self.0.next_sibling_of(id)
    }

    fn prev_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        self.0.prev_sibling_of(id)
    }

    fn node_name(&self, id: NodeId) -> Option<&str> {
        self.0.node_name(id)
    }

    fn text_content(&self, id: NodeId) -> Option<&str> {
        self.0.text_content(id)
    }
}

#[derive(Debug, Clone)]
enum Shape {
    Text(String),
    Element(&'static str, Vec<Shape>),
}

const TAGS: &[&str] = &["p", "em", "div", "span"];

fn arb_shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        3 => "[a-z ]{1,8}".prop_map(Shape::Text),
        1 => prop::sample::select(TAGS).prop_map(|tag| Shape::Element(tag, Vec::new())),
    ];
    leaf.prop_recursive(4, 48, 5, |inner| {
        (prop::sample::select(TAGS), prop::collection::vec(inner, 0..5))
            .prop_map(|(tag, children)| Shape::Element(tag, children))
    })
}

fn build(doc: &mut Document, parent: NodeId, shape: &Shape) {
    match shape {
        Shape::Text(text) => {
            doc.append_text(parent, text);
        }
        Shape::Element(tag, children) => {
            let id = doc.append_element(parent, tag);
            for child in children {
                build(doc, id, child);
            }
        }
    }
}

/// Random element and text trees, with every node under the root element
pub fn arb_document() -> impl Strategy<Value = (Document, Vec<NodeId>)> {
    prop::collection::vec(arb_shape(), 0..6).prop_map(|shapes| {
        let mut doc = Document::new();
        let root = doc.append_element(doc.document_node_id(), "div");
        for shape in &shapes {
            build(&mut doc, root, shape);
        }
        let nodes = subtree(&doc, root).collect();
        (doc, nodes)
    })
}

/// Random document with an ordered range between two arbitrary points
pub fn arb_ranged_document() -> impl Strategy<Value = (Document, Range)> {
    (
        arb_document(),
        any::<prop::sample::Index>(),
        any::<prop::sample::Index>(),
        any::<prop::sample::Index>(),
        any::<prop::sample::Index>(),
    )
        .prop_map(|((doc, nodes), a, a_offset, b, b_offset)| {
            let point = |node: prop::sample::Index, offset: prop::sample::Index| {
                let container = nodes[node.index(nodes.len())];
                Boundary::new(container, offset.index(node_length(&doc, container) + 1))
            };
            let (start, end) = (point(a, a_offset), point(b, b_offset));
            let range = match compare_points(&doc, start, end) {
                Some(Ordering::Greater) => Range::new(end, start),
                _ => Range::new(start, end),
            };
            (doc, range)
        })
}
