//! Structural Paths
//!
//! A path names a node relative to a root by the chain of steps leading
//! down to it, each step a node name plus a 1-based ordinal among
//! same-named siblings:
//!
//! ```text
//! /p[1]/strong[1]/text()[2]
//! ```
//!
//! Grammar accepted by [`Path::from_str`]:
//!
//! ```text
//! path  := "" | "." | "/" | ("."? ("/" step)+)
//! step  := "." | name ("[" ordinal "]")?
//! name  := xml-name | "text()" | "cdata-section()" | "comment()"
//!        | "processing-instruction()"
//! ```
//!
//! A missing ordinal means 1 and `.` steps are skipped. Formatting always
//! prints explicit ordinals, so `Path::to_string` is canonical.

use crate::core::scanner::is_name;
use crate::dom::{children, Lookup, NodeId, NodeKind, TreeAccess};
use crate::error::RangeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// Effective name of a node as used in a path step
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StepName {
    /// Element tag name, compared case-sensitively
    Element(String),
    Text,
    CData,
    Comment,
    ProcessingInstruction,
}

impl StepName {
    /// Name a node answers to, `None` for the document node and unknown ids
    pub fn of<T: TreeAccess + ?Sized>(tree: &T, node: NodeId) -> Option<StepName> {
        Some(match tree.kind(node)? {
            NodeKind::Element => StepName::Element(tree.node_name(node)?.to_string()),
            NodeKind::Text => StepName::Text,
            NodeKind::CData => StepName::CData,
            NodeKind::Comment => StepName::Comment,
            NodeKind::ProcessingInstruction => StepName::ProcessingInstruction,
            NodeKind::Document => return None,
        })
    }

    /// Whether `node` answers to this name
    pub fn matches<T: TreeAccess + ?Sized>(&self, tree: &T, node: NodeId) -> bool {
        match (self, tree.kind(node)) {
            (StepName::Element(name), Some(NodeKind::Element)) => tree.node_name(node) == Some(name.as_str()),
            (StepName::Text, Some(NodeKind::Text)) => true,
            (StepName::CData, Some(NodeKind::CData)) => true,
            (StepName::Comment, Some(NodeKind::Comment)) => true,
            (StepName::ProcessingInstruction, Some(NodeKind::ProcessingInstruction)) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StepName::Element(name) => name,
            StepName::Text => "text()",
            StepName::CData => "cdata-section()",
            StepName::Comment => "comment()",
            StepName::ProcessingInstruction => "processing-instruction()",
        }
    }

    fn parse(name: &str) -> Option<StepName> {
        Some(match name {
            "text()" => StepName::Text,
            "cdata-section()" => StepName::CData,
            "comment()" => StepName::Comment,
            "processing-instruction()" => StepName::ProcessingInstruction,
            _ if is_name(name) => StepName::Element(name.to_string()),
            _ => return None,
        })
    }
}

/// One step of a path: a name and a 1-based ordinal among same-named siblings
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Step {
    name: StepName,
    position: u32,
}

impl Step {
    /// Ordinal 0 is raised to 1
    pub fn new(name: StepName, position: u32) -> Self {
        Step {
            name,
            position: position.max(1),
        }
    }

    pub fn name(&self) -> &StepName {
        &self.name
    }

    pub fn position(&self) -> u32 {
        self.position
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name.as_str(), self.position)
    }
}

/// A structural path; empty when it names the root itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    /// The empty path, naming the root
    pub fn root() -> Self {
        Path::default()
    }

    pub fn from_steps(steps: Vec<Step>) -> Self {
        Path { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Extend the path by one step
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Path of the parent, `None` for the empty path
    pub fn parent(&self) -> Option<Path> {
        let (_, rest) = self.steps.split_last()?;
        Some(Path { steps: rest.to_vec() })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "/{}", step)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = RangeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &'static str| RangeError::MalformedPath {
            path: input.to_string(),
            reason,
        };

        let trimmed = input.trim();
        let body = match trimmed {
            "" | "." | "/" => return Ok(Path::root()),
            _ => match trimmed.strip_prefix('.') {
                Some(rest) => rest,
                None => trimmed,
            },
        };
        let Some(body) = body.strip_prefix('/') else {
            return Err(malformed("path must start with '/'"));
        };

        let mut steps = Vec::new();
        for segment in body.split('/') {
            match segment {
                "." => continue,
                "" => return Err(malformed("empty step")),
                _ => steps.push(parse_step(segment).map_err(malformed)?),
            }
        }
        Ok(Path { steps })
    }
}

fn parse_step(segment: &str) -> Result<Step, &'static str> {
    let (name, position) = match segment.find('[') {
        Some(open) => {
            let ordinal = segment[open + 1..]
                .strip_suffix(']')
                .ok_or("unterminated ordinal")?;
            let position: u32 = ordinal.parse().map_err(|_| "ordinal is not a positive integer")?;
            if position == 0 {
                return Err("ordinals start at 1");
            }
            (&segment[..open], position)
        }
        None => (segment, 1),
    };
    let name = StepName::parse(name).ok_or("invalid step name")?;
    Ok(Step { name, position })
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Path from `root` down to `node`
///
/// Fails with [`RangeError::NodeNotInRoot`] when `node` is not `root` or one
/// of its descendants.
pub fn path_of<T: TreeAccess + ?Sized>(tree: &T, node: NodeId, root: NodeId) -> Result<Path, RangeError> {
    if tree.kind(node).is_none() {
        return Err(RangeError::UnknownNode(node));
    }

    let mut steps = Vec::new();
    let mut current = node;
    while current != root {
        let parent = tree.parent_of(current).ok_or(RangeError::NodeNotInRoot)?;
        let name = StepName::of(tree, current).ok_or(RangeError::NodeNotInRoot)?;
        let position = ordinal(tree, current, &name);
        steps.push(Step { name, position });
        current = parent;
    }
    steps.reverse();
    Ok(Path { steps })
}

/// 1 + number of preceding siblings that answer to the same name
fn ordinal<T: TreeAccess + ?Sized>(tree: &T, node: NodeId, name: &StepName) -> u32 {
    let mut position = 1;
    let mut sibling = tree.prev_sibling_of(node);
    while let Some(id) = sibling {
        if name.matches(tree, id) {
            position += 1;
        }
        sibling = tree.prev_sibling_of(id);
    }
    position
}

/// Resolve a path under `root`
///
/// Uses the host's native lookup when it has one and the structural scan
/// otherwise. Both must agree; debug builds check that they do.
pub fn resolve<T: TreeAccess + ?Sized>(tree: &T, path: &Path, root: NodeId) -> Option<NodeId> {
    let resolved = match tree.lookup_path(root, path) {
        Lookup::Found(node) => Some(node),
        Lookup::Missing => None,
        Lookup::Unsupported => return resolve_scan(tree, path, root),
    };
    debug_assert_eq!(resolved, resolve_scan(tree, path, root), "native lookup disagrees for {}", path);
    trace!(%path, root, ?resolved, "resolved path");
    resolved
}

/// Resolve a path by walking children step by step
pub fn resolve_scan<T: TreeAccess + ?Sized>(tree: &T, path: &Path, root: NodeId) -> Option<NodeId> {
    tree.kind(root)?;
    let mut current = root;
    for step in &path.steps {
        current = children(tree, current)
            .filter(|&child| step.name.matches(tree, child))
            .nth(step.position.checked_sub(1)? as usize)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, TreeAccess};
    use crate::range::testing::{arb_document, ScanOnly};
    use crate::range::walk::subtree;
    use proptest::prelude::*;
    use rstest::rstest;

    const PAGE: &[u8] = b"<html><body><div><p>Hello</p><ol><li>one</li><li>two<span>x</span><!--c--><span>y</span></li></ol></div></body></html>";

    fn find(doc: &Document, path: &str) -> NodeId {
        let root = doc.document_node_id();
        resolve(doc, &path.parse().unwrap(), root).unwrap()
    }

    #[test]
    fn test_path_of_from_document() {
        let doc = Document::parse(PAGE);
        let p = find(&doc, "/html/body/div/p");
        let path = path_of(&doc, p, doc.document_node_id()).unwrap();
        assert_eq!(path.to_string(), "/html[1]/body[1]/div[1]/p[1]");
    }

    #[test]
    fn test_path_of_relative_root() {
        let doc = Document::parse(PAGE);
        let ol = find(&doc, "/html/body/div/ol");
        let span = find(&doc, "/html/body/div/ol/li[2]/span");
        assert_eq!(path_of(&doc, span, ol).unwrap().to_string(), "/li[2]/span[1]");

        let second = find(&doc, "/html/body/div/ol/li[2]/span[2]");
        assert_eq!(path_of(&doc, second, ol).unwrap().to_string(), "/li[2]/span[2]");
    }

    #[test]
    fn test_path_of_sentinels() {
        let doc = Document::parse(PAGE);
        let ol = find(&doc, "/html/body/div/ol");
        let comment = find(&doc, "/html/body/div/ol/li[2]/comment()");
        let text = find(&doc, "/html/body/div/ol/li[2]/text()");
        assert_eq!(doc.kind(comment), Some(NodeKind::Comment));
        assert_eq!(path_of(&doc, comment, ol).unwrap().to_string(), "/li[2]/comment()[1]");
        assert_eq!(path_of(&doc, text, ol).unwrap().to_string(), "/li[2]/text()[1]");
    }

    #[test]
    fn test_path_of_root_is_empty() {
        let doc = Document::parse(PAGE);
        let ol = find(&doc, "/html/body/div/ol");
        let path = path_of(&doc, ol, ol).unwrap();
        assert!(path.is_empty());
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn test_path_of_outside_root() {
        let doc = Document::parse(PAGE);
        let ol = find(&doc, "/html/body/div/ol");
        let p = find(&doc, "/html/body/div/p");
        assert_eq!(path_of(&doc, p, ol), Err(RangeError::NodeNotInRoot));
        assert_eq!(path_of(&doc, 999, ol), Err(RangeError::UnknownNode(999)));
    }

    #[test]
    fn test_resolve_failures() {
        let doc = Document::parse(PAGE);
        let root = doc.document_node_id();
        for raw in ["/html/body/div/p[2]", "/html/head", "/html/body/div/ol/li[2]/span[3]"] {
            let path: Path = raw.parse().unwrap();
            assert_eq!(resolve(&doc, &path, root), None, "{}", raw);
        }
        assert_eq!(resolve(&doc, &Path::root(), 999), None);
    }

    #[rstest]
    #[case("", "")]
    #[case("/", "")]
    #[case(".", "")]
    #[case("/p", "/p[1]")]
    #[case("./p/strong", "/p[1]/strong[1]")]
    #[case("/p[2]/./text()[3]", "/p[2]/text()[3]")]
    #[case("  /div[10]/cdata-section()  ", "/div[10]/cdata-section()[1]")]
    #[case("/svg:rect/processing-instruction()[2]", "/svg:rect[1]/processing-instruction()[2]")]
    fn test_parse_canonical(#[case] raw: &str, #[case] canonical: &str) {
        let path: Path = raw.parse().unwrap();
        assert_eq!(path.to_string(), canonical);
    }

    #[rstest]
    #[case("p", "path must start with '/'")]
    #[case("//p", "empty step")]
    #[case("/p/", "empty step")]
    #[case("/p[0]", "ordinals start at 1")]
    #[case("/p[x]", "ordinal is not a positive integer")]
    #[case("/p[1", "unterminated ordinal")]
    #[case("/text(", "invalid step name")]
    #[case("/@id", "invalid step name")]
    fn test_parse_errors(#[case] raw: &str, #[case] reason: &'static str) {
        assert_eq!(
            raw.parse::<Path>(),
            Err(RangeError::MalformedPath {
                path: raw.to_string(),
                reason
            })
        );
    }

    #[test]
    fn test_step_new_and_parent() {
        let step = Step::new(StepName::Element("p".into()), 0);
        assert_eq!(step.position(), 1);
        let path = Path::from_steps(vec![step, Step::new(StepName::Text, 2)]);
        assert_eq!(path.len(), 2);
        assert_eq!(path.parent().map(|p| p.to_string()), Some("/p[1]".to_string()));
        assert_eq!(Path::root().parent(), None);
    }

    #[test]
    fn test_serde_as_string() {
        let path: Path = "/p/strong".parse().unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"/p[1]/strong[1]\"");
        let back: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
        assert!(serde_json::from_str::<Path>("\"p[\"").is_err());
    }

    #[test]
    fn test_scan_fallback_matches_native() {
        let doc = Document::parse(PAGE);
        let scan_only = ScanOnly(&doc);
        let root = doc.document_node_id();
        for node in subtree(&doc, root).skip(1) {
            let path = path_of(&doc, node, root).unwrap();
            assert_eq!(resolve(&scan_only, &path, root), Some(node));
            assert_eq!(resolve(&doc, &path, root), Some(node));
        }
    }

    proptest! {
        #[test]
        fn prop_path_round_trip((doc, _) in arb_document()) {
            let root = doc.root_element_id().unwrap();
            for node in subtree(&doc, root) {
                let path = path_of(&doc, node, root).unwrap();
                let reparsed: Path = path.to_string().parse().unwrap();
                prop_assert_eq!(&reparsed, &path);
                prop_assert_eq!(resolve(&doc, &path, root), Some(node));
                prop_assert_eq!(resolve_scan(&ScanOnly(&doc), &path, root), Some(node));
            }
        }
    }
}
