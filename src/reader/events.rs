//! Markup Event Types
//!
//! Event types for pull-parser style processing of a document.

use crate::core::attributes::Attribute;
use std::borrow::Cow;

/// Parsing event
#[derive(Debug, Clone, PartialEq)]
pub enum XmlEvent<'a> {
    /// Start of an element: <name attrs...>
    StartElement(StartElement<'a>),
    /// End of an element: </name>
    EndElement(&'a str),
    /// Empty element: <name attrs.../>
    EmptyElement(StartElement<'a>),
    /// Character data between tags, entities decoded
    Text(Cow<'a, str>),
    /// CDATA section content
    CData(&'a str),
    Comment(&'a str),
    /// Processing instruction: <?target data?>
    ProcessingInstruction { target: &'a str, data: &'a str },
    /// `<?xml ...?>`; only the version is kept
    XmlDeclaration { version: Option<Cow<'a, str>> },
    DocType(&'a str),
}

/// Start element event data
#[derive(Debug, Clone, PartialEq)]
pub struct StartElement<'a> {
    pub name: &'a str,
    pub attributes: Vec<Attribute<'a>>,
}

impl<'a> StartElement<'a> {
    pub fn new(name: &'a str, attributes: Vec<Attribute<'a>>) -> Self {
        StartElement { name, attributes }
    }
}
