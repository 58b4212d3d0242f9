//! Zero-Copy Slice Reader
//!
//! Pulls markup events out of a UTF-8 string slice. Names, comments and
//! CDATA borrow from the input; text only allocates when it contains
//! references to decode.

use super::events::{StartElement, XmlEvent};
use crate::core::attributes::{parse_attributes, parse_attributes_strict, Attribute};
use crate::core::entities::{decode_text, decode_text_strict};
use crate::core::scanner::{is_whitespace, Scanner};
use std::borrow::Cow;

/// Well-formedness error reported by a strict reader
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at byte {position}")]
pub struct ParseError {
    pub message: &'static str,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: &'static str, position: usize) -> Self {
        ParseError { message, position }
    }
}

/// Pull reader over a string slice
pub struct SliceReader<'a> {
    scanner: Scanner<'a>,
    strict: bool,
    error: Option<ParseError>,
}

impl<'a> SliceReader<'a> {
    /// Create a new slice reader (lenient mode)
    pub fn new(input: &'a str) -> Self {
        SliceReader {
            scanner: Scanner::new(input),
            strict: false,
            error: None,
        }
    }

    /// Create a new slice reader in strict mode
    pub fn new_strict(input: &'a str) -> Self {
        SliceReader {
            strict: true,
            ..SliceReader::new(input)
        }
    }

    /// First well-formedness error met (strict mode only)
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Get the next event; `None` at end of input or after a strict-mode error
    pub fn next_event(&mut self) -> Option<XmlEvent<'a>> {
        if self.error.is_some() || self.scanner.is_eof() {
            return None;
        }

        if self.scanner.peek() != Some(b'<') {
            return self.read_text();
        }

        let start = self.scanner.position();
        if self.scanner.starts_with("<!--") {
            match self.read_delimited(4, "-->") {
                Some(content) => Some(XmlEvent::Comment(content)),
                None => self.recover("Unterminated comment", start),
            }
        } else if self.scanner.starts_with("<![CDATA[") {
            match self.read_delimited(9, "]]>") {
                Some(content) => Some(XmlEvent::CData(content)),
                None => self.recover("Unterminated CDATA section", start),
            }
        } else if self.scanner.starts_with("<!") {
            self.read_doctype(start)
        } else if self.scanner.starts_with("<?") {
            self.read_processing_instruction(start)
        } else if self.scanner.starts_with("</") {
            self.read_end_tag(start)
        } else {
            self.read_start_tag(start)
        }
    }

    fn read_text(&mut self) -> Option<XmlEvent<'a>> {
        let start = self.scanner.position();
        let end = self.scanner.find_byte(b'<').unwrap_or(start + self.scanner.remaining().len());
        let raw = self.scanner.slice(start, end);
        self.scanner.set_position(end);

        if self.strict {
            match decode_text_strict(raw) {
                Ok(text) => Some(XmlEvent::Text(text)),
                Err(message) => self.fail(message, start),
            }
        } else {
            Some(XmlEvent::Text(decode_text(raw)))
        }
    }

    /// Read `<open ... close>` style constructs, returning the content between
    fn read_delimited(&mut self, open_len: usize, close: &str) -> Option<&'a str> {
        self.scanner.advance(open_len);
        let content_start = self.scanner.position();
        let end = self.scanner.find_sequence(close)?;
        self.scanner.set_position(end + close.len());
        Some(self.scanner.slice(content_start, end))
    }

    fn read_doctype(&mut self, start: usize) -> Option<XmlEvent<'a>> {
        match self.scanner.find_doctype_end() {
            Some(end) => {
                self.scanner.set_position(end + 1);
                Some(XmlEvent::DocType(self.scanner.slice(start, end + 1)))
            }
            None => self.recover("Unterminated markup declaration", start),
        }
    }

    fn read_processing_instruction(&mut self, start: usize) -> Option<XmlEvent<'a>> {
        self.scanner.advance(2);
        let Some(target) = self.scanner.read_name() else {
            return self.recover("Processing instruction target expected", start);
        };
        let Some(end) = self.scanner.find_sequence("?>") else {
            return self.recover("Unterminated processing instruction", start);
        };
        let data = self.scanner.slice(self.scanner.position(), end).trim_start();
        self.scanner.set_position(end + 2);

        if target.eq_ignore_ascii_case("xml") {
            let version = parse_attributes(data)
                .into_iter()
                .find(|a| a.name == "version")
                .map(|a| a.value);
            return Some(XmlEvent::XmlDeclaration { version });
        }
        Some(XmlEvent::ProcessingInstruction { target, data })
    }

    fn read_end_tag(&mut self, start: usize) -> Option<XmlEvent<'a>> {
        self.scanner.advance(2);
        let Some(name) = self.scanner.read_name() else {
            return self.recover("Element name expected", start);
        };
        self.scanner.skip_whitespace();
        if self.scanner.peek() != Some(b'>') {
            return self.recover("Expected '>' after end tag name", start);
        }
        self.scanner.advance(1);
        Some(XmlEvent::EndElement(name))
    }

    fn read_start_tag(&mut self, start: usize) -> Option<XmlEvent<'a>> {
        self.scanner.advance(1);
        let Some(name) = self.scanner.read_name() else {
            return self.recover("Element name expected", start);
        };
        let Some(end) = self.scanner.find_tag_end_quoted() else {
            return self.recover("Unterminated start tag", start);
        };

        let mut body = self.scanner.slice(self.scanner.position(), end);
        let empty = body.ends_with('/');
        if empty {
            body = &body[..body.len() - 1];
        }
        if self.strict && !body.is_empty() && !is_whitespace(body.as_bytes()[0]) {
            return self.fail("Whitespace required before attributes", start);
        }
        let attributes = match self.tag_attributes(body) {
            Ok(attrs) => attrs,
            Err(message) => return self.fail(message, start),
        };
        self.scanner.set_position(end + 1);

        let element = StartElement::new(name, attributes);
        Some(if empty {
            XmlEvent::EmptyElement(element)
        } else {
            XmlEvent::StartElement(element)
        })
    }

    fn tag_attributes(&self, body: &'a str) -> Result<Vec<Attribute<'a>>, &'static str> {
        if self.strict {
            parse_attributes_strict(body)
        } else {
            Ok(parse_attributes(body))
        }
    }

    /// Strict mode stops; lenient mode keeps the rest of the input as text
    fn recover(&mut self, message: &'static str, start: usize) -> Option<XmlEvent<'a>> {
        if self.strict {
            return self.fail(message, start);
        }
        self.scanner.set_position(start);
        let rest = self.scanner.remaining();
        self.scanner.advance(rest.len());
        Some(XmlEvent::Text(Cow::Borrowed(rest)))
    }

    fn fail(&mut self, message: &'static str, position: usize) -> Option<XmlEvent<'a>> {
        self.error = Some(ParseError::new(message, position));
        None
    }
}

impl<'a> Iterator for SliceReader<'a> {
    type Item = XmlEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_element() {
        let events: Vec<_> = SliceReader::new("<root>hello</root>").collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], XmlEvent::StartElement(e) if e.name == "root"));
        assert!(matches!(&events[1], XmlEvent::Text(t) if t == "hello"));
        assert_eq!(events[2], XmlEvent::EndElement("root"));
    }

    #[test]
    fn test_empty_element_with_attributes() {
        let events: Vec<_> = SliceReader::new("<br class=\"x\"/>").collect();
        assert_eq!(events.len(), 1);
        match &events[0] {
            XmlEvent::EmptyElement(e) => {
                assert_eq!(e.name, "br");
                assert_eq!(e.attributes.len(), 1);
                assert_eq!(e.attributes[0].name, "class");
                assert_eq!(e.attributes[0].value, "x");
            }
            other => panic!("expected EmptyElement, got {:?}", other),
        }
    }

    #[test]
    fn test_cdata_comment_and_pi() {
        let events: Vec<_> =
            SliceReader::new("<?xml version=\"1.0\"?><s><![CDATA[a<b]]><!-- c --><?php echo ?></s>").collect();
        assert!(matches!(&events[0], XmlEvent::XmlDeclaration { version: Some(v) } if v == "1.0"));
        assert_eq!(events[2], XmlEvent::CData("a<b"));
        assert_eq!(events[3], XmlEvent::Comment(" c "));
        assert_eq!(
            events[4],
            XmlEvent::ProcessingInstruction { target: "php", data: "echo " }
        );
    }

    #[test]
    fn test_doctype() {
        let events: Vec<_> = SliceReader::new("<!DOCTYPE html><html/>").collect();
        assert_eq!(events[0], XmlEvent::DocType("<!DOCTYPE html>"));
        assert!(matches!(&events[1], XmlEvent::EmptyElement(e) if e.name == "html"));
    }

    #[test]
    fn test_text_entities_decoded() {
        let events: Vec<_> = SliceReader::new("<p>a &amp; b</p>").collect();
        assert!(matches!(&events[1], XmlEvent::Text(t) if t == "a & b"));
    }

    #[test]
    fn test_lenient_unterminated_tag_becomes_text() {
        let events: Vec<_> = SliceReader::new("<p>x</p><broken").collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(&events[3], XmlEvent::Text(t) if t == "<broken"));
    }

    #[test]
    fn test_strict_reports_error() {
        let mut reader = SliceReader::new_strict("<p a=b>x</p>");
        assert!(reader.next_event().is_none());
        let err = reader.error().cloned();
        assert_eq!(err, Some(ParseError::new("Attribute value must be quoted", 0)));
    }
}
