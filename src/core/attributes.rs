//! Attribute Parsing
//!
//! Parses the attribute list of a start tag. Values are entity decoded.

use super::entities::{decode_text, decode_text_strict};
use super::scanner::{is_name_char, is_name_start_char, is_whitespace};
use std::borrow::Cow;

/// A parsed attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub name: &'a str,
    pub value: Cow<'a, str>,
}

/// Parse attributes from raw tag content (after the element name)
///
/// Malformed pieces are skipped; valueless attributes get an empty value.
pub fn parse_attributes(input: &str) -> Vec<Attribute<'_>> {
    let mut attrs = Vec::new();
    // Lenient mode never reports errors.
    let _ = parse_into(input, false, &mut attrs);
    attrs
}

/// Parse attributes, rejecting anything that is not well-formed XML
pub fn parse_attributes_strict(input: &str) -> Result<Vec<Attribute<'_>>, &'static str> {
    let mut attrs = Vec::new();
    parse_into(input, true, &mut attrs)?;
    Ok(attrs)
}

fn parse_into<'a>(input: &'a str, strict: bool, attrs: &mut Vec<Attribute<'a>>) -> Result<(), &'static str> {
    let bytes = input.as_bytes();
    let mut pos = 0;

    loop {
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }
        if pos >= bytes.len() {
            return Ok(());
        }

        if !is_name_start_char(bytes[pos]) {
            if strict {
                return Err("Attribute name must start with letter, underscore, or colon");
            }
            pos += 1;
            continue;
        }

        let name_start = pos;
        while pos < bytes.len() && is_name_char(bytes[pos]) {
            pos += 1;
        }
        let name = &input[name_start..pos];

        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }
        if pos >= bytes.len() || bytes[pos] != b'=' {
            if strict {
                return Err("Attribute value required");
            }
            attrs.push(Attribute { name, value: Cow::Borrowed("") });
            continue;
        }
        pos += 1;
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }

        let quote = bytes.get(pos).copied();
        let (raw, next) = match quote {
            Some(q @ (b'"' | b'\'')) => {
                let value_start = pos + 1;
                match memchr::memchr(q, &bytes[value_start..]) {
                    Some(len) => (&input[value_start..value_start + len], value_start + len + 1),
                    None if strict => return Err("Attribute value has mismatched quotes"),
                    None => (&input[value_start..], bytes.len()),
                }
            }
            _ if strict => return Err("Attribute value must be quoted"),
            _ => {
                let value_start = pos;
                while pos < bytes.len() && !is_whitespace(bytes[pos]) {
                    pos += 1;
                }
                (&input[value_start..pos], pos)
            }
        };
        pos = next;

        let value = if strict {
            if raw.contains('<') {
                return Err("Attribute value cannot contain '<'");
            }
            decode_text_strict(raw)?
        } else {
            decode_text(raw)
        };
        attrs.push(Attribute { name, value });
    }
}
