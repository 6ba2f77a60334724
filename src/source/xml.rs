//! Minimal XML document model for type-options files
//!
//! Handles elements, attributes, character data, CDATA sections, comments,
//! processing instructions and the predefined and numeric entities. Namespace
//! prefixes are kept as part of the element name (`ds:column`).

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// A parsed XML element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<XmlElement>,
    /// Character data directly inside this element
    pub text: String,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// First direct child with the given name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All descendants with the given name, in document order
    pub fn descendants(&self, name: &str) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    pub fn first_descendant(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find_map(|c| {
            if c.name == name {
                Some(c)
            } else {
                c.first_descendant(name)
            }
        })
    }

    /// Text of this element followed by the text of its descendants
    pub fn text_content(&self) -> String {
        let mut text = self.text.clone();
        for child in &self.children {
            text.push_str(&child.text_content());
        }
        text
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_descendants(name, found);
        }
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Parse a document into its root element
pub fn parse_xml(xml: &str) -> Result<XmlElement> {
    let rest = skip_misc(xml.trim_start_matches('\u{feff}'))?;
    if !rest.starts_with('<') {
        return Err(Error::type_options("input does not appear to be XML"));
    }

    let (root, rest) = parse_element(rest)?;
    if !skip_misc(rest)?.is_empty() {
        return Err(Error::type_options("content after the root element"));
    }
    Ok(root)
}

/// Skip whitespace, comments, declarations and processing instructions
fn skip_misc(mut input: &str) -> Result<&str> {
    loop {
        input = input.trim_start();
        if input.starts_with("<?") {
            input = after(input, "?>")?;
        } else if input.starts_with("<!--") {
            input = after(input, "-->")?;
        } else if input.starts_with("<!DOCTYPE") {
            input = after(input, ">")?;
        } else {
            return Ok(input);
        }
    }
}

fn after<'a>(input: &'a str, terminator: &str) -> Result<&'a str> {
    input
        .find(terminator)
        .map(|pos| &input[pos + terminator.len()..])
        .ok_or_else(|| Error::type_options(format!("missing `{terminator}`")))
}

/// Parse the element at the start of `input`, returning it and the rest
fn parse_element(input: &str) -> Result<(XmlElement, &str)> {
    let body = input
        .strip_prefix('<')
        .ok_or_else(|| Error::type_options("expected opening tag"))?;
    let name_end = body
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .ok_or_else(|| Error::type_options("malformed tag"))?;
    if name_end == 0 {
        return Err(Error::type_options("element without a name"));
    }

    let mut element = XmlElement::new(&body[..name_end]);
    let mut rest = &body[name_end..];

    // Attributes
    loop {
        rest = rest.trim_start();
        if let Some(r) = rest.strip_prefix("/>") {
            return Ok((element, r));
        }
        if let Some(r) = rest.strip_prefix('>') {
            rest = r;
            break;
        }
        let (key, value, r) = parse_attribute(rest, &element.name)?;
        element.attributes.insert(key, value);
        rest = r;
    }

    // Content
    loop {
        if let Some(r) = rest.strip_prefix("</") {
            let end = r
                .find('>')
                .ok_or_else(|| Error::type_options("malformed closing tag"))?;
            let closing = r[..end].trim();
            if closing != element.name {
                return Err(Error::type_options(format!(
                    "expected </{}>, found </{closing}>",
                    element.name
                )));
            }
            return Ok((element, &r[end + 1..]));
        }

        if rest.starts_with("<!--") {
            rest = after(rest, "-->")?;
        } else if let Some(r) = rest.strip_prefix("<![CDATA[") {
            let end = r
                .find("]]>")
                .ok_or_else(|| Error::type_options("unterminated CDATA section"))?;
            element.text.push_str(&r[..end]);
            rest = &r[end + 3..];
        } else if rest.starts_with("<?") {
            rest = after(rest, "?>")?;
        } else if rest.starts_with('<') {
            let (child, r) = parse_element(rest)?;
            element.children.push(child);
            rest = r;
        } else if rest.is_empty() {
            return Err(Error::type_options(format!(
                "missing closing tag for {}",
                element.name
            )));
        } else {
            let end = rest.find('<').unwrap_or(rest.len());
            element.text.push_str(&unescape(&rest[..end])?);
            rest = &rest[end..];
        }
    }
}

fn parse_attribute<'a>(input: &'a str, element: &str) -> Result<(String, String, &'a str)> {
    let eq = input
        .find('=')
        .ok_or_else(|| Error::type_options(format!("malformed attribute in <{element}>")))?;
    let key = input[..eq].trim();
    let value_part = input[eq + 1..].trim_start();

    let quote = value_part
        .chars()
        .next()
        .filter(|c| *c == '"' || *c == '\'')
        .ok_or_else(|| Error::type_options(format!("unquoted attribute {key} in <{element}>")))?;
    let value_body = &value_part[1..];
    let end = value_body
        .find(quote)
        .ok_or_else(|| Error::type_options(format!("unterminated attribute {key} in <{element}>")))?;

    Ok((
        key.to_string(),
        unescape(&value_body[..end])?,
        &value_body[end + 1..],
    ))
}

/// Replace entity references with the characters they stand for
fn unescape(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let entity_end = rest[amp..]
            .find(';')
            .ok_or_else(|| Error::type_options("unterminated entity reference"))?;
        let entity = &rest[amp + 1..amp + entity_end];

        let c = match entity {
            "lt" => '<',
            "gt" => '>',
            "amp" => '&',
            "quot" => '"',
            "apos" => '\'',
            _ => entity
                .strip_prefix("#x")
                .map(|hex| u32::from_str_radix(hex, 16))
                .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                .and_then(|code| code.ok())
                .and_then(char::from_u32)
                .ok_or_else(|| Error::type_options(format!("unknown entity &{entity};")))?,
        };
        out.push(c);
        rest = &rest[amp + entity_end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
