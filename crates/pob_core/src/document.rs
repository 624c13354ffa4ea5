//! Minimal element tree over `quick-xml` events.
//!
//! Exported builds are small, so the whole document is materialised once and
//! the entity mapper walks it by element name.

use std::str::FromStr;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::core_api::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    encoding: String,
    root: Element,
}

impl Document {
    /// Parse XML bytes. The declaration must name its encoding; the reader
    /// decodes attribute values and text with it.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut encoding = None;
        let mut root = None;

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                Error::malformed_document(format!(
                    "XML error at byte {}: {e}",
                    reader.buffer_position()
                ))
            })?;
            match event {
                Event::Decl(decl) => {
                    if let Some(declared) = decl.encoding() {
                        let declared = declared.map_err(xml_error)?;
                        encoding = Some(String::from_utf8_lossy(&declared).into_owned());
                    }
                }
                Event::Start(start) => {
                    stack.push(element_from_start(&reader, &start)?);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&reader, &start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::malformed_document("unbalanced closing tag"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&text.unescape().map_err(xml_error)?);
                    }
                }
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        let decoded = reader.decoder().decode(&data).map_err(xml_error)?;
                        top.text.push_str(&decoded);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(Error::malformed_document(format!(
                "document ended inside <{}>",
                stack[stack.len() - 1].name
            )));
        }
        let encoding = encoding.ok_or_else(|| {
            Error::malformed_document("missing XML declaration with an encoding")
        })?;
        let root = root.ok_or_else(|| Error::malformed_document("document has no root element"))?;

        Ok(Self { encoding, root })
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn root(&self) -> &Element {
        &self.root
    }
}

fn xml_error(e: impl std::fmt::Display) -> Error {
    Error::malformed_document(format!("XML error: {e}"))
}

fn element_from_start(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<Element> {
    let decoder = reader.decoder();
    let qname = start.name();
    let name = decoder.decode(qname.as_ref()).map_err(xml_error)?;

    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(xml_error)?;
        let key = decoder.decode(attr.key.as_ref()).map_err(xml_error)?;
        let value = attr.decode_and_unescape_value(decoder).map_err(xml_error)?;
        attrs.push((key.into_owned(), value.into_owned()));
    }

    Ok(Element {
        name: name.into_owned(),
        attrs,
        text: String::new(),
        children: Vec::new(),
    })
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(Error::malformed_document(format!(
                "second root element <{}>",
                element.name
            )));
        }
    }
    Ok(())
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Direct text content, concatenated across child elements.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn elements(&self) -> &[Element] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Depth-first search below this element.
    pub fn descendants<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut out = Vec::new();
        collect_descendants(self, name, &mut out);
        out
    }

    pub fn require_child(&self, name: &str) -> Result<&Element> {
        self.child(name).ok_or_else(|| {
            Error::malformed_document(format!("<{}> has no <{name}> element", self.name))
        })
    }

    pub fn require_attr(&self, key: &str) -> Result<&str> {
        self.attr(key).ok_or_else(|| {
            Error::malformed_document(format!("<{}> is missing attribute {key:?}", self.name))
        })
    }

    /// `Ok(None)` when absent, an error when present but unparsable.
    pub fn parse_attr<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        self.attr(key)
            .map(|raw| {
                raw.trim().parse().map_err(|_| {
                    Error::malformed_document(format!(
                        "<{}> attribute {key}={raw:?} has an unexpected format",
                        self.name
                    ))
                })
            })
            .transpose()
    }

    pub fn require_parsed_attr<T: FromStr>(&self, key: &str) -> Result<T> {
        self.parse_attr(key)?.ok_or_else(|| {
            Error::malformed_document(format!("<{}> is missing attribute {key:?}", self.name))
        })
    }

    pub fn bool_attr(&self, key: &str) -> bool {
        self.attr(key) == Some("true")
    }

    pub fn text_trimmed(&self) -> &str {
        self.text.trim_matches(['\n', '\r', '\t', ' '])
    }
}

fn collect_descendants<'a>(element: &'a Element, name: &str, out: &mut Vec<&'a Element>) {
    for child in &element.children {
        if child.name == name {
            out.push(child);
        }
        collect_descendants(child, name, out);
    }
}
