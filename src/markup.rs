//! A minimal owned XML element tree on top of `quick-xml`.
//!
//! The codec never looks at raw XML events; it walks [`Element`]s. Text is
//! stored unescaped. Whitespace-only text between child elements ends up in
//! the parent's `text` and is ignored by container decoders.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::{BufRead, Write};

use crate::error::{Error, Result};
use crate::settings::FormattingOptions;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

/// An element being read, with its still-escaped text.
struct Frame {
    element: Element,
    raw_text: String,
}

fn utf8(bytes: &[u8], what: &str) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|_| Error::Xml(format!("invalid UTF-8 in {what}")))
}

fn start_frame(e: &BytesStart<'_>) -> Result<Frame> {
    let mut element = Element::new(utf8(e.name().as_ref(), "tag name")?);
    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
        let key = utf8(attr.key.as_ref(), "attribute name")?;
        let raw = utf8(&attr.value, "attribute value")?;
        let value = unescape(&raw).map_err(|e| Error::Xml(e.to_string()))?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(Frame {
        element,
        raw_text: String::new(),
    })
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Reads the document element from `source`.
    ///
    /// Declarations, doctypes, comments and processing instructions are skipped.
    /// Anything after the document element is not read.
    pub fn parse<R: BufRead>(source: R) -> Result<Element> {
        let mut reader = Reader::from_reader(source);
        let mut buf = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();

        loop {
            let finished = match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    stack.push(start_frame(e)?);
                    None
                }
                Event::Empty(ref e) => {
                    let element = start_frame(e)?.element;
                    match stack.last_mut() {
                        Some(parent) => {
                            parent.element.push(element);
                            None
                        }
                        None => Some(element),
                    }
                }
                Event::Text(ref t) => {
                    if let Some(frame) = stack.last_mut() {
                        frame.raw_text.push_str(&utf8(&t[..], "text")?);
                    }
                    None
                }
                Event::GeneralRef(ref r) => {
                    if let Some(frame) = stack.last_mut() {
                        frame.raw_text.push('&');
                        frame.raw_text.push_str(&utf8(&r[..], "entity reference")?);
                        frame.raw_text.push(';');
                    }
                    None
                }
                Event::CData(ref c) => {
                    if let Some(frame) = stack.last_mut() {
                        frame.raw_text.push_str(&escape(utf8(&c[..], "CDATA")?.as_str()));
                    }
                    None
                }
                Event::End(_) => match stack.pop() {
                    Some(frame) => {
                        let mut element = frame.element;
                        element.text = unescape(&frame.raw_text)
                            .map_err(|e| Error::Xml(e.to_string()))?
                            .into_owned();
                        match stack.last_mut() {
                            Some(parent) => {
                                parent.element.push(element);
                                None
                            }
                            None => Some(element),
                        }
                    }
                    None => return Err(Error::Xml("unexpected closing tag".to_owned())),
                },
                Event::Eof => {
                    return Err(Error::corrupted("document has no complete root element"));
                }
                _ => None,
            };
            if let Some(root) = finished {
                return Ok(root);
            }
            buf.clear();
        }
    }

    /// Writes this element as a complete document.
    pub fn write<W: Write>(&self, sink: W, formatting: &FormattingOptions) -> Result<()> {
        let mut writer = match formatting.indent {
            Some(indent) => Writer::new_with_indent(sink, indent.char, indent.size),
            None => Writer::new(sink),
        };
        if formatting.declaration {
            writer
                .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
                .map_err(|e| Error::Xml(e.to_string()))?;
        }
        self.write_into(&mut writer)
    }

    fn write_into<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        // Self-closing keeps empty strings empty when indentation is on.
        if self.children.is_empty() && self.text.is_empty() {
            return writer
                .write_event(Event::Empty(start))
                .map_err(|e| Error::Xml(e.to_string()));
        }

        writer
            .write_event(Event::Start(start))
            .map_err(|e| Error::Xml(e.to_string()))?;
        if !self.text.is_empty() {
            writer
                .write_event(Event::Text(BytesText::new(&self.text)))
                .map_err(|e| Error::Xml(e.to_string()))?;
        }
        for child in &self.children {
            child.write_into(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(|e| Error::Xml(e.to_string()))
    }
}
