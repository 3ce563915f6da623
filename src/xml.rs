//! Attributed, order-preserving XML tree.
//!
//! The rest of the crate never touches `quick-xml` events directly: documents are
//! read into an [`XmlElement`] tree once, and the re-encoder builds the same tree
//! type before serializing it. Repeated child tags are always reached through
//! [`XmlElement::children_named`], which yields an ordered list whether the
//! source held one such child or many.

use std::io::{self, Cursor};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::{debug, warn};

use crate::error::{GmlError, Result};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    /// Qualified tag name as written in the source, e.g. `gml:Point`.
    pub name: String,
    /// Attributes in source order, namespace declarations included.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    /// Concatenated text and CDATA content.
    pub text: String,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Reads a whole document and returns its root element.
    pub fn parse(xml: &str) -> Result<XmlElement> {
        debug!("Reading XML document of {} bytes", xml.len());
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(Self::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Self::from_start(&start)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element);
                    }
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::Eof => break,
                _ => (),
            }
        }

        if let Some(open) = stack.last() {
            return Err(GmlError::MissingElement(format!(
                "closing tag for <{}>",
                open.name
            )));
        }
        root.ok_or_else(|| GmlError::MissingElement("document root element".to_string()))
    }

    fn from_start(start: &BytesStart) -> Result<XmlElement> {
        let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Trimmed text content.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Looks an attribute up by local name, ignoring any prefix
    /// (`gml:id` matches `id`). Namespace declarations are never matched.
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .filter(|(key, _)| !is_namespace_declaration(key))
            .find(|(key, _)| local_name(key) == local)
            .map(|(_, value)| value.as_str())
    }

    /// True when any attribute other than a namespace declaration is present.
    pub fn has_attributes(&self) -> bool {
        self.attributes
            .iter()
            .any(|(key, _)| !is_namespace_declaration(key))
    }

    /// Child elements only, in document order.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter()
    }

    /// All children with the given local name, as an ordered list.
    pub fn children_named(&self, local: &str) -> Vec<&XmlElement> {
        self.children
            .iter()
            .filter(|child| child.local_name() == local)
            .collect()
    }

    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.local_name() == local)
    }

    /// First child whose local name is any of `locals`.
    pub fn child_in(&self, locals: &[&str]) -> Option<&XmlElement> {
        self.children
            .iter()
            .find(|child| locals.contains(&child.local_name()))
    }

    /// `(prefix, uri)` pairs declared on this element; the default
    /// namespace has no prefix.
    pub fn namespace_declarations(&self) -> impl Iterator<Item = (Option<&str>, &str)> {
        self.attributes.iter().filter_map(|(key, value)| {
            if key == "xmlns" {
                Some((None, value.as_str()))
            } else {
                key.strip_prefix("xmlns:")
                    .map(|prefix| (Some(prefix), value.as_str()))
            }
        })
    }

    pub fn declared_namespace(&self, prefix: Option<&str>) -> Option<&str> {
        self.namespace_declarations()
            .find(|(declared, _)| *declared == prefix)
            .map(|(_, uri)| uri)
    }

    pub fn to_xml(&self, pretty: bool) -> Result<String> {
        let mut writer = if pretty {
            Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2)
        } else {
            Writer::new(Cursor::new(Vec::new()))
        };
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.write_to(&mut writer)?;

        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| GmlError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    fn write_to<W: io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        let text = self.text();
        if self.children.is_empty() && text.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if !text.is_empty() {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write_to(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

/// Resolves `prefix` against the declarations of `scope`, innermost last.
pub fn resolve_namespace<'a>(prefix: Option<&str>, scope: &[&'a XmlElement]) -> Option<&'a str> {
    scope
        .iter()
        .rev()
        .find_map(|element| element.declared_namespace(prefix))
}

pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

fn is_namespace_declaration(key: &str) -> bool {
    key == "xmlns" || key.starts_with("xmlns:")
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    } else {
        warn!("Ignoring additional top-level element <{}>", element.name);
    }
}
