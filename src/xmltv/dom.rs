//! Minimal owned XML element tree for XMLTV documents.
//!
//! EPG feeds must be copied element-for-element into the merged output,
//! including attributes and child elements we never inspect (icons,
//! descriptions, ratings). A small owned tree keeps that copy lossless
//! without pulling in a full DOM library: `quick-xml` events in,
//! `quick-xml` events out.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

/// Errors from parsing or serializing an XML document.
#[derive(Debug, Error)]
pub enum DomError {
    /// XML parsing failed (malformed markup, bad attribute, encoding issue).
    #[error("XML parse error: {0}")]
    Parse(String),

    /// The document contained no root element.
    #[error("document has no root element")]
    NoRoot,

    /// Event serialization failed.
    #[error("XML write error: {0}")]
    Serialize(String),
}

/// A child of an [`Element`]: either a nested element or a text run.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An owned XML element: tag name, attributes in document order, children
/// in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an empty element with the given tag name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Returns the value of the named attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the first child element with the given tag name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    /// Mutable variant of [`Element::child`].
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    /// Returns this element's own text content, if it has any.
    ///
    /// Only the first text run counts; an element whose children are all
    /// nested elements (or that has no children) yields `None`.
    pub fn text(&self) -> Option<&str> {
        self.children.iter().find_map(|node| match node {
            Node::Text(t) => Some(t.as_str()),
            _ => None,
        })
    }

    /// Looks up the text of a named child element, distinguishing
    /// "element absent" (`None`) from "element present with empty text"
    /// (`Some("")`). Callers that need a fallback value must only apply it
    /// in the `None` case.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|el| el.text().unwrap_or(""))
    }

    /// Replaces this element's children with a single text run.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }
}

/// Parses a complete XML document into its root element.
///
/// Whitespace-only text between elements is dropped; text inside elements
/// is unescaped. A document with no top-level element is an error, as is
/// any malformed markup.
pub fn parse_document(bytes: &[u8]) -> Result<Element, DomError> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let el = element_from_start(&e, &reader)?;
                stack.push(el);
            }
            Ok(Event::Empty(e)) => {
                let el = element_from_start(&e, &reader)?;
                attach(&mut stack, &mut root, el)?;
            }
            Ok(Event::End(_)) => {
                let el = stack.pop().ok_or_else(|| {
                    DomError::Parse("unexpected closing tag".to_string())
                })?;
                attach(&mut stack, &mut root, el)?;
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| DomError::Parse(e.to_string()))?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(text.into_owned()));
                }
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(text));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DomError::Parse(e.to_string())),
            // Declaration, comments, processing instructions, doctype
            Ok(_) => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(DomError::Parse("unclosed element at end of input".to_string()));
    }
    root.ok_or(DomError::NoRoot)
}

fn element_from_start(
    e: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
) -> Result<Element, DomError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut el = Element::new(name);

    for attr in e.attributes() {
        let attr = attr.map_err(|e| DomError::Parse(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|e| DomError::Parse(e.to_string()))?
            .into_owned();
        el.attrs.push((key, value));
    }
    Ok(el)
}

fn attach(
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
    el: Element,
) -> Result<(), DomError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(el)),
        None => {
            if root.is_some() {
                return Err(DomError::Parse(
                    "multiple top-level elements".to_string(),
                ));
            }
            *root = Some(el);
        }
    }
    Ok(())
}

/// Serializes a document to UTF-8 bytes with an XML declaration.
pub fn write_document(root: &Element) -> Result<Vec<u8>, DomError> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(|e| DomError::Serialize(e.to_string()))?;
    write_element(&mut writer, root)?;
    Ok(writer.into_inner())
}

fn write_element(writer: &mut Writer<Vec<u8>>, el: &Element) -> Result<(), DomError> {
    let mut start = BytesStart::new(el.name.as_str());
    for (key, value) in &el.attrs {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if el.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| DomError::Serialize(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| DomError::Serialize(e.to_string()))?;
    for child in &el.children {
        match child {
            Node::Element(nested) => write_element(writer, nested)?,
            Node::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| DomError::Serialize(e.to_string()))?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(el.name.as_str())))
        .map_err(|e| DomError::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_document() {
        let doc = parse_document(b"<tv><channel id=\"a.us\"/></tv>").unwrap();
        assert_eq!(doc.name, "tv");
        assert_eq!(doc.children.len(), 1);
        assert_eq!(doc.child("channel").unwrap().attr("id"), Some("a.us"));
    }

    #[test]
    fn test_parse_nested_text_and_attributes() {
        let xml = br#"<tv generator-info-name="test">
            <programme channel="a.us" start="20250101000000 +0000">
                <title lang="en">News</title>
                <desc>Evening news.</desc>
            </programme>
        </tv>"#;
        let doc = parse_document(xml).unwrap();
        let programme = doc.child("programme").unwrap();
        assert_eq!(programme.attr("channel"), Some("a.us"));
        assert_eq!(programme.child("title").unwrap().text(), Some("News"));
        assert_eq!(programme.child("title").unwrap().attr("lang"), Some("en"));
        assert_eq!(programme.child_text("desc"), Some("Evening news."));
    }

    #[test]
    fn test_child_text_distinguishes_absent_from_empty() {
        let doc = parse_document(b"<p><sub-title></sub-title></p>").unwrap();
        assert_eq!(doc.child_text("sub-title"), Some(""));
        assert_eq!(doc.child_text("title"), None);
    }

    #[test]
    fn test_entities_unescaped_on_parse() {
        let doc = parse_document(b"<t a=\"x &amp; y\">1 &lt; 2</t>").unwrap();
        assert_eq!(doc.attr("a"), Some("x & y"));
        assert_eq!(doc.text(), Some("1 < 2"));
    }

    #[test]
    fn test_set_text_replaces_content() {
        let mut el = Element::new("title");
        el.children.push(Node::Text("old".to_string()));
        el.set_text("new");
        assert_eq!(el.text(), Some("new"));
        assert_eq!(el.children.len(), 1);
    }

    #[test]
    fn test_malformed_document_is_error() {
        assert!(matches!(
            parse_document(b"<tv><channel></tv>"),
            Err(DomError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_input_has_no_root() {
        assert!(matches!(parse_document(b""), Err(DomError::NoRoot)));
        assert!(matches!(
            parse_document(b"<!-- only a comment -->"),
            Err(DomError::NoRoot)
        ));
    }

    #[test]
    fn test_write_document_has_declaration_and_escapes() {
        let mut root = Element::new("tv");
        let mut title = Element::new("title");
        title.set_text("Tom & Jerry");
        let mut programme = Element::new("programme");
        programme.attrs.push(("channel".to_string(), "a.us".to_string()));
        programme.children.push(Node::Element(title));
        root.children.push(Node::Element(programme));

        let bytes = write_document(&root).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(text.contains("Tom &amp; Jerry"));
        assert!(text.contains("<programme channel=\"a.us\">"));
    }

    #[test]
    fn test_empty_root_written_self_closed() {
        let bytes = write_document(&Element::new("tv")).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.ends_with("<tv/>"));
    }

    #[test]
    fn test_roundtrip_preserves_structure() {
        let xml = br#"<tv><channel id="a.us"><display-name>A</display-name></channel><programme channel="a.us"><title>Show</title></programme></tv>"#;
        let doc = parse_document(xml).unwrap();
        let written = write_document(&doc).unwrap();
        let reparsed = parse_document(&written).unwrap();
        assert_eq!(doc, reparsed);
    }
}
