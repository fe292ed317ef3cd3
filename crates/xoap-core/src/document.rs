//! Read-only XML element tree
//!
//! Feed responses are small, so each body is parsed into an owned tree of
//! `Element`s with `quick-xml` and the extractors walk that tree. The tree
//! lives only as long as the fetch that produced it.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, XoapError};

/// One XML element with its attributes, direct text and child elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// Tag name, compared case-sensitively by the extractors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this element's tag is exactly `name`.
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Value of attribute `key`, if present.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter()
    }

    /// First child element named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is(name))
    }

    /// All child elements named `name`, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.is(name))
    }

    /// Text directly inside this element.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Trimmed content of the first child named `name`.
    pub fn text_of(&self, name: &str) -> Option<String> {
        self.child(name).map(|c| c.content().trim().to_string())
    }

    /// This element's text followed by the content of every descendant.
    pub fn content(&self) -> String {
        let mut out = String::new();
        self.collect_content(&mut out);
        out
    }

    fn collect_content(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.children {
            child.collect_content(out);
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| XoapError::DocumentParse(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| XoapError::DocumentParse(e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }
}

/// Parse a response body into its root element.
///
/// # Errors
/// `XoapError::DocumentParse` for malformed XML, unclosed elements, a second
/// root element, or a body without any element.
///
/// # Examples
/// ```
/// use xoap_core::document::parse_document;
///
/// let root = parse_document(b"<search><loc id=\"USNY1232\">Rochester, NY</loc></search>").unwrap();
/// assert_eq!(root.name(), "search");
/// assert_eq!(root.child("loc").unwrap().attr("id"), Some("USNY1232"));
/// ```
pub fn parse_document(bytes: &[u8]) -> Result<Element> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => stack.push(Element::from_start(&e)?),
            Ok(Event::Empty(e)) => {
                let element = Element::from_start(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XoapError::DocumentParse("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                if let Some(current) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .map_err(|e| XoapError::DocumentParse(e.to_string()))?;
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(XoapError::DocumentParse(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(XoapError::DocumentParse(format!(
            "element <{}> is never closed",
            open.name
        )));
    }

    root.ok_or_else(|| XoapError::DocumentParse("document has no root element".to_string()))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(XoapError::DocumentParse(format!(
                "second root element <{}>",
                element.name
            )))
        }
    }
    Ok(())
}
