//! A small XML element tree on top of `quick-xml` events.
//!
//! SED-ML documents are read into an [`Element`] tree, inspected and rebuilt by the
//! typed document layer, and written back through [`to_string`]. Element and
//! attribute names are kept as qualified names (`rdf:Description`); namespace
//! declarations are ordinary `xmlns`/`xmlns:*` attributes.
//!
//! Whitespace-only text between elements is dropped while parsing. All other text
//! is kept verbatim, with entity and character references resolved.

use quick_xml::escape::unescape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::error::XmlError;

/// A node of the element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its attributes and children, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Qualified name, e.g. `rdf:Description`.
    pub name: String,
    /// Attributes as `(qualified name, unescaped value)` pairs.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds an attribute, builder style.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Adds a child element, builder style.
    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    /// Adds text content, builder style.
    pub fn with_text(mut self, text: impl AsRef<str>) -> Self {
        self.push_text(text.as_ref());
        self
    }

    /// Prefix of the qualified name, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Name without its prefix.
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Sets an attribute if a value is given.
    pub fn set_optional_attribute(&mut self, name: &str, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.set_attribute(name, value);
        }
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Appends text, merging it with a directly preceding text node.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.children.last_mut() {
            Some(Node::Text(existing)) => existing.push_str(text),
            _ => self.children.push(Node::Text(text.to_string())),
        }
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, local_name: &str) -> Option<&Element> {
        self.elements()
            .find(|element| element.local_name() == local_name)
    }

    /// Child elements of the list child `list_name` (e.g. the models of `listOfModels`).
    pub fn list<'a>(&'a self, list_name: &str) -> impl Iterator<Item = &'a Element> + 'a {
        self.child(list_name).into_iter().flat_map(Element::elements)
    }

    /// Concatenated text of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }
}

/// Name without its prefix.
pub fn local_part(name: &str) -> &str {
    name.split_once(':').map_or(name, |(_, local)| local)
}

/// Parses a complete XML document into its root element.
///
/// # Arguments
///
/// * `xml` - The document text
///
/// # Returns
///
/// The root element of the document.
///
/// # Errors
///
/// Returns an `XmlError` if the document is not well-formed, contains no or
/// several root elements, or contains invalid escape sequences.
pub fn parse(xml: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(element_from_start(&start)?),
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(end) => {
                let mut element = stack.pop().ok_or_else(|| {
                    XmlError::UnexpectedEnd(String::from_utf8_lossy(end.name().as_ref()).into())
                })?;
                element
                    .children
                    .retain(|node| !matches!(node, Node::Text(text) if text.trim().is_empty()));
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let raw = std::str::from_utf8(&text)?;
                push_text(&mut stack, &unescape(raw)?)?;
            }
            Event::CData(data) => {
                push_text(&mut stack, std::str::from_utf8(&data)?)?;
            }
            Event::GeneralRef(reference) => {
                let name = std::str::from_utf8(&reference)?;
                push_text(&mut stack, &unescape(&format!("&{name};"))?)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::UnclosedElement(open.name));
    }

    root.ok_or(XmlError::MissingRoot)
}

fn element_from_start(start: &BytesStart) -> Result<Element, XmlError> {
    let mut element = Element::new(std::str::from_utf8(start.name().as_ref())?);
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = std::str::from_utf8(attribute.key.as_ref())?.to_string();
        let value = unescape(std::str::from_utf8(&attribute.value)?)?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(XmlError::MultipleRoots),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.push_text(text),
        None if text.trim().is_empty() => {}
        None => return Err(XmlError::TextOutsideRoot),
    }
    Ok(())
}

/// Serializes an element as a complete UTF-8 document with an XML declaration.
pub fn to_string(root: &Element) -> Result<String, XmlError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, root)?;
    Ok(String::from_utf8(writer.into_inner())?)
}

/// Serializes an element without an XML declaration.
pub fn fragment_to_string(element: &Element) -> Result<String, XmlError> {
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, element)?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let xml = r#"<?xml version="1.0"?>
            <root xmlns:dc="http://purl.org/dc/elements/1.1/" id="r">
                <dc:title>Title &amp; more</dc:title>
                <empty/>
            </root>"#;

        let root = parse(xml).unwrap();

        assert_eq!(root.name, "root");
        assert_eq!(root.attribute("id"), Some("r"));
        assert_eq!(root.elements().count(), 2);

        let title = root.child("title").unwrap();
        assert_eq!(title.prefix(), Some("dc"));
        assert_eq!(title.local_name(), "title");
        assert_eq!(title.text(), "Title & more");
        assert!(root.child("empty").unwrap().children.is_empty());
    }

    #[test]
    fn test_write_escapes_text_and_attributes() {
        let element = Element::new("note")
            .with_attribute("label", "a \"quoted\" <value>")
            .with_text("1 < 2 & 3 > 2");

        let xml = fragment_to_string(&element).unwrap();
        let parsed = parse(&xml).unwrap();

        assert_eq!(parsed, element);
    }

    #[test]
    fn test_document_has_declaration() {
        let xml = to_string(&Element::new("sedML")).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.ends_with("<sedML/>"));
    }

    #[test]
    fn test_rejects_malformed_documents() {
        assert!(parse("<a><b></a>").is_err());
        assert!(parse("<a>").is_err());
        assert!(parse("").is_err());
        assert!(matches!(parse("<a/><b/>"), Err(XmlError::MultipleRoots)));
    }

    #[test]
    fn test_list_children() {
        let root = parse("<sedML><listOfModels><model id=\"a\"/><model id=\"b\"/></listOfModels></sedML>")
            .unwrap();

        let ids: Vec<_> = root
            .list("listOfModels")
            .filter_map(|model| model.attribute("id"))
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(root.list("listOfTasks").count(), 0);
    }
}
