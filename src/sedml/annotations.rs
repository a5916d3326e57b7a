//! RDF annotations of SED-ML elements.
//!
//! SED-ML has no native slot for most of the metadata of a simulation (description,
//! tags, authors, references, license, dates) nor for the id and name of changes
//! and algorithms. These are carried in RDF/XML annotations:
//!
//! ```xml
//! <annotation>
//!   <rdf:RDF xmlns:rdf="..." xmlns:dc="...">
//!     <rdf:Description rdf:about="#_00000001">
//!       <dc:title>k1</dc:title>
//!       <dc:description dc:type="description">...</dc:description>
//!     </rdf:Description>
//!   </rdf:RDF>
//! </annotation>
//! ```
//!
//! ## Nodes
//!
//! The content of a description is a list of [`XmlNode`]s. A node is a prefixed tag
//! with an optional `dc:type` discriminator and either scalar text or child nodes.
//! Siblings sharing a tag (e.g. `dc:description` for both the free text
//! description and the tag list) are told apart by their type.
//!
//! ## Subjects
//!
//! Each annotated element carries a `metaid` and the description refers to it via
//! `rdf:about`. When decoding, only descriptions about the element are used. An
//! element without a `metaid` accepts any description.
//!
//! Annotations are always optional: anything that cannot be interpreted is ignored.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::data_model::{JournalReference, License, Person, ResourceMetadata};
use crate::xml::dom::Element;

/// Value of the `dcterms:mediator` annotation of documents written by this crate.
pub const MEDIATOR: &str = "BioSimulations";

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Namespaces that annotation nodes may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    Rdf,
    Dc,
    DcTerms,
    Vcard,
    Bibo,
}

impl Namespace {
    const ALL: [Namespace; 5] = [
        Namespace::Rdf,
        Namespace::Dc,
        Namespace::DcTerms,
        Namespace::Vcard,
        Namespace::Bibo,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            Namespace::Rdf => "rdf",
            Namespace::Dc => "dc",
            Namespace::DcTerms => "dcterms",
            Namespace::Vcard => "vcard",
            Namespace::Bibo => "bibo",
        }
    }

    pub fn uri(&self) -> &'static str {
        match self {
            Namespace::Rdf => "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
            Namespace::Dc => "http://purl.org/dc/elements/1.1/",
            Namespace::DcTerms => "http://purl.org/dc/terms/",
            Namespace::Vcard => "http://www.w3.org/2001/vcard-rdf/3.0#",
            Namespace::Bibo => "http://purl.org/ontology/bibo/",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Namespace> {
        Self::ALL.into_iter().find(|namespace| namespace.prefix() == prefix)
    }
}

/// Content of an annotation node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNodeChildren {
    /// Text content
    Scalar(String),
    /// Nested nodes
    Nodes(Vec<XmlNode>),
}

/// A node of an annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    pub prefix: String,
    pub name: String,
    /// Value of the `dc:type` attribute
    pub node_type: Option<String>,
    pub children: XmlNodeChildren,
}

impl XmlNode {
    /// A node with text content.
    pub fn scalar(namespace: Namespace, name: &str, value: impl ToString) -> Self {
        Self {
            prefix: namespace.prefix().to_string(),
            name: name.to_string(),
            node_type: None,
            children: XmlNodeChildren::Scalar(value.to_string()),
        }
    }

    /// A node with child nodes.
    pub fn nodes(namespace: Namespace, name: &str, children: Vec<XmlNode>) -> Self {
        Self {
            prefix: namespace.prefix().to_string(),
            name: name.to_string(),
            node_type: None,
            children: XmlNodeChildren::Nodes(children),
        }
    }

    /// Sets the `dc:type` discriminator.
    pub fn with_type(mut self, node_type: &str) -> Self {
        self.node_type = Some(node_type.to_string());
        self
    }

    /// Whether the node is the tag `prefix:name` of the given namespace.
    pub fn is(&self, namespace: Namespace, name: &str) -> bool {
        self.prefix == namespace.prefix() && self.name == name
    }

    fn has_type(&self, node_type: &str) -> bool {
        self.node_type.as_deref() == Some(node_type)
    }

    /// Text content, if the node is a scalar.
    pub fn as_scalar(&self) -> Option<&str> {
        match &self.children {
            XmlNodeChildren::Scalar(value) => Some(value),
            XmlNodeChildren::Nodes(_) => None,
        }
    }

    /// Child nodes. Scalars have none.
    pub fn children(&self) -> &[XmlNode] {
        match &self.children {
            XmlNodeChildren::Scalar(_) => &[],
            XmlNodeChildren::Nodes(children) => children,
        }
    }

    /// Children that are the tag `prefix:name`.
    fn children_named<'a>(&'a self, namespace: Namespace, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children()
            .iter()
            .filter(move |child| child.is(namespace, name))
    }

    /// Items of an `rdf:Bag` child: the children of each `rdf:li`.
    fn bag_items(&self) -> impl Iterator<Item = &XmlNode> + '_ {
        self.children_named(Namespace::Rdf, "Bag")
            .flat_map(|bag| bag.children_named(Namespace::Rdf, "li"))
            .flat_map(|item| item.children().iter())
    }

    fn to_element(&self) -> Element {
        let mut element = Element::new(format!("{}:{}", self.prefix, self.name));
        element.set_optional_attribute("dc:type", self.node_type.as_deref());
        match &self.children {
            XmlNodeChildren::Scalar(value) => element.push_text(value),
            XmlNodeChildren::Nodes(children) => {
                for child in children {
                    element.push(child.to_element());
                }
            }
        }
        element
    }

    fn from_element(element: &Element) -> Self {
        let has_elements = element.elements().next().is_some();
        let text = element.text();

        let children = if !has_elements && !text.is_empty() {
            XmlNodeChildren::Scalar(text)
        } else {
            XmlNodeChildren::Nodes(element.elements().map(XmlNode::from_element).collect())
        };

        Self {
            prefix: element.prefix().unwrap_or_default().to_string(),
            name: element.local_name().to_string(),
            node_type: element.attribute("dc:type").map(str::to_string),
            children,
        }
    }

    fn collect_namespaces(&self, namespaces: &mut Vec<Namespace>) {
        if let Some(namespace) = Namespace::from_prefix(&self.prefix) {
            namespaces.push(namespace);
        }
        if self.node_type.is_some() {
            namespaces.push(Namespace::Dc);
        }
        for child in self.children() {
            child.collect_namespaces(namespaces);
        }
    }
}

/// Builds the `<annotation>` element carrying `nodes`.
///
/// Only the namespaces used by the nodes are declared; `rdf` always is.
///
/// # Arguments
///
/// * `meta_id` - The `metaid` of the annotated element, referenced by `rdf:about`
/// * `nodes` - The content of the description
///
/// # Returns
///
/// The annotation, or `None` if there are no nodes.
pub fn encode_annotation(meta_id: Option<&str>, nodes: &[XmlNode]) -> Option<Element> {
    if nodes.is_empty() {
        return None;
    }

    let mut namespaces = vec![Namespace::Rdf];
    for node in nodes {
        node.collect_namespaces(&mut namespaces);
    }
    namespaces.sort();
    namespaces.dedup();

    let mut rdf = Element::new("rdf:RDF");
    for namespace in namespaces {
        rdf.set_attribute(format!("xmlns:{}", namespace.prefix()), namespace.uri());
    }

    let mut description = Element::new("rdf:Description");
    description.set_optional_attribute("rdf:about", meta_id.map(|meta_id| format!("#{meta_id}")));
    for node in nodes {
        description.push(node.to_element());
    }

    Some(Element::new("annotation").with_child(rdf.with_child(description)))
}

/// Decodes the annotation of an element.
///
/// # Arguments
///
/// * `annotation` - The element's `<annotation>` child, if any
/// * `meta_id` - The element's `metaid`, if any
///
/// # Returns
///
/// The nodes of all descriptions about the element, in document order.
pub fn decode_annotation(annotation: Option<&Element>, meta_id: Option<&str>) -> Vec<XmlNode> {
    let Some(annotation) = annotation else {
        return Vec::new();
    };
    if annotation.prefix().is_some() || annotation.local_name() != "annotation" {
        return Vec::new();
    }

    let about = meta_id.map(|meta_id| format!("#{meta_id}"));

    annotation
        .elements()
        .filter(|rdf| rdf.name == "rdf:RDF")
        .flat_map(Element::elements)
        .filter(|description| description.name == "rdf:Description")
        .filter(|description| match &about {
            Some(about) => description.attribute("rdf:about") == Some(about.as_str()),
            None => true,
        })
        .flat_map(Element::elements)
        .map(XmlNode::from_element)
        .collect()
}

/// Encodes an optional id and name as `dc:title` and `dc:description`.
pub fn encode_id_name(id: Option<&str>, name: Option<&str>) -> Vec<XmlNode> {
    id.map(|id| XmlNode::scalar(Namespace::Dc, "title", id))
        .into_iter()
        .chain(name.map(|name| XmlNode::scalar(Namespace::Dc, "description", name)))
        .collect()
}

/// Decodes an id and name encoded by [`encode_id_name`].
pub fn decode_id_name(nodes: &[XmlNode]) -> (Option<String>, Option<String>) {
    let scalar = |name: &str| {
        nodes
            .iter()
            .filter(|node| node.is(Namespace::Dc, name))
            .find_map(XmlNode::as_scalar)
            .map(str::to_string)
    };
    (scalar("title"), scalar("description"))
}

/// Encodes the metadata of a simulation as document annotation nodes.
///
/// # Arguments
///
/// * `metadata` - The metadata to encode
/// * `id` - Identifier of the simulation, stored as `dc:identifier`
/// * `created` - Creation date used when the metadata has none
pub fn encode_metadata(metadata: &ResourceMetadata, id: Option<&str>, created: DateTime<Utc>) -> Vec<XmlNode> {
    let mut nodes = Vec::new();

    if let Some(id) = id {
        nodes.push(XmlNode::scalar(Namespace::Dc, "identifier", id));
    }
    if let Some(name) = &metadata.name {
        nodes.push(XmlNode::scalar(Namespace::Dc, "title", name));
    }

    if let Some(description) = &metadata.description {
        nodes.push(XmlNode::scalar(Namespace::Dc, "description", description).with_type("description"));
    }

    if !metadata.tags.is_empty() {
        let items = metadata
            .tags
            .iter()
            .map(|tag| XmlNode::scalar(Namespace::Rdf, "value", tag))
            .collect();
        nodes.push(XmlNode::nodes(Namespace::Dc, "description", vec![bag(items)]).with_type("tags"));
    }

    if !metadata.authors.is_empty() {
        let items = metadata.authors.iter().map(encode_person).collect();
        nodes.push(XmlNode::nodes(Namespace::Dc, "creator", vec![bag(items)]));
    }

    if !metadata.references.is_empty() {
        let items = metadata.references.iter().map(encode_reference).collect();
        nodes.push(XmlNode::nodes(Namespace::DcTerms, "references", vec![bag(items)]));
    }

    if let Some(license) = &metadata.license {
        nodes.push(XmlNode::scalar(Namespace::DcTerms, "license", license));
    }

    nodes.push(XmlNode::scalar(Namespace::DcTerms, "mediator", MEDIATOR));

    if let Some(version) = metadata.version {
        nodes.push(XmlNode::scalar(Namespace::Dc, "description", version).with_type("version"));
    }

    let created = metadata.created.unwrap_or(created);
    nodes.push(XmlNode::scalar(
        Namespace::DcTerms,
        "created",
        created.format(DATE_FORMAT),
    ));
    if let Some(updated) = &metadata.updated {
        nodes.push(
            XmlNode::scalar(Namespace::DcTerms, "date", updated.format(DATE_FORMAT)).with_type("update"),
        );
    }

    nodes
}

fn bag(items: Vec<XmlNode>) -> XmlNode {
    XmlNode::nodes(
        Namespace::Rdf,
        "Bag",
        items
            .into_iter()
            .map(|item| XmlNode::nodes(Namespace::Rdf, "li", vec![item]))
            .collect(),
    )
}

fn encode_person(person: &Person) -> XmlNode {
    let names = [
        ("Given", &person.first_name),
        ("Other", &person.middle_name),
        ("Family", &person.last_name),
    ]
    .into_iter()
    .filter_map(|(name, value)| {
        value
            .as_ref()
            .map(|value| XmlNode::scalar(Namespace::Vcard, name, value))
    })
    .collect();

    XmlNode::nodes(Namespace::Vcard, "N", names)
}

fn encode_reference(reference: &JournalReference) -> XmlNode {
    let mut properties = Vec::new();
    let mut push = |namespace: Namespace, name: &str, value: Option<String>| {
        if let Some(value) = value {
            properties.push(XmlNode::scalar(namespace, name, value));
        }
    };

    push(Namespace::Bibo, "authorList", reference.authors.clone());
    push(Namespace::Dc, "title", reference.title.clone());
    push(Namespace::Bibo, "journal", reference.journal.clone());
    push(Namespace::Bibo, "volume", reference.volume.clone());
    push(Namespace::Bibo, "issue", reference.issue.map(|issue| issue.to_string()));
    push(Namespace::Bibo, "pages", reference.pages.clone());
    push(Namespace::Dc, "date", reference.year.map(|year| year.to_string()));
    push(Namespace::Bibo, "doi", reference.doi.clone());

    XmlNode::nodes(Namespace::Bibo, "Article", properties)
}

/// Decodes document annotation nodes into metadata.
///
/// Values that cannot be interpreted (e.g. a malformed date) are skipped.
pub fn decode_metadata(nodes: &[XmlNode]) -> ResourceMetadata {
    let mut metadata = ResourceMetadata::default();

    for node in nodes {
        if node.is(Namespace::Dc, "title") {
            metadata.name = node.as_scalar().map(str::to_string);
        } else if node.is(Namespace::Dc, "description") && node.has_type("description") {
            if let Some(description) = node.as_scalar() {
                metadata.description = Some(description.to_string());
            }
        } else if node.is(Namespace::Dc, "description") && node.has_type("version") {
            metadata.version = node
                .as_scalar()
                .and_then(|version| version.trim().parse().ok());
        } else if node.is(Namespace::Dc, "description") && node.has_type("tags") {
            metadata.tags.extend(
                node.bag_items()
                    .filter(|item| item.is(Namespace::Rdf, "value"))
                    .filter_map(XmlNode::as_scalar)
                    .map(str::to_string),
            );
        } else if node.is(Namespace::Dc, "creator") {
            metadata.authors.extend(
                node.bag_items()
                    .filter(|item| item.is(Namespace::Vcard, "N"))
                    .map(decode_person),
            );
        } else if node.is(Namespace::DcTerms, "references") {
            metadata.references.extend(
                node.bag_items()
                    .filter(|item| item.is(Namespace::Bibo, "Article"))
                    .map(decode_reference),
            );
        } else if node.is(Namespace::DcTerms, "license") {
            metadata.license = node
                .as_scalar()
                .and_then(|license| license.parse::<License>().ok());
        } else if node.is(Namespace::DcTerms, "created") {
            metadata.created = node.as_scalar().and_then(parse_date);
        } else if node.is(Namespace::DcTerms, "date") && node.has_type("update") {
            metadata.updated = node.as_scalar().and_then(parse_date);
        }
    }

    metadata
}

fn decode_person(node: &XmlNode) -> Person {
    let mut person = Person::default();
    for property in node.children() {
        let value = property.as_scalar().map(str::to_string);
        if property.is(Namespace::Vcard, "Given") {
            person.first_name = value;
        } else if property.is(Namespace::Vcard, "Other") {
            person.middle_name = value;
        } else if property.is(Namespace::Vcard, "Family") {
            person.last_name = value;
        }
    }
    person
}

fn decode_reference(node: &XmlNode) -> JournalReference {
    let mut reference = JournalReference::default();
    for property in node.children() {
        let Some(value) = property.as_scalar() else {
            continue;
        };
        if property.is(Namespace::Bibo, "authorList") {
            reference.authors = Some(value.to_string());
        } else if property.is(Namespace::Dc, "title") {
            reference.title = Some(value.to_string());
        } else if property.is(Namespace::Bibo, "journal") {
            reference.journal = Some(value.to_string());
        } else if property.is(Namespace::Bibo, "volume") {
            reference.volume = Some(value.to_string());
        } else if property.is(Namespace::Bibo, "issue") {
            reference.issue = value.trim().parse().ok();
        } else if property.is(Namespace::Bibo, "pages") {
            reference.pages = Some(value.to_string());
        } else if property.is(Namespace::Dc, "date") {
            reference.year = value.trim().parse().ok();
        } else if property.is(Namespace::Bibo, "doi") {
            reference.doi = Some(value.to_string());
        }
    }
    reference
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let parsed = DateTime::parse_from_rfc3339(value)
        .map(|date| date.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(value, DATE_FORMAT).map(|date| date.and_utc()));

    match parsed {
        Ok(date) => Some(date),
        Err(error) => {
            log::debug!("Ignoring annotation date '{value}': {error}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data_model::ResourceMetadataBuilder;
    use crate::xml::dom::{fragment_to_string, parse};

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 3, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_encode_id_name_annotation() {
        let annotation = encode_annotation(Some("_00000002"), &encode_id_name(Some("k1"), Some("Rate constant"))).unwrap();

        insta::assert_snapshot!(
            fragment_to_string(&annotation).unwrap(),
            @r##"<annotation><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:dc="http://purl.org/dc/elements/1.1/"><rdf:Description rdf:about="#_00000002"><dc:title>k1</dc:title><dc:description>Rate constant</dc:description></rdf:Description></rdf:RDF></annotation>"##
        );
    }

    #[test]
    fn test_no_annotation_without_nodes() {
        assert!(encode_annotation(Some("_00000001"), &[]).is_none());
    }

    #[test]
    fn test_decode_filters_by_meta_id() {
        let annotation = parse(
            r##"<annotation>
                <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:dc="http://purl.org/dc/elements/1.1/">
                    <rdf:Description rdf:about="#_00000001"><dc:title>first</dc:title></rdf:Description>
                    <rdf:Description rdf:about="#_00000002"><dc:title>second</dc:title></rdf:Description>
                </rdf:RDF>
            </annotation>"##,
        )
        .unwrap();

        let about_second = decode_annotation(Some(&annotation), Some("_00000002"));
        assert_eq!(decode_id_name(&about_second), (Some("second".to_string()), None));

        let without_meta_id = decode_annotation(Some(&annotation), None);
        assert_eq!(without_meta_id.len(), 2);

        assert!(decode_annotation(Some(&annotation), Some("_00000003")).is_empty());
        assert!(decode_annotation(None, Some("_00000001")).is_empty());
    }

    #[test]
    fn test_decode_ignores_foreign_elements() {
        let annotation = parse("<notes><p>text</p></notes>").unwrap();
        assert!(decode_annotation(Some(&annotation), None).is_empty());
    }

    #[test]
    fn test_metadata_survives_encoding() {
        let metadata = ResourceMetadataBuilder::default()
            .name("Repressilator")
            .description("Oscillations of a synthetic gene network")
            .tags(vec!["oscillator".to_string(), "synthetic biology".to_string()])
            .authors(vec![
                Person::new("Michael", "Elowitz"),
                Person {
                    first_name: Some("Stanislas".to_string()),
                    middle_name: Some("L".to_string()),
                    last_name: Some("Leibler".to_string()),
                },
            ])
            .references(vec![JournalReference {
                authors: Some("Michael B. Elowitz & Stanislas Leibler".to_string()),
                title: Some("A synthetic oscillatory network of transcriptional regulators".to_string()),
                journal: Some("Nature".to_string()),
                volume: Some("403".to_string()),
                issue: Some(6767),
                pages: Some("335-338".to_string()),
                year: Some(2000),
                doi: Some("10.1038/35002125".to_string()),
            }])
            .license(License::CcBy)
            .version(3)
            .updated(Utc.with_ymd_and_hms(2020, 4, 1, 8, 30, 0).unwrap())
            .build()
            .unwrap();

        let nodes = encode_metadata(&metadata, Some("sim"), created());
        let annotation = encode_annotation(Some("_00000001"), &nodes).unwrap();
        let xml = fragment_to_string(&annotation).unwrap();

        let decoded = decode_metadata(&decode_annotation(Some(&parse(&xml).unwrap()), Some("_00000001")));

        let mut expected = metadata.clone();
        expected.created = Some(created());
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_only_used_namespaces_are_declared() {
        let nodes = encode_metadata(&ResourceMetadata::default(), None, created());
        let annotation = encode_annotation(None, &nodes).unwrap();
        let rdf = annotation.child("RDF").unwrap();

        let declared: Vec<_> = rdf.attributes.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(declared, vec!["xmlns:rdf", "xmlns:dcterms"]);
        assert_eq!(rdf.child("Description").unwrap().attribute("rdf:about"), None);
    }

    #[test]
    fn test_malformed_values_are_skipped() {
        let nodes = vec![
            XmlNode::scalar(Namespace::DcTerms, "created", "yesterday"),
            XmlNode::scalar(Namespace::DcTerms, "license", "GPL"),
            XmlNode::scalar(Namespace::Dc, "description", "no type"),
            XmlNode::scalar(Namespace::Dc, "description", "v2").with_type("version"),
        ];

        assert_eq!(decode_metadata(&nodes), ResourceMetadata::default());
    }
}
