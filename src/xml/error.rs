use quick_xml::escape::EscapeError;
use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// Errors raised while parsing or emitting XML documents
#[derive(Debug, Error)]
pub enum XmlError {
    /// The document is not well-formed
    #[error("XML syntax error: {0}")]
    Syntax(#[from] quick_xml::Error),

    /// An attribute of an element is malformed
    #[error("Invalid XML attribute: {0}")]
    Attribute(#[from] AttrError),

    /// Text or an attribute value contains an invalid escape sequence
    #[error("Invalid XML escape sequence: {0}")]
    Escape(#[from] EscapeError),

    /// The document is not valid UTF-8
    #[error("XML is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The emitted document is not valid UTF-8
    #[error("XML is not valid UTF-8: {0}")]
    FromUtf8(#[from] std::string::FromUtf8Error),

    /// Writing the document failed
    #[error("Failed to write XML: {0}")]
    Io(#[from] std::io::Error),

    /// A closing tag has no matching opening tag
    #[error("Unexpected closing tag </{0}>")]
    UnexpectedEnd(String),

    /// The document ended before an element was closed
    #[error("Element <{0}> is not closed")]
    UnclosedElement(String),

    /// The document contains no element
    #[error("Document has no root element")]
    MissingRoot,

    /// The document contains more than one top-level element
    #[error("Document has more than one root element")]
    MultipleRoots,

    /// Non-whitespace text appears outside of the root element
    #[error("Text outside of the root element")]
    TextOutsideRoot,
}

/// Errors raised while parsing XPath expressions
#[derive(Debug, Error, PartialEq)]
pub enum XPathError {
    /// Only absolute location paths are supported
    #[error("XPath {0} must be an absolute location path")]
    NotAbsolute(String),

    /// A location step is empty, e.g. `//` or a trailing `/`
    #[error("XPath {0} contains an empty location step")]
    EmptyStep(String),

    /// A predicate is neither `[@attr='value']` nor a position
    #[error("Unsupported XPath predicate [{predicate}] in {path}")]
    InvalidPredicate { path: String, predicate: String },

    /// A predicate or string literal is not terminated
    #[error("Unterminated predicate in XPath {0}")]
    Unterminated(String),

    /// An attribute step is followed by further steps
    #[error("Attribute step must be the last step of XPath {0}")]
    AttributeNotLast(String),
}
