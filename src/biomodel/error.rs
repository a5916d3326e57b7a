use thiserror::Error;

use crate::xml::error::XmlError;

/// Errors that can occur while reading model files
#[derive(Debug, Error)]
pub enum BiomodelIoError {
    /// Error when no reader exists for the modeling language
    #[error("Models in {0} format cannot be read")]
    UnsupportedFormat(String),

    /// Error when reading the model file fails
    #[error("Failed to read model file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Error when the model file is not well-formed XML
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// Error when the root element is not the expected document element
    #[error("Expected <{expected}> root element, found <{found}>")]
    UnexpectedRoot { expected: String, found: String },

    /// Error when the document does not contain a model
    #[error("Document does not contain a model")]
    MissingModel,

    /// Error when the model has no id
    #[error("Model has no id")]
    MissingModelId,

    /// Error when a species or parameter has no id
    #[error("{0} has no id")]
    MissingElementId(String),
}
