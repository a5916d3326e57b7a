use thiserror::Error;

use crate::xml::error::XmlError;

/// Errors that abort reading or writing a simulation experiment
#[derive(Debug, Error)]
pub enum SimulationIoError {
    /// The simulation's format does not match the requested encoding
    #[error("Format must be SED-ML L{level}V{version}")]
    FormatMismatch { level: u8, version: u8 },

    /// The SED-ML level/version pair is not supported
    #[error("SED-ML L{level}V{version} is not supported")]
    UnsupportedLevelVersion { level: u8, version: u8 },

    /// No codec is registered for the format
    #[error("Format {0} is not supported")]
    UnsupportedFormat(String),

    /// An algorithm or algorithm parameter term is not a KiSAO term
    #[error("KiSAO id cannot be set to a '{0}' term")]
    NonKisaoTerm(String),

    /// A KiSAO id is not of the form `KISAO:NNNNNNN`
    #[error("'{0}' is not a valid KiSAO id")]
    InvalidKisaoId(String),

    /// The document is not a valid SED-ML document
    #[error("{location} is invalid: {message}")]
    InvalidDocument { location: String, message: String },

    /// A model contains changes other than attribute changes
    #[error("Changes in {0} must be attribute changes")]
    UnsupportedChange(String),

    /// Two models share an id
    #[error("Models in {0} must have unique ids")]
    DuplicateModelId(String),

    /// Two simulations share an id
    #[error("Simulations in {0} must have unique ids")]
    DuplicateSimulationId(String),

    /// A task references a model that cannot be resolved
    #[error("Model {model} in {location} cannot be determined")]
    UndeterminedModel { model: String, location: String },

    /// A task references a simulation that cannot be resolved
    #[error("Simulation {simulation} in {location} cannot be determined")]
    UndeterminedSimulation {
        simulation: String,
        location: String,
    },

    /// The simulation element is neither a uniform time course nor a steady state
    #[error("Unsupported simulation type: {kind} in {location}")]
    UnsupportedSimulationType { kind: String, location: String },

    /// The output start time of a time course precedes its start time
    #[error("Output start time must be at least the start time (simulation {0})")]
    OutputStartBeforeStart(String),

    /// A simulation element has no algorithm
    #[error("Simulation {0} has no algorithm")]
    MissingAlgorithm(String),

    /// Building the document failed
    #[error("SED-ML error: {0}")]
    Library(String),

    /// Parsing or emitting XML failed
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// Reading or writing a file failed
    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),
}

impl SimulationIoError {
    pub(crate) fn invalid(location: impl Into<String>, message: impl Into<String>) -> Self {
        SimulationIoError::InvalidDocument {
            location: location.into(),
            message: message.into(),
        }
    }
}
