//! BioSimulations Rust Library
//!
//! This library provides the object model of BioSimulations simulation experiments
//! and their SED-ML encoding, including:
//! - Describing models, simulations and visualizations of their results
//! - Writing a simulation and its plots as a SED-ML document
//! - Reading SED-ML documents back into simulations and a visualization
//! - Applying parameter changes to XML model files
//! - Reading variables and parameters from SBML models

#![warn(unused_imports)]

/// Commonly used types and functionality re-exported for convenience
pub mod prelude {
    pub use crate::biomodel::data_model::*;
    pub use crate::biomodel::sbml::read_biomodel;
    pub use crate::data_model::*;
    pub use crate::io::*;
    pub use crate::sedml::modify::modify_xml_model_for_simulation;
    pub use crate::simulation::core::*;
    pub use crate::simulation::data_model::*;
    pub use crate::simulation::error::SimulationIoError;
    pub use crate::simulation::warnings::*;
    pub use crate::visualization::data_model::*;
}

/// Metadata types shared by models and simulations
pub mod data_model;

/// Models and the readers of model files
pub mod biomodel {
    pub mod data_model;
    /// Error types for reading model files
    pub mod error;
    /// SBML model reader
    pub mod sbml;
}

/// Simulation experiments and the codec registry
pub mod simulation {
    /// Writer and reader traits and the format registry
    pub mod core;
    pub mod data_model;
    /// Error types of the simulation codecs
    pub mod error;
    /// Non-fatal diagnostics of the simulation codecs
    pub mod warnings;
}

/// Visualizations of simulation results
pub mod visualization {
    pub mod data_model;
}

/// Minimal XML tree and XPath support
pub mod xml {
    pub mod dom;
    pub mod error;
    pub mod xpath;
}

/// SED-ML encoding of simulations
pub mod sedml {
    /// RDF annotation micro-format
    pub mod annotations;
    /// Typed SED-ML document layer
    pub mod document;
    /// KiSAO id handling
    pub mod kisao;
    /// Applying model changes to model files
    pub mod modify;
    /// SED-ML to simulation reader
    pub mod reader;
    /// Supported levels and versions
    pub mod version;
    /// Simulation to SED-ML writer
    pub mod writer;
}

/// IO functionality
pub mod io;
