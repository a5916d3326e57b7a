//! Reading and writing simulation experiments.
//!
//! Every simulation format is implemented by a [`SimulationWriter`] and a
//! [`SimulationReader`]. The codecs are registered in a static map keyed by
//! [`SimulationFormat`]; [`write_simulation`] and [`read_simulation`] resolve the
//! codec for a format at call time.
//!
//! Writers and readers work on bytes (`encode`/`decode`). Their `run` methods add
//! the file handling. Non-fatal problems are returned as [`Warnings`] next to the
//! result.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;

use super::data_model::{Simulation, SimulationFormat};
use super::error::SimulationIoError;
use super::warnings::Warnings;
use crate::sedml::reader::SedMlSimulationReader;
use crate::sedml::writer::SedMlSimulationWriter;
use crate::visualization::data_model::Visualization;

/// Options of a write call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// SED-ML level
    pub level: u8,
    /// SED-ML version
    pub version: u8,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            level: 1,
            version: 3,
        }
    }
}

/// A simulation encoded by a writer.
#[derive(Debug, Clone)]
pub struct EncodedSimulation {
    pub bytes: Vec<u8>,
    pub warnings: Warnings,
}

/// Simulations and visualization decoded by a reader.
#[derive(Debug, Clone, Default)]
pub struct ReadOutput {
    /// One simulation per task of the document
    pub simulations: Vec<Simulation>,
    /// The plots of the document, if any could be interpreted
    pub visualization: Option<Visualization>,
    pub warnings: Warnings,
}

/// Encodes simulations into a format.
pub trait SimulationWriter: Send + Sync {
    /// Encodes a simulation and, optionally, a visualization of its results.
    ///
    /// # Arguments
    ///
    /// * `simulation` - The simulation to encode
    /// * `visualization` - Plots of the simulation's results
    /// * `options` - Level and version of the encoding
    ///
    /// # Returns
    ///
    /// The encoded document and the warnings raised while encoding it.
    ///
    /// # Errors
    ///
    /// Returns a `SimulationIoError` if the simulation cannot be encoded.
    fn encode(
        &self,
        simulation: &Simulation,
        visualization: Option<&Visualization>,
        options: &WriteOptions,
    ) -> Result<EncodedSimulation, SimulationIoError>;

    /// Encodes a simulation and saves it to `path`.
    ///
    /// Nothing is written if encoding fails.
    fn run(
        &self,
        simulation: &Simulation,
        path: &Path,
        visualization: Option<&Visualization>,
        options: &WriteOptions,
    ) -> Result<Warnings, SimulationIoError> {
        let encoded = self.encode(simulation, visualization, options)?;
        fs::write(path, encoded.bytes)?;
        Ok(encoded.warnings)
    }
}

/// Decodes simulations from a format.
pub trait SimulationReader: Send + Sync {
    /// Decodes a document.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The encoded document
    /// * `source` - Name of the document, used in messages
    ///
    /// # Errors
    ///
    /// Returns a `SimulationIoError` if the document is invalid or uses features
    /// the reader cannot represent.
    fn decode(&self, bytes: &[u8], source: &str) -> Result<ReadOutput, SimulationIoError>;

    /// Reads and decodes the document at `path`.
    fn run(&self, path: &Path) -> Result<ReadOutput, SimulationIoError> {
        let bytes = fs::read(path)?;
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.decode(&bytes, &source)
    }
}

/// The writer and reader of a format.
pub struct SimulationCodec {
    pub writer: Box<dyn SimulationWriter>,
    pub reader: Box<dyn SimulationReader>,
}

lazy_static! {
    static ref CODECS: HashMap<SimulationFormat, SimulationCodec> = {
        let mut codecs = HashMap::new();
        codecs.insert(
            SimulationFormat::SedMl,
            SimulationCodec {
                writer: Box::new(SedMlSimulationWriter) as Box<dyn SimulationWriter>,
                reader: Box::new(SedMlSimulationReader) as Box<dyn SimulationReader>,
            },
        );
        codecs
    };
}

/// Returns the registered codec of a format.
///
/// # Errors
///
/// Returns `SimulationIoError::UnsupportedFormat` if no codec is registered.
pub fn codec(format: SimulationFormat) -> Result<&'static SimulationCodec, SimulationIoError> {
    CODECS
        .get(&format)
        .ok_or_else(|| SimulationIoError::UnsupportedFormat(format.to_string()))
}

/// Writes a simulation to a file.
///
/// # Arguments
///
/// * `simulation` - The simulation to write
/// * `path` - Where to save the encoded simulation
/// * `format` - The format to encode the simulation in
/// * `visualization` - Plots of the simulation's results
/// * `options` - Level and version of the encoding
///
/// # Returns
///
/// The warnings raised while encoding.
///
/// # Errors
///
/// Returns a `SimulationIoError` if the format is not supported, the simulation
/// cannot be encoded, or the file cannot be written.
pub fn write_simulation(
    simulation: &Simulation,
    path: impl AsRef<Path>,
    format: SimulationFormat,
    visualization: Option<&Visualization>,
    options: &WriteOptions,
) -> Result<Warnings, SimulationIoError> {
    codec(format)?
        .writer
        .run(simulation, path.as_ref(), visualization, options)
}

/// Reads the simulations of a file.
///
/// # Arguments
///
/// * `path` - Location of the encoded simulation experiment
/// * `format` - The format of the file
///
/// # Returns
///
/// The simulations, the visualization and the warnings raised while decoding.
///
/// # Errors
///
/// Returns a `SimulationIoError` if the format is not supported, the file cannot
/// be read, or the document is invalid.
pub fn read_simulation(path: impl AsRef<Path>, format: SimulationFormat) -> Result<ReadOutput, SimulationIoError> {
    codec(format)?.reader.run(path.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sedml_is_registered() {
        assert!(codec(SimulationFormat::SedMl).is_ok());
    }

    #[test]
    fn test_sessl_is_not_supported() {
        let error = read_simulation("simulation.scala", SimulationFormat::Sessl).unwrap_err();

        assert!(matches!(error, SimulationIoError::UnsupportedFormat(_)));
        assert_eq!(error.to_string(), "Format SESSL is not supported");
    }
}
