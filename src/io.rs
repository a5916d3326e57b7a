use std::path::PathBuf;

use thiserror::Error;

use crate::simulation::data_model::Simulation;
use crate::visualization::data_model::Visualization;

/// Loads a list of simulations from a JSON file.
///
/// # Arguments
///
/// * `path` - Path to the JSON file containing an array of simulations
///
/// # Returns
///
/// Returns a `Result` containing either:
/// * `Ok(Vec<Simulation>)` - The parsed simulations
/// * `Err(IOError)` - An error that occurred during file reading or JSON parsing
///
/// # Errors
///
/// This function will return an error if:
/// * The file cannot be found or opened (`IOError::FileNotFound`)
/// * The file contents cannot be parsed as simulations (`IOError::JsonParseError`)
pub fn load_simulations(path: impl Into<PathBuf>) -> Result<Vec<Simulation>, IOError> {
    let path = path.into();
    let file = std::fs::File::open(path).map_err(IOError::FileNotFound)?;
    serde_json::from_reader(file).map_err(IOError::JsonParseError)
}

/// Loads a single simulation from a JSON file.
///
/// # Errors
///
/// Same as [`load_simulations`].
pub fn load_simulation(path: impl Into<PathBuf>) -> Result<Simulation, IOError> {
    let path = path.into();
    let file = std::fs::File::open(path).map_err(IOError::FileNotFound)?;
    serde_json::from_reader(file).map_err(IOError::JsonParseError)
}

/// Saves a simulation to a JSON file.
///
/// # Arguments
///
/// * `path` - Path to the JSON file to create
/// * `simulation` - The simulation to save
pub fn save_simulation(path: impl Into<PathBuf>, simulation: &Simulation) -> Result<(), IOError> {
    let path = path.into();
    let file = std::fs::File::create(path).map_err(IOError::FileNotFound)?;
    serde_json::to_writer_pretty(file, simulation).map_err(IOError::JsonParseError)
}

/// Saves a list of simulations to a JSON file.
pub fn save_simulations(path: impl Into<PathBuf>, simulations: &[Simulation]) -> Result<(), IOError> {
    let path = path.into();
    let file = std::fs::File::create(path).map_err(IOError::FileNotFound)?;
    serde_json::to_writer_pretty(file, simulations).map_err(IOError::JsonParseError)
}

/// Loads a visualization from a JSON file.
pub fn load_visualization(path: impl Into<PathBuf>) -> Result<Visualization, IOError> {
    let path = path.into();
    let file = std::fs::File::open(path).map_err(IOError::FileNotFound)?;
    serde_json::from_reader(file).map_err(IOError::JsonParseError)
}

/// Saves a visualization to a JSON file.
pub fn save_visualization(path: impl Into<PathBuf>, visualization: &Visualization) -> Result<(), IOError> {
    let path = path.into();
    let file = std::fs::File::create(path).map_err(IOError::FileNotFound)?;
    serde_json::to_writer_pretty(file, visualization).map_err(IOError::JsonParseError)
}

/// Represents errors that can occur while loading or saving JSON files.
#[derive(Error, Debug)]
pub enum IOError {
    /// Indicates that the specified file could not be found or opened.
    #[error("File not found: {0}")]
    FileNotFound(#[from] std::io::Error),

    /// Indicates that the file contents could not be parsed as valid JSON.
    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::data_model::{SimulationBuilder, SimulationFormat};

    #[test]
    fn test_save_and_load_simulation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simulation.json");
        let simulation = SimulationBuilder::default()
            .id("sim")
            .format(SimulationFormat::SedMl.format().with_version("L1V3"))
            .build()
            .unwrap();

        save_simulation(&path, &simulation).unwrap();
        let loaded = load_simulation(&path).unwrap();

        assert_eq!(loaded, simulation);
    }

    #[test]
    fn test_save_and_load_simulations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simulations.json");
        let simulations: Vec<_> = ["task_1", "task_2"]
            .into_iter()
            .map(|id| SimulationBuilder::default().id(id).build().unwrap())
            .collect();

        save_simulations(&path, &simulations).unwrap();
        let loaded = load_simulations(&path).unwrap();

        assert_eq!(loaded, simulations);
        assert!(matches!(load_simulation(&path), Err(IOError::JsonParseError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_visualization("does/not/exist.json");
        assert!(matches!(result, Err(IOError::FileNotFound(_))));
    }
}
