//! Command-line interface for the BioSimulations library
//!
//! This binary exposes the SED-ML codec and the model utilities:
//! - Writing a simulation (JSON) as a SED-ML document
//! - Reading a SED-ML document into simulations and a visualization (JSON)
//! - Applying the parameter changes of a simulation to a model file
//! - Reading the variables and parameters of a model file
//! - Printing the JSON schema of the object model
//!
//! # Usage
//!
//! ```bash
//! # Write a simulation as SED-ML L1V3
//! biosimulations write --simulation simulation.json --output simulation.sedml
//!
//! # Read a SED-ML document
//! biosimulations read simulation.sedml --output simulations.json
//!
//! # Inspect an SBML model
//! biosimulations inspect-model model.xml
//! ```

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use biosimulations::biomodel::data_model::BiomodelFormat;
use biosimulations::biomodel::sbml::read_biomodel;
use biosimulations::io::{load_simulation, load_visualization, save_simulations, save_visualization};
use biosimulations::sedml::modify::modify_xml_model_for_simulation;
use biosimulations::simulation::core::{read_simulation, write_simulation, WriteOptions};
use biosimulations::simulation::data_model::{Simulation, SimulationFormat};
use biosimulations::simulation::warnings::Warnings;
use biosimulations::visualization::data_model::Visualization;

/// Main CLI configuration struct
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Write a simulation as a SED-ML document
    Write {
        /// Path to the simulation (JSON)
        #[arg(short, long)]
        simulation: PathBuf,

        /// Path to a visualization of the simulation's results (JSON)
        #[arg(long)]
        visualization: Option<PathBuf>,

        /// Path of the SED-ML document to write
        #[arg(short, long)]
        output: PathBuf,

        /// SED-ML level
        #[arg(long, default_value_t = 1)]
        level: u8,

        /// SED-ML version
        #[arg(long = "sedml-version", default_value_t = 3)]
        version: u8,
    },
    /// Read the simulations and visualization of a SED-ML document
    Read {
        /// Path to the SED-ML document
        path: PathBuf,

        /// Path to save the simulations to (JSON). Printed if omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to save the visualization to (JSON)
        #[arg(long)]
        visualization: Option<PathBuf>,
    },
    /// Apply the model parameter changes of a simulation to a model file
    ModifyModel {
        /// Path to the simulation (JSON)
        #[arg(short, long)]
        simulation: PathBuf,

        /// Path to the model file
        #[arg(short, long)]
        model: PathBuf,

        /// Path of the modified model. Overwrites the model if omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the variables and parameters of a model file
    InspectModel {
        /// Path to the model file
        path: PathBuf,

        /// Modeling language of the file
        #[arg(short, long, value_enum, default_value_t = ModelLanguage::Sbml)]
        format: ModelLanguage,
    },
    /// Print the JSON schema of an object model type
    Schema {
        #[arg(value_enum, default_value_t = SchemaKind::Simulation)]
        kind: SchemaKind,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModelLanguage {
    Sbml,
    Cellml,
    Neuroml,
}

impl From<ModelLanguage> for BiomodelFormat {
    fn from(language: ModelLanguage) -> Self {
        match language {
            ModelLanguage::Sbml => BiomodelFormat::Sbml,
            ModelLanguage::Cellml => BiomodelFormat::CellMl,
            ModelLanguage::Neuroml => BiomodelFormat::NeuroMl,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaKind {
    Simulation,
    Visualization,
}

/// Main entry point for the CLI application
pub fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(error) = run(cli.command) {
        eprintln!("{} {}", "Error:".bold().red(), error);
        process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Write {
            simulation,
            visualization,
            output,
            level,
            version,
        } => {
            let simulation = load_simulation(simulation)?;
            let visualization = visualization.map(load_visualization).transpose()?;

            let warnings = write_simulation(
                &simulation,
                &output,
                SimulationFormat::SedMl,
                visualization.as_ref(),
                &WriteOptions { level, version },
            )?;
            print_warnings(&warnings);
            println!("{} {}", "Written".bold().green(), output.display());
        }
        Commands::Read {
            path,
            output,
            visualization,
        } => {
            let read = read_simulation(&path, SimulationFormat::SedMl)?;
            print_warnings(&read.warnings);

            match output {
                Some(output) => save_simulations(output, &read.simulations)?,
                None => println!("{}", serde_json::to_string_pretty(&read.simulations)?),
            }
            if let (Some(path), Some(visualization)) = (visualization, &read.visualization) {
                save_visualization(path, visualization)?;
            }
        }
        Commands::ModifyModel {
            simulation,
            model,
            output,
        } => {
            let simulation = load_simulation(simulation)?;
            let output = output.unwrap_or_else(|| model.clone());
            modify_xml_model_for_simulation(&simulation, &model, &output)?;
            println!("{} {}", "Modified".bold().green(), output.display());
        }
        Commands::InspectModel { path, format } => {
            let model = read_biomodel(&path, format.into())?;
            println!("{}", serde_json::to_string_pretty(&model)?);
        }
        Commands::Schema { kind } => {
            let schema = match kind {
                SchemaKind::Simulation => schemars::schema_for!(Simulation),
                SchemaKind::Visualization => schemars::schema_for!(Visualization),
            };
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

fn print_warnings(warnings: &Warnings) {
    for warning in warnings.iter() {
        eprintln!("{warning}");
    }
}
