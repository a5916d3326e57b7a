//! Reading models from SBML files.
//!
//! Only the parts of a model that simulations refer to are read: species become
//! variables that can be recorded, global parameters become parameters that can be
//! changed. Both are addressed by the XPath targets SED-ML uses for them.

use std::fs;
use std::path::Path;

use super::data_model::{Biomodel, BiomodelFormat, BiomodelParameter, BiomodelVariable};
use super::error::BiomodelIoError;
use crate::data_model::RemoteFile;
use crate::simulation::data_model::ParameterValue;
use crate::xml::dom::{self, Element};

const SPECIES_PATH: &str = "/sbml:sbml/sbml:model/sbml:listOfSpecies/sbml:species";
const PARAMETER_PATH: &str = "/sbml:sbml/sbml:model/sbml:listOfParameters/sbml:parameter";

/// Reads models of one modeling language.
pub trait BiomodelReader {
    /// Reads the model file at `path`.
    ///
    /// # Errors
    ///
    /// Returns a `BiomodelIoError` if the file cannot be read or is not a valid
    /// model.
    fn read(&self, path: &Path) -> Result<Biomodel, BiomodelIoError>;
}

/// Reads SBML models.
#[derive(Debug, Clone, Copy, Default)]
pub struct SbmlModelReader;

impl BiomodelReader for SbmlModelReader {
    fn read(&self, path: &Path) -> Result<Biomodel, BiomodelIoError> {
        let xml = fs::read_to_string(path)?;
        let mut model = parse_sbml(&xml)?;

        model.file = Some(RemoteFile {
            name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            mime_type: model.format.mime_type.clone(),
            size: Some(xml.len() as u64),
        });

        Ok(model)
    }
}

/// Reads a model file.
///
/// # Arguments
///
/// * `path` - Path to the model file
/// * `format` - Modeling language of the file
///
/// # Returns
///
/// The model with its variables, parameters, format and file reference.
///
/// # Errors
///
/// Returns `BiomodelIoError::UnsupportedFormat` for languages other than SBML, and
/// other `BiomodelIoError`s if the file cannot be read.
pub fn read_biomodel(path: impl AsRef<Path>, format: BiomodelFormat) -> Result<Biomodel, BiomodelIoError> {
    match format {
        BiomodelFormat::Sbml => SbmlModelReader.read(path.as_ref()),
        other => Err(BiomodelIoError::UnsupportedFormat(other.to_string())),
    }
}

/// Parses an SBML document.
///
/// The returned model has no file reference.
pub fn parse_sbml(xml: &str) -> Result<Biomodel, BiomodelIoError> {
    let root = dom::parse(xml)?;
    if root.local_name() != "sbml" {
        return Err(BiomodelIoError::UnexpectedRoot {
            expected: "sbml".to_string(),
            found: root.name.clone(),
        });
    }

    let mut format = BiomodelFormat::Sbml.format();
    if let (Some(level), Some(version)) = (root.attribute("level"), root.attribute("version")) {
        format = format.with_version(format!("L{level}V{version}"));
    }

    let sbml_model = root.child("model").ok_or(BiomodelIoError::MissingModel)?;
    let id = sbml_model
        .attribute("id")
        .ok_or(BiomodelIoError::MissingModelId)?;

    let variables = sbml_model
        .list("listOfSpecies")
        .filter(|element| element.local_name() == "species")
        .map(species_variable)
        .collect::<Result<Vec<_>, _>>()?;

    let parameters = sbml_model
        .list("listOfParameters")
        .filter(|element| element.local_name() == "parameter")
        .map(global_parameter)
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(
        "Read SBML model {id} with {} species and {} parameters",
        variables.len(),
        parameters.len()
    );

    Ok(Biomodel {
        id: id.to_string(),
        name: sbml_model.attribute("name").map(str::to_string),
        format,
        file: None,
        parameters,
        variables,
        identifiers: Vec::new(),
    })
}

fn species_variable(species: &Element) -> Result<BiomodelVariable, BiomodelIoError> {
    let id = species
        .attribute("id")
        .ok_or_else(|| BiomodelIoError::MissingElementId("Species".to_string()))?;

    Ok(BiomodelVariable {
        id: id.to_string(),
        target: format!("{SPECIES_PATH}[@id='{id}']"),
        name: species.attribute("name").map(str::to_string),
        units: species.attribute("substanceUnits").map(str::to_string),
        ..Default::default()
    })
}

fn global_parameter(parameter: &Element) -> Result<BiomodelParameter, BiomodelIoError> {
    let id = parameter
        .attribute("id")
        .ok_or_else(|| BiomodelIoError::MissingElementId("Parameter".to_string()))?;

    Ok(BiomodelParameter {
        target: format!("{PARAMETER_PATH}[@id='{id}']/@value"),
        id: Some(id.to_string()),
        name: parameter.attribute("name").map(str::to_string),
        value: parameter.attribute("value").map(ParameterValue::parse),
        units: parameter.attribute("units").map(str::to_string),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sbml xmlns="http://www.sbml.org/sbml/level3/version2/core" level="3" version="2">
  <model id="decay" name="Decay">
    <listOfSpecies>
      <species id="A" name="Substrate" compartment="c" initialConcentration="10"/>
      <species id="B" compartment="c" initialConcentration="0"/>
    </listOfSpecies>
    <listOfParameters>
      <parameter id="k" value="0.5" constant="true"/>
    </listOfParameters>
  </model>
</sbml>"#;

    #[test]
    fn test_parse_species_and_parameters() {
        let model = parse_sbml(MODEL).unwrap();

        assert_eq!(model.id, "decay");
        assert_eq!(model.name.as_deref(), Some("Decay"));
        assert_eq!(model.format.version.as_deref(), Some("L3V2"));
        assert_eq!(model.format.sed_urn.as_deref(), Some("urn:sedml:language:sbml"));

        let ids: Vec<_> = model.variables.iter().map(|variable| variable.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(
            model.variables[0].target,
            "/sbml:sbml/sbml:model/sbml:listOfSpecies/sbml:species[@id='A']"
        );
        assert_eq!(model.variables[0].name.as_deref(), Some("Substrate"));

        assert_eq!(model.parameters.len(), 1);
        assert_eq!(
            model.parameters[0].target,
            "/sbml:sbml/sbml:model/sbml:listOfParameters/sbml:parameter[@id='k']/@value"
        );
        assert_eq!(model.parameters[0].value, Some(ParameterValue::Float(0.5)));
    }

    #[test]
    fn test_missing_model() {
        let error = parse_sbml(r#"<sbml level="3" version="2"/>"#).unwrap_err();
        assert!(matches!(error, BiomodelIoError::MissingModel));
    }

    #[test]
    fn test_other_formats_are_not_supported() {
        let error = read_biomodel("model.cellml", BiomodelFormat::CellMl).unwrap_err();
        assert_eq!(error.to_string(), "Models in CellML format cannot be read");
    }
}
