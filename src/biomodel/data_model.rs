//! Data model of simulable biological models.
//!
//! A [`Biomodel`] references a model file in some modeling language and lists the
//! parameters that a simulation may change and the variables it may record. Both
//! are addressed inside the model document by XPath-like targets.

use std::fmt;
use std::str::FromStr;

use derive_builder::Builder;
use lazy_static::lazy_static;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::data_model::{Format, Identifier, RemoteFile, ValueType};
use crate::simulation::data_model::ParameterValue;

/// SED-ML symbol that denotes simulation time.
pub const TIME_SYMBOL: &str = "urn:sedml:symbol:time";

/// Identifier of the time pseudo-variable.
pub const TIME_VARIABLE_ID: &str = "time";

lazy_static! {
    /// The time pseudo-variable, shared by every model.
    pub static ref TIME_VARIABLE: BiomodelVariable = BiomodelVariable {
        id: TIME_VARIABLE_ID.to_string(),
        target: TIME_SYMBOL.to_string(),
        ..Default::default()
    };
}

/// A simulable model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Builder, Default)]
pub struct Biomodel {
    /// Identifier of the model.
    #[builder(setter(into))]
    pub id: String,

    /// Human readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    /// Format of the model file, including its SED-ML language URN.
    #[builder(default)]
    pub format: Format,

    /// The model file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub file: Option<RemoteFile>,

    /// Parameters that simulations may change.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_parameters")))]
    pub parameters: Vec<BiomodelParameter>,

    /// Quantities that simulations may record.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_variables")))]
    pub variables: Vec<BiomodelVariable>,

    /// Identifiers of the model in external databases.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_identifiers")))]
    pub identifiers: Vec<Identifier>,
}

impl Biomodel {
    /// Looks up a variable by its identifier. The time pseudo-variable is always found.
    pub fn variable(&self, id: &str) -> Option<&BiomodelVariable> {
        if id == TIME_VARIABLE_ID {
            return Some(&*TIME_VARIABLE);
        }
        self.variables.iter().find(|variable| variable.id == id)
    }

    /// Looks up the first variable addressing the given target.
    pub fn variable_by_target(&self, target: &str) -> Option<&BiomodelVariable> {
        self.variables.iter().find(|variable| variable.target == target)
    }
}

/// A parameter of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Builder, Default)]
pub struct BiomodelParameter {
    /// Address of the parameter within the model (e.g. an XPath to an attribute).
    #[builder(setter(into))]
    pub target: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    /// Group used to organise parameters for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub value_type: Option<ValueType>,

    /// Default value of the parameter in the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub value: Option<ParameterValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub units: Option<String>,
}

impl BiomodelParameter {
    pub(crate) fn sort_key(&self) -> (String, Option<String>, Option<String>) {
        (self.target.clone(), self.id.clone(), self.name.clone())
    }
}

/// A variable of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Builder, Default)]
pub struct BiomodelVariable {
    /// Identifier of the variable.
    #[builder(setter(into))]
    pub id: String,

    /// Address of the variable within the model (e.g. an XPath to a species).
    #[builder(setter(into))]
    pub target: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub value_type: Option<ValueType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub units: Option<String>,
}

impl BiomodelVariable {
    /// Whether this is the time pseudo-variable.
    pub fn is_time(&self) -> bool {
        self.target == TIME_SYMBOL
    }

    /// Name for display, falling back to the identifier.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Modeling languages known to the object model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum BiomodelFormat {
    Bngl,
    CellMl,
    Kappa,
    Mml,
    NeuroMl,
    PharmMl,
    Sbml,
}

impl BiomodelFormat {
    const ALL: [BiomodelFormat; 7] = [
        BiomodelFormat::Bngl,
        BiomodelFormat::CellMl,
        BiomodelFormat::Kappa,
        BiomodelFormat::Mml,
        BiomodelFormat::NeuroMl,
        BiomodelFormat::PharmMl,
        BiomodelFormat::Sbml,
    ];

    /// Returns the format metadata of the modeling language.
    pub fn format(&self) -> Format {
        let (id, name, edam_id, spec_url, mime_type, extension, sed_urn) = match self {
            BiomodelFormat::Bngl => (
                "BNGL",
                "BioNetGen Language",
                None,
                "https://bionetgen.org/",
                "text/plain",
                "bngl",
                None,
            ),
            BiomodelFormat::CellMl => (
                "CellML",
                "CellML",
                Some("format_3240"),
                "http://identifiers.org/combine.specifications/cellml",
                "application/cellml+xml",
                "cellml",
                Some("urn:sedml:language:cellml"),
            ),
            BiomodelFormat::Kappa => (
                "Kappa",
                "Kappa",
                None,
                "https://kappalanguage.org/",
                "text/plain",
                "ka",
                None,
            ),
            BiomodelFormat::Mml => (
                "MML",
                "Multiscale Modeling Language",
                None,
                "https://doi.org/10.1016/j.procs.2010.04.089",
                "application/xml",
                "xml",
                None,
            ),
            BiomodelFormat::NeuroMl => (
                "NeuroML",
                "NeuroML",
                None,
                "http://identifiers.org/combine.specifications/neuroml",
                "application/xml",
                "nml",
                Some("urn:sedml:language:neuroml"),
            ),
            BiomodelFormat::PharmMl => (
                "pharmML",
                "Pharmacometrics Markup Language",
                None,
                "http://www.pharmml.org/",
                "application/xml",
                "xml",
                None,
            ),
            BiomodelFormat::Sbml => (
                "SBML",
                "Systems Biology Markup Language",
                Some("format_2585"),
                "http://identifiers.org/combine.specifications/sbml",
                "application/sbml+xml",
                "xml",
                Some("urn:sedml:language:sbml"),
            ),
        };

        Format {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            version: None,
            edam_id: edam_id.map(str::to_string),
            url: None,
            spec_url: Some(spec_url.to_string()),
            mime_type: Some(mime_type.to_string()),
            extension: Some(extension.to_string()),
            sed_urn: sed_urn.map(str::to_string),
        }
    }

    /// Finds the modeling language whose SED-ML URN matches `sed_urn`.
    ///
    /// Versioned URNs such as `urn:sedml:language:sbml.level-3.version-1` match
    /// their base language.
    pub fn from_sed_urn(sed_urn: &str) -> Option<BiomodelFormat> {
        Self::ALL.into_iter().find(|format| {
            format.format().sed_urn.is_some_and(|urn| {
                sed_urn == urn
                    || sed_urn
                        .strip_prefix(urn.as_str())
                        .is_some_and(|rest| rest.starts_with('.'))
            })
        })
    }
}

impl fmt::Display for BiomodelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format().id.unwrap_or_default())
    }
}

impl FromStr for BiomodelFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| {
                format
                    .format()
                    .id
                    .is_some_and(|id| id.eq_ignore_ascii_case(s))
            })
            .ok_or_else(|| format!("Unknown model format: {s}"))
    }
}
