//! Data model of simulation experiments.
//!
//! A [`Simulation`] pairs one [`Biomodel`] with the changes applied to its
//! parameters, the simulation algorithm (identified by a KiSAO term) and the
//! changes applied to the algorithm's parameters. Time courses additionally carry
//! their time bounds.
//!
//! Equality of simulations is structural, but the order of the parameter change
//! lists is irrelevant: both sides are sorted by an explicit key before comparing.

use std::fmt;
use std::str::FromStr;

use derive_builder::Builder;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::biomodel::data_model::{Biomodel, BiomodelParameter, BiomodelVariable};
use crate::data_model::{Format, OntologyTerm, ResourceMetadata, ValueType};

/// A simulation experiment.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default)]
pub struct Simulation {
    /// Identifier of the simulation.
    #[builder(setter(into))]
    pub id: String,

    /// Name, description, authors and other descriptive metadata.
    #[serde(default)]
    #[builder(default)]
    pub metadata: ResourceMetadata,

    /// Format the simulation is encoded in, such as SED-ML L1V3.
    #[serde(default)]
    #[builder(default)]
    pub format: Format,

    /// The simulated model.
    #[builder(default)]
    pub model: Biomodel,

    /// Changes to the parameters of the model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_model_parameter_changes")))]
    pub model_parameter_changes: Vec<ParameterChange<BiomodelParameter>>,

    /// Time course bounds, or steady state.
    #[serde(flatten)]
    #[builder(default)]
    pub kind: SimulationKind,

    /// The simulation algorithm.
    #[builder(default)]
    pub algorithm: Algorithm,

    /// Changes to the parameters of the algorithm.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_algorithm_parameter_changes")))]
    pub algorithm_parameter_changes: Vec<ParameterChange<AlgorithmParameter>>,
}

impl Simulation {
    /// Time course bounds, if this is a time course simulation.
    pub fn timecourse(&self) -> Option<&TimecourseSimulation> {
        match &self.kind {
            SimulationKind::Timecourse(timecourse) => Some(timecourse),
            SimulationKind::SteadyState => None,
        }
    }
}

impl PartialEq for Simulation {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.metadata == other.metadata
            && self.format == other.format
            && self.model == other.model
            && self.kind == other.kind
            && self.algorithm == other.algorithm
            && same_changes(&self.model_parameter_changes, &other.model_parameter_changes)
            && same_changes(
                &self.algorithm_parameter_changes,
                &other.algorithm_parameter_changes,
            )
    }
}

fn same_changes<P>(first: &[ParameterChange<P>], second: &[ParameterChange<P>]) -> bool
where
    P: ChangeTarget + PartialEq,
{
    first.len() == second.len()
        && first
            .iter()
            .sorted_by_key(|change| change.sort_key())
            .eq(second.iter().sorted_by_key(|change| change.sort_key()))
}

/// The kind of a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(tag = "_type")]
pub enum SimulationKind {
    /// A uniform time course.
    #[serde(rename = "TimecourseSimulation")]
    Timecourse(TimecourseSimulation),

    /// A simulation of the steady state of the model.
    #[default]
    #[serde(rename = "SteadyStateSimulation")]
    SteadyState,
}

/// Time bounds of a uniform time course.
///
/// Results are recorded at `num_time_points + 1` evenly spaced times between
/// `output_start_time` and `end_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Builder, Default)]
pub struct TimecourseSimulation {
    /// Initial time of the simulation.
    #[builder(default)]
    pub start_time: f64,

    /// Time at which recording of results starts. Never earlier than `start_time`.
    #[builder(default)]
    pub output_start_time: f64,

    /// Time at which the simulation ends.
    pub end_time: f64,

    /// Number of time points to record.
    pub num_time_points: u64,
}

/// A simulation algorithm, identified by a KiSAO term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Builder, Default)]
pub struct Algorithm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    /// KiSAO term of the algorithm (e.g. `KISAO:0000019` for CVODE).
    pub kisao_term: OntologyTerm,
}

/// A parameter of a simulation algorithm, identified by a KiSAO term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Builder, Default)]
pub struct AlgorithmParameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    /// KiSAO term of the parameter (e.g. `KISAO:0000211` for absolute tolerance).
    pub kisao_term: OntologyTerm,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub value_type: Option<ValueType>,
}

/// A scalar value assigned to a model or algorithm parameter.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl ParameterValue {
    /// Interprets a string as a boolean, integer, float or, failing those, a string.
    pub fn parse(value: &str) -> Self {
        match value {
            "true" => return ParameterValue::Bool(true),
            "false" => return ParameterValue::Bool(false),
            _ => {}
        }

        if let Ok(integer) = value.parse::<i64>() {
            ParameterValue::Integer(integer)
        } else if let Ok(float) = value.parse::<f64>() {
            ParameterValue::Float(float)
        } else {
            ParameterValue::String(value.to_string())
        }
    }

    /// Numeric value, if the value is an integer or a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterValue::Integer(integer) => Some(*integer as f64),
            ParameterValue::Float(float) => Some(*float),
            _ => None,
        }
    }

    fn sort_key(&self) -> (u8, OrderedFloat<f64>, String) {
        match self {
            ParameterValue::Bool(value) => (0, OrderedFloat(f64::from(u8::from(*value))), String::new()),
            ParameterValue::Integer(_) | ParameterValue::Float(_) => {
                (1, OrderedFloat(self.as_f64().unwrap_or_default()), String::new())
            }
            ParameterValue::String(value) => (2, OrderedFloat(0.0), value.clone()),
        }
    }
}

impl PartialEq for ParameterValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParameterValue::Bool(first), ParameterValue::Bool(second)) => first == second,
            (ParameterValue::String(first), ParameterValue::String(second)) => first == second,
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(first), Some(second)) => first == second,
                _ => false,
            },
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Bool(value) => write!(f, "{value}"),
            ParameterValue::Integer(value) => write!(f, "{value}"),
            // Debug keeps the decimal point so the value reads back as a float
            ParameterValue::Float(value) => write!(f, "{value:?}"),
            ParameterValue::String(value) => write!(f, "{value}"),
        }
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Bool(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Integer(value)
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        ParameterValue::Integer(i64::from(value))
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Float(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::String(value)
    }
}

/// Parameters that can be the target of a [`ParameterChange`].
pub trait ChangeTarget {
    /// Key used to order changes when comparing change lists.
    fn target_key(&self) -> (Option<String>, Option<String>, String);
}

impl ChangeTarget for BiomodelParameter {
    fn target_key(&self) -> (Option<String>, Option<String>, String) {
        let (target, id, name) = self.sort_key();
        (id, name, target)
    }
}

impl ChangeTarget for AlgorithmParameter {
    fn target_key(&self) -> (Option<String>, Option<String>, String) {
        let (ontology, id) = self.kisao_term.sort_key();
        (
            self.id.clone(),
            self.name.clone(),
            format!("{}:{}", ontology.unwrap_or_default(), id),
        )
    }
}

/// A new value for a model or algorithm parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParameterChange<P> {
    /// The changed parameter.
    pub parameter: P,

    /// The value the parameter is set to.
    pub value: ParameterValue,
}

impl<P> ParameterChange<P> {
    /// Creates a change of `parameter` to `value`.
    pub fn new(parameter: P, value: impl Into<ParameterValue>) -> Self {
        Self {
            parameter,
            value: value.into(),
        }
    }
}

impl<P: ChangeTarget> ParameterChange<P> {
    #[allow(clippy::type_complexity)]
    fn sort_key(
        &self,
    ) -> (
        (Option<String>, Option<String>, String),
        (u8, OrderedFloat<f64>, String),
    ) {
        (self.parameter.target_key(), self.value.sort_key())
    }
}

/// A result of a simulation: one variable recorded by one simulation.
///
/// Results refer to the simulation and variable by identifier; the objects
/// themselves are owned by the list of simulations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct SimulationResult {
    /// Identifier of the simulation.
    pub simulation: String,

    /// Identifier of the variable, `time` for the time pseudo-variable.
    pub variable: String,
}

impl SimulationResult {
    pub fn new(simulation: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            simulation: simulation.into(),
            variable: variable.into(),
        }
    }

    /// Resolves the result against a list of simulations.
    ///
    /// # Arguments
    ///
    /// * `simulations` - Simulations that may produce the result
    ///
    /// # Returns
    ///
    /// The simulation and variable the result refers to, or `None` if either
    /// cannot be found.
    pub fn resolve<'a>(
        &self,
        simulations: &'a [Simulation],
    ) -> Option<(&'a Simulation, &'a BiomodelVariable)> {
        let simulation = simulations
            .iter()
            .find(|simulation| simulation.id == self.simulation)?;
        let variable = simulation.model.variable(&self.variable)?;
        Some((simulation, variable))
    }
}

/// Formats in which simulation experiments can be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum SimulationFormat {
    /// Simulation Experiment Description Markup Language.
    SedMl,
    /// Simulation Experiment Specification via a Scala Layer.
    Sessl,
}

impl SimulationFormat {
    /// Short identifier of the format.
    pub fn id(&self) -> &'static str {
        match self {
            SimulationFormat::SedMl => "SED-ML",
            SimulationFormat::Sessl => "SESSL",
        }
    }

    /// Returns the format metadata.
    pub fn format(&self) -> Format {
        match self {
            SimulationFormat::SedMl => Format {
                id: Some(self.id().to_string()),
                name: Some("Simulation Experiment Description Markup Language".to_string()),
                edam_id: Some("format_3685".to_string()),
                url: Some("https://sed-ml.org/".to_string()),
                spec_url: Some(
                    "http://identifiers.org/combine.specifications/sed-ml".to_string(),
                ),
                mime_type: Some("application/xml".to_string()),
                extension: Some("sedml".to_string()),
                ..Default::default()
            },
            SimulationFormat::Sessl => Format {
                id: Some(self.id().to_string()),
                name: Some("Simulation Experiment Specification via a Scala Layer".to_string()),
                url: Some("http://sessl.org".to_string()),
                spec_url: Some("http://sessl.org".to_string()),
                mime_type: Some("text/plain".to_string()),
                extension: Some("scala".to_string()),
                ..Default::default()
            },
        }
    }
}

impl fmt::Display for SimulationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for SimulationFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sedml" => Ok(SimulationFormat::SedMl),
            "sessl" => Ok(SimulationFormat::Sessl),
            _ => Err(format!("Unknown simulation format: {s}")),
        }
    }
}
