//! Typed view of SED-ML documents.
//!
//! The structs in this module mirror the SED-ML elements used by the codec. They are
//! read from and written to the generic [`Element`] tree and know nothing about the
//! object model; the mapping between both lives in the writer and reader.
//!
//! ## Element kinds
//!
//! Elements of a list that the codec does not model (e.g. a `repeatedTask` or a
//! `oneStep` simulation) are kept as their `Other` variant with the element's local
//! name, so that the reader can decide whether they are an error or a warning.
//!
//! ## Document layout
//!
//! ```text
//! sedML
//! ├── annotation
//! ├── listOfSimulations   (uniformTimeCourse | steadyState)/algorithm
//! ├── listOfModels        model/listOfChanges/changeAttribute
//! ├── listOfTasks         task
//! ├── listOfDataGenerators dataGenerator/(listOfVariables | listOfParameters | math)
//! └── listOfOutputs       report/listOfDataSets | plot2D/listOfCurves
//! ```

use lazy_static::lazy_static;
use regex::Regex;

use super::version::{SedMlVersion, MATHML_NS};
use crate::simulation::error::SimulationIoError;
use crate::xml::dom::{self, Element};

lazy_static! {
    static ref SID: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex");
}

/// Checks that `id` is a valid SId.
///
/// # Errors
///
/// Returns `SimulationIoError::Library` if the id is not a valid SId.
pub fn check_sid(id: &str) -> Result<(), SimulationIoError> {
    if SID.is_match(id) {
        Ok(())
    } else {
        Err(SimulationIoError::Library(format!(
            "'{id}' is not a valid SId"
        )))
    }
}

/// Conversion between SED-ML elements and their typed representation.
pub trait SedElement: Sized {
    /// Reads the element.
    ///
    /// # Errors
    ///
    /// Returns `SimulationIoError::InvalidDocument` if a required attribute is
    /// missing or malformed.
    fn from_element(element: &Element) -> Result<Self, SimulationIoError>;

    /// Builds the element.
    fn to_element(&self) -> Element;
}

/// Attributes and annotation shared by all SED-ML elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SedBase {
    pub id: Option<String>,
    pub name: Option<String>,
    pub meta_id: Option<String>,
    pub annotation: Option<Element>,
}

impl SedBase {
    pub fn new(id: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.map(str::to_string),
            ..Default::default()
        }
    }

    fn read(element: &Element) -> Self {
        Self {
            id: element.attribute("id").map(str::to_string),
            name: element.attribute("name").map(str::to_string),
            meta_id: element.attribute("metaid").map(str::to_string),
            annotation: element.child("annotation").cloned(),
        }
    }

    /// Creates the element `name` carrying the shared attributes and annotation.
    fn element(&self, name: &str) -> Element {
        let mut element = Element::new(name);
        element.set_optional_attribute("metaid", self.meta_id.as_deref());
        element.set_optional_attribute("id", self.id.as_deref());
        element.set_optional_attribute("name", self.name.as_deref());
        if let Some(annotation) = &self.annotation {
            element.push(annotation.clone());
        }
        element
    }

    /// Identifier, or the empty string for anonymous elements.
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

fn describe(element: &Element) -> String {
    match element.attribute("id") {
        Some(id) => format!("{} '{}'", element.local_name(), id),
        None => element.local_name().to_string(),
    }
}

fn required<'a>(element: &'a Element, attribute: &str) -> Result<&'a str, SimulationIoError> {
    element.attribute(attribute).ok_or_else(|| {
        SimulationIoError::invalid(
            describe(element),
            format!("attribute '{attribute}' is required"),
        )
    })
}

fn parse_number<T: std::str::FromStr>(element: &Element, attribute: &str) -> Result<T, SimulationIoError> {
    let value = required(element, attribute)?;
    value.trim().parse().map_err(|_| {
        SimulationIoError::invalid(
            describe(element),
            format!("attribute '{attribute}' has the invalid value '{value}'"),
        )
    })
}

fn parse_bool(element: &Element, attribute: &str) -> Result<bool, SimulationIoError> {
    match element.attribute(attribute).map(str::trim) {
        None | Some("false") | Some("0") => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some(value) => Err(SimulationIoError::invalid(
            describe(element),
            format!("attribute '{attribute}' has the invalid value '{value}'"),
        )),
    }
}

fn read_list<T: SedElement>(element: &Element, list_name: &str) -> Result<Vec<T>, SimulationIoError> {
    element.list(list_name).map(T::from_element).collect()
}

fn push_list<'a, T: SedElement + 'a>(
    element: &mut Element,
    list_name: &str,
    items: impl IntoIterator<Item = &'a T>,
) {
    let mut list = Element::new(list_name);
    for item in items {
        list.push(item.to_element());
    }
    if list.elements().next().is_some() {
        element.push(list);
    }
}

/// A SED-ML document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SedDocument {
    pub version: SedMlVersion,
    pub base: SedBase,
    pub models: Vec<SedModel>,
    pub simulations: Vec<SedSimulation>,
    pub tasks: Vec<SedTask>,
    pub data_generators: Vec<SedDataGenerator>,
    pub outputs: Vec<SedOutput>,
}

impl SedDocument {
    /// Creates an empty document of the given level and version.
    pub fn new(version: SedMlVersion) -> Self {
        Self {
            version,
            ..Default::default()
        }
    }

    /// Parses a SED-ML document.
    ///
    /// # Arguments
    ///
    /// * `xml` - The document text
    ///
    /// # Returns
    ///
    /// The typed document.
    ///
    /// # Errors
    ///
    /// Returns a `SimulationIoError` if the text is not well-formed XML, the root is
    /// not a `sedML` element of a supported level and version, or an element lacks
    /// a required attribute.
    pub fn parse(xml: &str) -> Result<Self, SimulationIoError> {
        let root = dom::parse(xml)?;
        Self::from_element(&root)
    }

    /// Serializes the document, including the XML declaration.
    pub fn to_xml(&self) -> Result<String, SimulationIoError> {
        Ok(dom::to_string(&self.to_element())?)
    }
}

impl SedElement for SedDocument {
    fn from_element(root: &Element) -> Result<Self, SimulationIoError> {
        if root.local_name() != "sedML" {
            return Err(SimulationIoError::invalid(
                root.name.clone(),
                "root element must be sedML",
            ));
        }

        let version = SedMlVersion::new(parse_number(root, "level")?, parse_number(root, "version")?)?;

        let namespace_attribute = match root.prefix() {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        match root.attribute(&namespace_attribute) {
            Some(namespace) if SedMlVersion::from_namespace(namespace) == Some(version) => {}
            Some(namespace) => {
                return Err(SimulationIoError::invalid(
                    "sedML",
                    format!("namespace {namespace} does not match SED-ML {version}"),
                ))
            }
            None => {
                return Err(SimulationIoError::invalid(
                    "sedML",
                    "the SED-ML namespace is not declared",
                ))
            }
        }

        Ok(Self {
            version,
            base: SedBase::read(root),
            models: read_list(root, "listOfModels")?,
            simulations: read_list(root, "listOfSimulations")?,
            tasks: read_list(root, "listOfTasks")?,
            data_generators: read_list(root, "listOfDataGenerators")?,
            outputs: read_list(root, "listOfOutputs")?,
        })
    }

    fn to_element(&self) -> Element {
        let mut root = Element::new("sedML")
            .with_attribute("xmlns", self.version.namespace())
            .with_attribute("level", self.version.level().to_string())
            .with_attribute("version", self.version.version().to_string());
        root.set_optional_attribute("metaid", self.base.meta_id.as_deref());
        if let Some(annotation) = &self.base.annotation {
            root.push(annotation.clone());
        }

        push_list(&mut root, "listOfSimulations", &self.simulations);
        push_list(&mut root, "listOfModels", &self.models);
        push_list(&mut root, "listOfTasks", &self.tasks);
        push_list(&mut root, "listOfDataGenerators", &self.data_generators);
        push_list(&mut root, "listOfOutputs", &self.outputs);
        root
    }
}

/// A model and the changes applied to it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SedModel {
    pub base: SedBase,
    /// Language URN, e.g. `urn:sedml:language:sbml`
    pub language: Option<String>,
    /// Location of the model file
    pub source: Option<String>,
    pub changes: Vec<SedChange>,
}

impl SedElement for SedModel {
    fn from_element(element: &Element) -> Result<Self, SimulationIoError> {
        Ok(Self {
            base: SedBase::read(element),
            language: element.attribute("language").map(str::to_string),
            source: element.attribute("source").map(str::to_string),
            changes: read_list(element, "listOfChanges")?,
        })
    }

    fn to_element(&self) -> Element {
        let mut element = self.base.element("model");
        element.set_optional_attribute("language", self.language.as_deref());
        element.set_optional_attribute("source", self.source.as_deref());
        push_list(&mut element, "listOfChanges", &self.changes);
        element
    }
}

/// A change of a model.
#[derive(Debug, Clone, PartialEq)]
pub enum SedChange {
    /// Sets an attribute of the model to a new value
    Attribute {
        base: SedBase,
        target: String,
        new_value: String,
    },
    /// Any other change, by element name
    Other(String),
}

impl SedElement for SedChange {
    fn from_element(element: &Element) -> Result<Self, SimulationIoError> {
        if element.local_name() != "changeAttribute" {
            return Ok(SedChange::Other(element.local_name().to_string()));
        }
        Ok(SedChange::Attribute {
            base: SedBase::read(element),
            target: required(element, "target")?.to_string(),
            new_value: required(element, "newValue")?.to_string(),
        })
    }

    fn to_element(&self) -> Element {
        match self {
            SedChange::Attribute {
                base,
                target,
                new_value,
            } => base
                .element("changeAttribute")
                .with_attribute("target", target)
                .with_attribute("newValue", new_value),
            SedChange::Other(name) => Element::new(name),
        }
    }
}

/// Kind of a simulation element and its kind-specific attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum SedSimulationKind {
    UniformTimeCourse {
        initial_time: f64,
        output_start_time: f64,
        output_end_time: f64,
        number_of_points: u64,
    },
    SteadyState,
    /// Any other simulation, by element name
    Other(String),
}

/// A simulation setup.
#[derive(Debug, Clone, PartialEq)]
pub struct SedSimulation {
    pub base: SedBase,
    pub kind: SedSimulationKind,
    pub algorithm: Option<SedAlgorithm>,
}

impl SedElement for SedSimulation {
    fn from_element(element: &Element) -> Result<Self, SimulationIoError> {
        let kind = match element.local_name() {
            "uniformTimeCourse" => SedSimulationKind::UniformTimeCourse {
                initial_time: parse_number(element, "initialTime")?,
                output_start_time: parse_number(element, "outputStartTime")?,
                output_end_time: parse_number(element, "outputEndTime")?,
                number_of_points: parse_number(element, "numberOfPoints")?,
            },
            "steadyState" => SedSimulationKind::SteadyState,
            other => SedSimulationKind::Other(other.to_string()),
        };

        let algorithm = match element.child("algorithm") {
            Some(algorithm) => Some(SedAlgorithm::from_element(algorithm)?),
            None => None,
        };

        Ok(Self {
            base: SedBase::read(element),
            kind,
            algorithm,
        })
    }

    fn to_element(&self) -> Element {
        let mut element = match &self.kind {
            SedSimulationKind::UniformTimeCourse {
                initial_time,
                output_start_time,
                output_end_time,
                number_of_points,
            } => self
                .base
                .element("uniformTimeCourse")
                .with_attribute("initialTime", initial_time.to_string())
                .with_attribute("outputStartTime", output_start_time.to_string())
                .with_attribute("outputEndTime", output_end_time.to_string())
                .with_attribute("numberOfPoints", number_of_points.to_string()),
            SedSimulationKind::SteadyState => self.base.element("steadyState"),
            SedSimulationKind::Other(name) => self.base.element(name),
        };
        if let Some(algorithm) = &self.algorithm {
            element.push(algorithm.to_element());
        }
        element
    }
}

/// The algorithm of a simulation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SedAlgorithm {
    pub base: SedBase,
    pub kisao_id: String,
    pub parameters: Vec<SedAlgorithmParameter>,
}

impl SedElement for SedAlgorithm {
    fn from_element(element: &Element) -> Result<Self, SimulationIoError> {
        Ok(Self {
            base: SedBase::read(element),
            kisao_id: required(element, "kisaoID")?.to_string(),
            parameters: read_list(element, "listOfAlgorithmParameters")?,
        })
    }

    fn to_element(&self) -> Element {
        let mut element = self.base.element("algorithm").with_attribute("kisaoID", &self.kisao_id);
        push_list(&mut element, "listOfAlgorithmParameters", &self.parameters);
        element
    }
}

/// A parameter value of an algorithm.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SedAlgorithmParameter {
    pub base: SedBase,
    pub kisao_id: String,
    pub value: String,
}

impl SedElement for SedAlgorithmParameter {
    fn from_element(element: &Element) -> Result<Self, SimulationIoError> {
        Ok(Self {
            base: SedBase::read(element),
            kisao_id: required(element, "kisaoID")?.to_string(),
            value: required(element, "value")?.to_string(),
        })
    }

    fn to_element(&self) -> Element {
        self.base
            .element("algorithmParameter")
            .with_attribute("kisaoID", &self.kisao_id)
            .with_attribute("value", &self.value)
    }
}

/// A task. Only plain tasks link a model with a simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SedTask {
    pub base: SedBase,
    pub kind: SedTaskKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SedTaskKind {
    Task {
        model_reference: Option<String>,
        simulation_reference: Option<String>,
    },
    /// Any other task (e.g. `repeatedTask`), by element name
    Other(String),
}

impl SedElement for SedTask {
    fn from_element(element: &Element) -> Result<Self, SimulationIoError> {
        let kind = match element.local_name() {
            "task" => SedTaskKind::Task {
                model_reference: element.attribute("modelReference").map(str::to_string),
                simulation_reference: element.attribute("simulationReference").map(str::to_string),
            },
            other => SedTaskKind::Other(other.to_string()),
        };
        Ok(Self {
            base: SedBase::read(element),
            kind,
        })
    }

    fn to_element(&self) -> Element {
        match &self.kind {
            SedTaskKind::Task {
                model_reference,
                simulation_reference,
            } => {
                let mut element = self.base.element("task");
                element.set_optional_attribute("modelReference", model_reference.as_deref());
                element.set_optional_attribute("simulationReference", simulation_reference.as_deref());
                element
            }
            SedTaskKind::Other(name) => self.base.element(name),
        }
    }
}

/// A data generator: a mathematical expression over task variables.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SedDataGenerator {
    pub base: SedBase,
    pub variables: Vec<SedVariable>,
    pub parameters: Vec<SedParameter>,
    /// The MathML `math` element
    pub math: Option<Element>,
}

impl SedDataGenerator {
    /// A MathML expression consisting of the identifier `id`.
    pub fn identity_math(id: &str) -> Element {
        Element::new("math")
            .with_attribute("xmlns", MATHML_NS)
            .with_child(Element::new("ci").with_text(id))
    }

    /// The identifier the math consists of, if the math is a single `ci`.
    pub fn math_identifier(&self) -> Option<&str> {
        let math = self.math.as_ref()?;
        let mut children = math.elements();
        let ci = children.next()?;
        if children.next().is_some() || ci.local_name() != "ci" {
            return None;
        }
        let text = ci.children.iter().find_map(|node| match node {
            dom::Node::Text(text) => Some(text.trim()),
            dom::Node::Element(_) => None,
        })?;
        Some(text)
    }

    /// The variable of a data generator that passes one variable through unchanged.
    ///
    /// Such a generator has exactly one variable, no parameters, and math that is
    /// the identifier of the variable.
    pub fn trivial_variable(&self) -> Option<&SedVariable> {
        match (self.variables.as_slice(), self.parameters.is_empty()) {
            ([variable], true)
                if variable.base.id.is_some() && self.math_identifier() == variable.base.id.as_deref() =>
            {
                Some(variable)
            }
            _ => None,
        }
    }
}

impl SedElement for SedDataGenerator {
    fn from_element(element: &Element) -> Result<Self, SimulationIoError> {
        Ok(Self {
            base: SedBase::read(element),
            variables: read_list(element, "listOfVariables")?,
            parameters: read_list(element, "listOfParameters")?,
            math: element.child("math").cloned(),
        })
    }

    fn to_element(&self) -> Element {
        let mut element = self.base.element("dataGenerator");
        push_list(&mut element, "listOfVariables", &self.variables);
        push_list(&mut element, "listOfParameters", &self.parameters);
        if let Some(math) = &self.math {
            element.push(math.clone());
        }
        element
    }
}

/// A variable of a data generator, addressing a model quantity or a symbol.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SedVariable {
    pub base: SedBase,
    pub target: Option<String>,
    pub symbol: Option<String>,
    pub task_reference: Option<String>,
}

impl SedElement for SedVariable {
    fn from_element(element: &Element) -> Result<Self, SimulationIoError> {
        Ok(Self {
            base: SedBase::read(element),
            target: element.attribute("target").map(str::to_string),
            symbol: element.attribute("symbol").map(str::to_string),
            task_reference: element.attribute("taskReference").map(str::to_string),
        })
    }

    fn to_element(&self) -> Element {
        let mut element = self.base.element("variable");
        element.set_optional_attribute("taskReference", self.task_reference.as_deref());
        element.set_optional_attribute("target", self.target.as_deref());
        element.set_optional_attribute("symbol", self.symbol.as_deref());
        element
    }
}

/// A constant of a data generator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SedParameter {
    pub base: SedBase,
    pub value: String,
}

impl SedElement for SedParameter {
    fn from_element(element: &Element) -> Result<Self, SimulationIoError> {
        Ok(Self {
            base: SedBase::read(element),
            value: required(element, "value")?.to_string(),
        })
    }

    fn to_element(&self) -> Element {
        self.base.element("parameter").with_attribute("value", &self.value)
    }
}

/// An output of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct SedOutput {
    pub base: SedBase,
    pub kind: SedOutputKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SedOutputKind {
    Report(Vec<SedDataSet>),
    Plot2D(Vec<SedCurve>),
    /// Any other output (e.g. `plot3D`), by element name
    Other(String),
}

impl SedElement for SedOutput {
    fn from_element(element: &Element) -> Result<Self, SimulationIoError> {
        let kind = match element.local_name() {
            "report" => SedOutputKind::Report(read_list(element, "listOfDataSets")?),
            "plot2D" => SedOutputKind::Plot2D(read_list(element, "listOfCurves")?),
            other => SedOutputKind::Other(other.to_string()),
        };
        Ok(Self {
            base: SedBase::read(element),
            kind,
        })
    }

    fn to_element(&self) -> Element {
        match &self.kind {
            SedOutputKind::Report(data_sets) => {
                let mut element = self.base.element("report");
                push_list(&mut element, "listOfDataSets", data_sets);
                element
            }
            SedOutputKind::Plot2D(curves) => {
                let mut element = self.base.element("plot2D");
                push_list(&mut element, "listOfCurves", curves);
                element
            }
            SedOutputKind::Other(name) => self.base.element(name),
        }
    }
}

/// A column of a report.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SedDataSet {
    pub base: SedBase,
    pub label: Option<String>,
    pub data_reference: Option<String>,
}

impl SedElement for SedDataSet {
    fn from_element(element: &Element) -> Result<Self, SimulationIoError> {
        Ok(Self {
            base: SedBase::read(element),
            label: element.attribute("label").map(str::to_string),
            data_reference: element.attribute("dataReference").map(str::to_string),
        })
    }

    fn to_element(&self) -> Element {
        let mut element = self.base.element("dataSet");
        element.set_optional_attribute("label", self.label.as_deref());
        element.set_optional_attribute("dataReference", self.data_reference.as_deref());
        element
    }
}

/// A curve of a 2D plot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SedCurve {
    pub base: SedBase,
    pub log_x: bool,
    pub log_y: bool,
    pub x_data_reference: Option<String>,
    pub y_data_reference: Option<String>,
}

impl SedElement for SedCurve {
    fn from_element(element: &Element) -> Result<Self, SimulationIoError> {
        Ok(Self {
            base: SedBase::read(element),
            log_x: parse_bool(element, "logX")?,
            log_y: parse_bool(element, "logY")?,
            x_data_reference: element.attribute("xDataReference").map(str::to_string),
            y_data_reference: element.attribute("yDataReference").map(str::to_string),
        })
    }

    fn to_element(&self) -> Element {
        let mut element = self
            .base
            .element("curve")
            .with_attribute("logX", self.log_x.to_string())
            .with_attribute("logY", self.log_y.to_string());
        element.set_optional_attribute("xDataReference", self.x_data_reference.as_deref());
        element.set_optional_attribute("yDataReference", self.y_data_reference.as_deref());
        element
    }
}
