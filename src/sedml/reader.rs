//! SED-ML reader.
//!
//! Decodes a SED-ML document into one [`Simulation`] per task and, if any plot
//! can be interpreted, a [`Visualization`].
//!
//! ## Resolution
//!
//! Models and simulations are collected first, keyed by id. A task that does not
//! reference a model (or references one that does not exist) falls back to the
//! default model: the model shared by every `<model>` element of the document. As
//! soon as two models disagree there is no default. Simulations are defaulted the
//! same way.
//!
//! Model variables are recovered from the data generators of each task that pass
//! one variable through unchanged. Curves of 2D plots are resolved from data
//! generator to task to simulation to variable.
//!
//! ## Diagnostics
//!
//! Structural problems (duplicate model ids, unsupported simulation types, tasks
//! whose model cannot be determined) abort the read with a [`SimulationIoError`].
//! Problems confined to one task, curve or plot are recorded as warnings and the
//! affected part is skipped.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use super::annotations::{decode_annotation, decode_id_name, decode_metadata};
use super::document::{
    SedBase, SedChange, SedCurve, SedDocument, SedModel, SedOutputKind, SedSimulation, SedSimulationKind,
    SedTaskKind, SedVariable,
};
use super::kisao::parse_kisao_id;
use crate::biomodel::data_model::{
    Biomodel, BiomodelFormat, BiomodelParameter, BiomodelVariable, TIME_SYMBOL, TIME_VARIABLE_ID,
};
use crate::data_model::{Format, RemoteFile, ResourceMetadata};
use crate::simulation::core::{ReadOutput, SimulationReader};
use crate::simulation::data_model::{
    Algorithm, AlgorithmParameter, ParameterChange, ParameterValue, Simulation, SimulationFormat,
    SimulationKind, SimulationResult, TimecourseSimulation,
};
use crate::simulation::error::SimulationIoError;
use crate::simulation::warnings::{WarningKind, Warnings};
use crate::visualization::data_model::{Visualization, VisualizationLayoutElement};
use crate::xml::error::XmlError;

/// Reads simulations from SED-ML.
#[derive(Debug, Clone, Copy, Default)]
pub struct SedMlSimulationReader;

impl SimulationReader for SedMlSimulationReader {
    fn decode(&self, bytes: &[u8], source: &str) -> Result<ReadOutput, SimulationIoError> {
        let xml = std::str::from_utf8(bytes).map_err(XmlError::from)?;
        let document = SedDocument::parse(xml)?;
        ReaderSession::new(&document, source).read()
    }
}

/// A value shared by all siblings of a document, if they agree.
///
/// The first offered value becomes the default. Any later value that differs
/// revokes it for good.
#[derive(Debug)]
struct SharedDefault<T> {
    value: Option<T>,
    revoked: bool,
}

impl<T: Clone + PartialEq> SharedDefault<T> {
    fn new() -> Self {
        Self {
            value: None,
            revoked: false,
        }
    }

    fn offer(&mut self, candidate: &T) {
        if self.revoked {
            return;
        }
        match &self.value {
            None => self.value = Some(candidate.clone()),
            Some(value) if value == candidate => {}
            Some(_) => {
                self.value = None;
                self.revoked = true;
            }
        }
    }

    fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

/// A `<model>` decoded into the parts of a simulation it determines.
#[derive(Debug, Clone, PartialEq)]
struct ModelTemplate {
    model: Biomodel,
    changes: Vec<ParameterChange<BiomodelParameter>>,
}

/// A `<simulation>` decoded into the parts of a simulation it determines.
#[derive(Debug, Clone, PartialEq)]
struct SimulationTemplate {
    kind: SimulationKind,
    algorithm: Algorithm,
    changes: Vec<ParameterChange<AlgorithmParameter>>,
}

/// State of one read call.
struct ReaderSession<'a> {
    document: &'a SedDocument,
    source: &'a str,
    warnings: Warnings,
}

impl<'a> ReaderSession<'a> {
    fn new(document: &'a SedDocument, source: &'a str) -> Self {
        Self {
            document,
            source,
            warnings: Warnings::new(),
        }
    }

    fn read(mut self) -> Result<ReadOutput, SimulationIoError> {
        let (models, default_model) = self.models()?;
        let (setups, default_setup) = self.simulations()?;
        let (simulations, task_index) = self.tasks(&models, &default_model, &setups, &default_setup)?;
        let visualization = self.visualization(&simulations, &task_index);

        Ok(ReadOutput {
            simulations,
            visualization,
            warnings: self.warnings,
        })
    }

    fn models(&self) -> Result<(HashMap<String, ModelTemplate>, SharedDefault<ModelTemplate>), SimulationIoError> {
        let mut models = HashMap::new();
        let mut default = SharedDefault::new();

        for model in &self.document.models {
            let id = model.base.id().to_string();
            if models.contains_key(&id) {
                return Err(SimulationIoError::DuplicateModelId(self.source.to_string()));
            }
            let template = self.model_template(model)?;
            default.offer(&template);
            models.insert(id, template);
        }

        Ok((models, default))
    }

    fn model_template(&self, model: &SedModel) -> Result<ModelTemplate, SimulationIoError> {
        let format = match model.language.as_deref() {
            Some(language) => match BiomodelFormat::from_sed_urn(language) {
                Some(known) => Format {
                    sed_urn: Some(language.to_string()),
                    ..known.format()
                },
                None => Format {
                    sed_urn: Some(language.to_string()),
                    ..Default::default()
                },
            },
            None => Format::default(),
        };

        let file = model.source.as_ref().map(|source| RemoteFile {
            name: source.clone(),
            mime_type: format.mime_type.clone(),
            size: None,
        });

        let mut changes = Vec::with_capacity(model.changes.len());
        for change in &model.changes {
            let SedChange::Attribute {
                base,
                target,
                new_value,
            } = change
            else {
                return Err(SimulationIoError::UnsupportedChange(self.source.to_string()));
            };

            let (id, name) = decode_id_name(&annotation_of(base));
            let parameter = BiomodelParameter {
                target: target.clone(),
                id,
                name,
                ..Default::default()
            };
            changes.push(ParameterChange::new(parameter, ParameterValue::parse(new_value)));
        }

        Ok(ModelTemplate {
            model: Biomodel {
                id: model.base.id().to_string(),
                name: model.base.name.clone(),
                format,
                file,
                ..Default::default()
            },
            changes,
        })
    }

    #[allow(clippy::type_complexity)]
    fn simulations(
        &self,
    ) -> Result<(HashMap<String, SimulationTemplate>, SharedDefault<SimulationTemplate>), SimulationIoError> {
        let mut setups = HashMap::new();
        let mut default = SharedDefault::new();

        for simulation in &self.document.simulations {
            let id = simulation.base.id().to_string();
            if setups.contains_key(&id) {
                return Err(SimulationIoError::DuplicateSimulationId(self.source.to_string()));
            }
            let template = self.simulation_template(simulation)?;
            default.offer(&template);
            setups.insert(id, template);
        }

        Ok((setups, default))
    }

    fn simulation_template(&self, simulation: &SedSimulation) -> Result<SimulationTemplate, SimulationIoError> {
        let id = simulation.base.id();

        let kind = match &simulation.kind {
            SedSimulationKind::UniformTimeCourse {
                initial_time,
                output_start_time,
                output_end_time,
                number_of_points,
            } => {
                if output_start_time < initial_time {
                    return Err(SimulationIoError::OutputStartBeforeStart(id.to_string()));
                }
                SimulationKind::Timecourse(TimecourseSimulation {
                    start_time: *initial_time,
                    output_start_time: *output_start_time,
                    end_time: *output_end_time,
                    num_time_points: *number_of_points,
                })
            }
            SedSimulationKind::SteadyState => SimulationKind::SteadyState,
            SedSimulationKind::Other(kind) => {
                return Err(SimulationIoError::UnsupportedSimulationType {
                    kind: kind.clone(),
                    location: self.source.to_string(),
                });
            }
        };

        let sed_algorithm = simulation
            .algorithm
            .as_ref()
            .ok_or_else(|| SimulationIoError::MissingAlgorithm(id.to_string()))?;

        let (algorithm_id, algorithm_name) = decode_id_name(&annotation_of(&sed_algorithm.base));
        let algorithm = Algorithm {
            id: algorithm_id,
            name: algorithm_name,
            kisao_term: parse_kisao_id(&sed_algorithm.kisao_id)?,
        };

        let mut changes = Vec::with_capacity(sed_algorithm.parameters.len());
        for parameter in &sed_algorithm.parameters {
            let (id, name) = decode_id_name(&annotation_of(&parameter.base));
            changes.push(ParameterChange::new(
                AlgorithmParameter {
                    id,
                    name,
                    kisao_term: parse_kisao_id(&parameter.kisao_id)?,
                    value_type: None,
                },
                ParameterValue::parse(&parameter.value),
            ));
        }

        Ok(SimulationTemplate {
            kind,
            algorithm,
            changes,
        })
    }

    /// One simulation per plain task, and the index of each unambiguous task id.
    #[allow(clippy::type_complexity)]
    fn tasks(
        &mut self,
        models: &HashMap<String, ModelTemplate>,
        default_model: &SharedDefault<ModelTemplate>,
        setups: &HashMap<String, SimulationTemplate>,
        default_setup: &SharedDefault<SimulationTemplate>,
    ) -> Result<(Vec<Simulation>, HashMap<String, Option<usize>>), SimulationIoError> {
        let document = self.document;
        let source = self.source;
        let metadata = decode_metadata(&annotation_of(&document.base));

        let mut simulations = Vec::new();
        let mut task_index: HashMap<String, Option<usize>> = HashMap::new();

        for task in &document.tasks {
            let task_id = task.base.id();

            let (model_reference, simulation_reference) = match &task.kind {
                SedTaskKind::Task {
                    model_reference,
                    simulation_reference,
                } => (model_reference.as_deref(), simulation_reference.as_deref()),
                SedTaskKind::Other(kind) => {
                    self.warnings.push(
                        WarningKind::UnsupportedTask,
                        task_id,
                        format!("{kind} {task_id} of {source} is not supported"),
                    );
                    continue;
                }
            };

            let model = resolve(model_reference, models, default_model, "Model", task_id).ok_or_else(|| {
                SimulationIoError::UndeterminedModel {
                    model: model_reference.unwrap_or_default().to_string(),
                    location: source.to_string(),
                }
            })?;
            let setup = resolve(simulation_reference, setups, default_setup, "Simulation", task_id).ok_or_else(|| {
                SimulationIoError::UndeterminedSimulation {
                    simulation: simulation_reference.unwrap_or_default().to_string(),
                    location: source.to_string(),
                }
            })?;

            let mut biomodel = model.model.clone();
            biomodel.variables = self.task_variables(task_id);

            let simulation = Simulation {
                id: task_id.to_string(),
                metadata: ResourceMetadata {
                    name: task.base.name.clone().or_else(|| metadata.name.clone()),
                    ..metadata.clone()
                },
                format: SimulationFormat::SedMl
                    .format()
                    .with_version(document.version.to_string()),
                model: biomodel,
                model_parameter_changes: model.changes.clone(),
                kind: setup.kind.clone(),
                algorithm: setup.algorithm.clone(),
                algorithm_parameter_changes: setup.changes.clone(),
            };

            if task_index.contains_key(task_id) {
                self.warnings.push(
                    WarningKind::DuplicateTaskId,
                    task_id,
                    format!("Tasks of {source} must have unique ids"),
                );
                log::error!("Task id {task_id} is used more than once in {source}; curves cannot refer to it");
                task_index.insert(task_id.to_string(), None);
            } else {
                task_index.insert(task_id.to_string(), Some(simulations.len()));
            }
            simulations.push(simulation);
        }

        Ok((simulations, task_index))
    }

    /// Variables recorded by the pass-through data generators of a task.
    ///
    /// Time is implicit in every model. A targeted variable using its reserved id is
    /// skipped with a warning.
    fn task_variables(&mut self, task_id: &str) -> Vec<BiomodelVariable> {
        let document = self.document;
        let warnings = &mut self.warnings;

        document
            .data_generators
            .iter()
            .filter_map(|generator| generator.trivial_variable())
            .filter(|variable| variable.task_reference.as_deref() == Some(task_id))
            .filter(|variable| variable.symbol.as_deref() != Some(TIME_SYMBOL))
            .filter_map(|variable| {
                let target = variable.target.as_ref()?;
                let id = variable.base.id().to_string();
                if id == TIME_VARIABLE_ID {
                    warnings.push(
                        WarningKind::ReservedVariableId,
                        task_id,
                        format!("Variable {target} of task {task_id} uses the id reserved for time"),
                    );
                    return None;
                }
                let name = variable.base.name.clone().filter(|name| *name != id);
                Some(BiomodelVariable {
                    id,
                    target: target.clone(),
                    name,
                    ..Default::default()
                })
            })
            .unique_by(|variable| variable.id.clone())
            .collect()
    }

    fn visualization(
        &mut self,
        simulations: &[Simulation],
        task_index: &HashMap<String, Option<usize>>,
    ) -> Option<Visualization> {
        let document = self.document;
        let source = self.source;

        let mut generators: HashMap<&str, Option<&SedVariable>> = HashMap::new();
        let mut time_generators: HashSet<&str> = HashSet::new();
        for generator in &document.data_generators {
            let Some(variable) = generator.trivial_variable() else {
                continue;
            };
            let id = generator.base.id();
            if generators.contains_key(id) {
                self.warnings.push(
                    WarningKind::DuplicateDataGeneratorId,
                    id,
                    format!("Data generators of {source} must have unique ids"),
                );
                generators.insert(id, None);
                time_generators.remove(id);
                continue;
            }
            generators.insert(id, Some(variable));
            if variable.target.is_none() && variable.symbol.as_deref() == Some(TIME_SYMBOL) {
                time_generators.insert(id);
            }
        }

        let resolver = CurveResolver {
            simulations,
            task_index,
            generators: &generators,
            time_generators: &time_generators,
        };

        let mut layout = Vec::new();
        for output in &document.outputs {
            let output_id = output.base.id();
            match &output.kind {
                SedOutputKind::Report(_) => {}
                SedOutputKind::Other(kind) => self.warnings.push(
                    WarningKind::UnsupportedOutput,
                    output_id,
                    format!("{kind} {output_id} of {source} is not supported"),
                ),
                SedOutputKind::Plot2D(curves) => {
                    if let Some(element) = self.plot(output_id, curves, &resolver) {
                        layout.push(element);
                    }
                }
            }
        }

        if layout.is_empty() {
            None
        } else {
            Some(Visualization {
                layout,
                ..Default::default()
            })
        }
    }

    fn plot(&mut self, plot_id: &str, curves: &[SedCurve], resolver: &CurveResolver<'_>) -> Option<VisualizationLayoutElement> {
        let source = self.source;

        let mut resolved = Vec::new();
        for curve in curves {
            match resolver.curve(curve) {
                Ok(curve) => resolved.push(curve),
                Err(reason) => {
                    log::error!("{reason}");
                    self.warnings.push(
                        WarningKind::UnresolvedCurve,
                        plot_id,
                        format!("Unable to interpret curve of {source}"),
                    );
                }
            }
        }

        let first = resolved.first()?;
        let (log_x, log_y) = (first.log_x, first.log_y);

        let distinct_x = resolved
            .iter()
            .map(|curve| (curve.x_reference, curve.log_x))
            .unique()
            .count();
        let x = if distinct_x == 1 {
            vec![first.x.clone()]
        } else if resolved
            .iter()
            .all(|curve| curve.x.variable == TIME_VARIABLE_ID && curve.log_x == log_x)
        {
            resolved.iter().map(|curve| curve.x.clone()).collect()
        } else {
            self.warnings.push(
                WarningKind::InconsistentAxes,
                plot_id,
                format!("Curves of {plot_id} in {source} must have the same X axis"),
            );
            return None;
        };

        if resolved.iter().any(|curve| curve.log_y != log_y) {
            self.warnings.push(
                WarningKind::InconsistentAxes,
                plot_id,
                format!("Curves of {plot_id} in {source} must have the same Y axis"),
            );
            return None;
        }

        let mut chart = String::from("line");
        if log_x {
            chart.push_str("_logX");
        }
        if log_y {
            chart.push_str("_logY");
        }

        let y = resolved.into_iter().map(|curve| curve.y).collect();
        Some(VisualizationLayoutElement::line(chart, x, y))
    }
}

/// A curve whose data references resolved to simulation results.
struct ResolvedCurve<'c> {
    x_reference: &'c str,
    x: SimulationResult,
    y: SimulationResult,
    log_x: bool,
    log_y: bool,
}

/// Lookups needed to resolve curves to simulation results.
struct CurveResolver<'r> {
    simulations: &'r [Simulation],
    task_index: &'r HashMap<String, Option<usize>>,
    generators: &'r HashMap<&'r str, Option<&'r SedVariable>>,
    time_generators: &'r HashSet<&'r str>,
}

impl CurveResolver<'_> {
    fn curve<'c>(&self, curve: &'c SedCurve) -> Result<ResolvedCurve<'c>, String> {
        let x_reference = curve
            .x_data_reference
            .as_deref()
            .ok_or_else(|| format!("Curve {} has no X data reference", curve.base.id()))?;
        let y_reference = curve
            .y_data_reference
            .as_deref()
            .ok_or_else(|| format!("Curve {} has no Y data reference", curve.base.id()))?;

        Ok(ResolvedCurve {
            x_reference,
            x: self.result(x_reference)?,
            y: self.result(y_reference)?,
            log_x: curve.log_x,
            log_y: curve.log_y,
        })
    }

    /// Resolves a data generator id to the result it records.
    fn result(&self, generator_id: &str) -> Result<SimulationResult, String> {
        let variable = self
            .generators
            .get(generator_id)
            .copied()
            .flatten()
            .ok_or_else(|| format!("Data generator {generator_id} cannot be determined"))?;

        let task_id = variable.task_reference.as_deref().unwrap_or_default();
        let simulation = self
            .task_index
            .get(task_id)
            .copied()
            .flatten()
            .and_then(|index| self.simulations.get(index))
            .ok_or_else(|| format!("Task {task_id} of data generator {generator_id} cannot be determined"))?;

        if self.time_generators.contains(generator_id) {
            return Ok(SimulationResult::new(&simulation.id, TIME_VARIABLE_ID));
        }

        let target = variable.target.as_deref().unwrap_or_default();
        let model_variable = simulation
            .model
            .variable_by_target(target)
            .ok_or_else(|| format!("Variable {target} of data generator {generator_id} cannot be determined"))?;

        Ok(SimulationResult::new(&simulation.id, &model_variable.id))
    }
}

/// Looks up a referenced sibling, falling back to the shared default.
fn resolve<'t, T: Clone + PartialEq>(
    reference: Option<&str>,
    lookup: &'t HashMap<String, T>,
    default: &'t SharedDefault<T>,
    kind: &str,
    task_id: &str,
) -> Option<&'t T> {
    if let Some(found) = reference.and_then(|reference| lookup.get(reference)) {
        return Some(found);
    }
    if let Some(reference) = reference {
        log::error!("{kind} {reference} of task {task_id} does not exist; using the default");
    }
    default.get()
}

fn annotation_of(base: &SedBase) -> Vec<super::annotations::XmlNode> {
    decode_annotation(base.annotation.as_ref(), base.meta_id.as_deref())
}
