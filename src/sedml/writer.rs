//! SED-ML writer.
//!
//! Encodes one [`Simulation`] into a SED-ML document:
//!
//! - the model with one `changeAttribute` per model parameter change
//! - a `uniformTimeCourse` or `steadyState` simulation with its algorithm and
//!   algorithm parameters
//! - a task linking the two
//! - a report with one data generator for time and one per model variable
//! - optionally, one `plot2D` per chart of a visualization
//!
//! Metadata without a native SED-ML attribute is carried in RDF annotations (see
//! [`super::annotations`]). Every annotated element receives a `metaid` from the
//! writer session; ids are numbered from `_00000001` in each call.

use chrono::Utc;

use super::annotations::{encode_annotation, encode_id_name, encode_metadata, XmlNode};
use super::document::{
    check_sid, SedAlgorithm, SedAlgorithmParameter, SedBase, SedChange, SedCurve, SedDataGenerator,
    SedDataSet, SedDocument, SedModel, SedOutput, SedOutputKind, SedSimulation, SedSimulationKind,
    SedTask, SedTaskKind, SedVariable,
};
use super::kisao::format_kisao_id;
use super::version::SedMlVersion;
use crate::biomodel::data_model::{BiomodelVariable, TIME_SYMBOL, TIME_VARIABLE_ID};
use crate::simulation::core::{EncodedSimulation, SimulationWriter, WriteOptions};
use crate::simulation::data_model::{Simulation, SimulationFormat, SimulationKind, SimulationResult};
use crate::simulation::error::SimulationIoError;
use crate::simulation::warnings::{WarningKind, Warnings};
use crate::visualization::data_model::Visualization;

/// Writes simulations as SED-ML.
#[derive(Debug, Clone, Copy, Default)]
pub struct SedMlSimulationWriter;

impl SimulationWriter for SedMlSimulationWriter {
    fn encode(
        &self,
        simulation: &Simulation,
        visualization: Option<&Visualization>,
        options: &WriteOptions,
    ) -> Result<EncodedSimulation, SimulationIoError> {
        let expected_version = format!("L{}V{}", options.level, options.version);
        if simulation.format.id.as_deref() != Some(SimulationFormat::SedMl.id())
            || simulation.format.version.as_deref() != Some(expected_version.as_str())
        {
            return Err(SimulationIoError::FormatMismatch {
                level: options.level,
                version: options.version,
            });
        }

        let version = SedMlVersion::new(options.level, options.version)?;
        let mut session = WriterSession::new(simulation);
        let document = session.write(version, visualization)?;

        Ok(EncodedSimulation {
            bytes: document.to_xml()?.into_bytes(),
            warnings: session.warnings,
        })
    }
}

/// State of one write call.
struct WriterSession<'a> {
    simulation: &'a Simulation,
    meta_ids: u32,
    warnings: Warnings,
}

impl<'a> WriterSession<'a> {
    fn new(simulation: &'a Simulation) -> Self {
        Self {
            simulation,
            meta_ids: 0,
            warnings: Warnings::new(),
        }
    }

    fn next_meta_id(&mut self) -> String {
        self.meta_ids += 1;
        format!("_{:08}", self.meta_ids)
    }

    /// Assigns a `metaid` and an annotation to `base`, if there is anything to annotate.
    fn annotate(&mut self, base: &mut SedBase, nodes: &[XmlNode]) {
        if nodes.is_empty() {
            return;
        }
        let meta_id = self.next_meta_id();
        base.annotation = encode_annotation(Some(&meta_id), nodes);
        base.meta_id = Some(meta_id);
    }

    fn write(
        &mut self,
        version: SedMlVersion,
        visualization: Option<&Visualization>,
    ) -> Result<SedDocument, SimulationIoError> {
        let simulation = self.simulation;
        check_sid(&simulation.id)?;

        let mut document = SedDocument::new(version);
        let metadata = encode_metadata(&simulation.metadata, Some(&simulation.id), Utc::now());
        self.annotate(&mut document.base, &metadata);

        let model = self.model()?;
        let sed_simulation = self.simulation_element()?;
        let task = SedTask {
            base: SedBase::new(&simulation.id, simulation.metadata.name.as_deref()),
            kind: SedTaskKind::Task {
                model_reference: model.base.id.clone(),
                simulation_reference: sed_simulation.base.id.clone(),
            },
        };

        let (data_generators, report) = self.report()?;

        document.models.push(model);
        document.simulations.push(sed_simulation);
        document.tasks.push(task);
        document.data_generators = data_generators;
        document.outputs.push(report);

        if let Some(visualization) = visualization {
            let plots = self.plots(visualization);
            document.outputs.extend(plots);
        }

        Ok(document)
    }

    fn model(&mut self) -> Result<SedModel, SimulationIoError> {
        let simulation = self.simulation;
        let model = &simulation.model;
        check_sid(&model.id)?;

        let mut changes = Vec::with_capacity(simulation.model_parameter_changes.len());
        for change in &simulation.model_parameter_changes {
            let mut base = SedBase::default();
            let nodes = encode_id_name(change.parameter.id.as_deref(), change.parameter.name.as_deref());
            self.annotate(&mut base, &nodes);

            changes.push(SedChange::Attribute {
                base,
                target: change.parameter.target.clone(),
                new_value: change.value.to_string(),
            });
        }

        Ok(SedModel {
            base: SedBase::new(&model.id, model.name.as_deref()),
            language: model.format.sed_urn.clone(),
            source: model.file.as_ref().map(|file| file.name.clone()),
            changes,
        })
    }

    fn simulation_element(&mut self) -> Result<SedSimulation, SimulationIoError> {
        let simulation = self.simulation;

        let kind = match &simulation.kind {
            SimulationKind::Timecourse(timecourse) => SedSimulationKind::UniformTimeCourse {
                initial_time: timecourse.start_time,
                output_start_time: timecourse.output_start_time,
                output_end_time: timecourse.end_time,
                number_of_points: timecourse.num_time_points,
            },
            SimulationKind::SteadyState => SedSimulationKind::SteadyState,
        };

        let algorithm = &simulation.algorithm;
        let mut algorithm_base = SedBase::default();
        self.annotate(
            &mut algorithm_base,
            &encode_id_name(algorithm.id.as_deref(), algorithm.name.as_deref()),
        );

        let mut parameters = Vec::with_capacity(simulation.algorithm_parameter_changes.len());
        for change in &simulation.algorithm_parameter_changes {
            let mut base = SedBase::default();
            self.annotate(
                &mut base,
                &encode_id_name(change.parameter.id.as_deref(), change.parameter.name.as_deref()),
            );
            parameters.push(SedAlgorithmParameter {
                base,
                kisao_id: format_kisao_id(&change.parameter.kisao_term)?,
                value: change.value.to_string(),
            });
        }

        Ok(SedSimulation {
            base: SedBase::new(
                format!("{}_simulation", simulation.id),
                simulation.metadata.name.as_deref(),
            ),
            kind,
            algorithm: Some(SedAlgorithm {
                base: algorithm_base,
                kisao_id: format_kisao_id(&algorithm.kisao_term)?,
                parameters,
            }),
        })
    }

    /// Data generators for time and each model variable, and the report listing them.
    fn report(&mut self) -> Result<(Vec<SedDataGenerator>, SedOutput), SimulationIoError> {
        let simulation = self.simulation;
        let time = BiomodelVariable {
            id: TIME_VARIABLE_ID.to_string(),
            target: TIME_SYMBOL.to_string(),
            ..Default::default()
        };

        let mut variables = vec![&time];
        for variable in simulation.model.variables.iter().filter(|variable| !variable.is_time()) {
            if variable.id == TIME_VARIABLE_ID {
                self.warnings.push(
                    WarningKind::ReservedVariableId,
                    &simulation.id,
                    format!(
                        "Variable {} of {} uses the id reserved for time",
                        variable.target, simulation.model.id
                    ),
                );
                continue;
            }
            variables.push(variable);
        }

        let mut data_generators = Vec::new();
        let mut data_sets = Vec::new();
        for variable in variables {
            check_sid(&variable.id)?;
            let label = variable.label();

            let mut sed_variable = SedVariable {
                base: SedBase::new(&variable.id, Some(label)),
                task_reference: Some(simulation.id.clone()),
                ..Default::default()
            };
            if variable.is_time() {
                sed_variable.symbol = Some(TIME_SYMBOL.to_string());
            } else {
                sed_variable.target = Some(variable.target.clone());
            }

            data_generators.push(SedDataGenerator {
                base: SedBase::new(&variable.id, Some(label)),
                variables: vec![sed_variable],
                parameters: Vec::new(),
                math: Some(SedDataGenerator::identity_math(&variable.id)),
            });
            data_sets.push(SedDataSet {
                base: SedBase::new(&variable.id, None),
                label: Some(label.to_string()),
                data_reference: Some(variable.id.clone()),
            });
        }

        let report = SedOutput {
            base: SedBase::new(
                format!("{}_report", simulation.id),
                simulation.metadata.name.as_deref(),
            ),
            kind: SedOutputKind::Report(data_sets),
        };

        Ok((data_generators, report))
    }

    /// One 2D plot per chart whose results can be paired into curves.
    fn plots(&mut self, visualization: &Visualization) -> Vec<SedOutput> {
        let mut plots = Vec::new();

        for (index, element) in visualization.layout.iter().enumerate() {
            let plot_id = format!("plot_{}", index + 1);

            let x = self.resolve_results(&plot_id, element.field("x").map(|field| &field.simulation_results));
            let y = self.resolve_results(&plot_id, element.field("y").map(|field| &field.simulation_results));
            if x.is_empty() || y.is_empty() {
                continue;
            }

            let pairs: Vec<(&BiomodelVariable, &BiomodelVariable)> = if x.len() == 1 {
                y.iter().map(|y| (x[0], *y)).collect()
            } else if x.len() == y.len() {
                x.iter().copied().zip(y.iter().copied()).collect()
            } else {
                self.warnings.push(
                    WarningKind::UnpairedCurves,
                    &plot_id,
                    format!(
                        "{} X results cannot be paired with {} Y results of {}",
                        x.len(),
                        y.len(),
                        element.chart.id
                    ),
                );
                continue;
            };

            let curves = pairs
                .into_iter()
                .map(|(x, y)| curve(&plot_id, x, y, element.log_x(), element.log_y()))
                .collect();

            plots.push(SedOutput {
                base: SedBase::new(plot_id, None),
                kind: SedOutputKind::Plot2D(curves),
            });
        }

        plots
    }

    /// Variables of the results that belong to the simulation being written.
    fn resolve_results(
        &mut self,
        plot_id: &str,
        results: Option<&Vec<SimulationResult>>,
    ) -> Vec<&'a BiomodelVariable> {
        let simulation = self.simulation;
        let mut variables = Vec::new();

        for result in results.into_iter().flatten() {
            match result.resolve(std::slice::from_ref(simulation)) {
                Some((_, variable)) => variables.push(variable),
                None => self.warnings.push(
                    WarningKind::UnresolvedVisualizationResult,
                    plot_id,
                    format!(
                        "Result {} of simulation {} is not a variable of {}",
                        result.variable, result.simulation, simulation.id
                    ),
                ),
            }
        }

        variables
    }
}

fn curve(plot_id: &str, x: &BiomodelVariable, y: &BiomodelVariable, log_x: bool, log_y: bool) -> SedCurve {
    let (x_reference, name) = if x.is_time() {
        (TIME_VARIABLE_ID.to_string(), y.label().to_string())
    } else {
        (x.id.clone(), format!("{} vs. {}", y.label(), x.label()))
    };

    SedCurve {
        base: SedBase::new(format!("{plot_id}_{}_{}", y.id, x.id), Some(&name)),
        log_x,
        log_y,
        x_data_reference: Some(x_reference),
        y_data_reference: Some(y.id.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biomodel::data_model::{BiomodelBuilder, BiomodelFormat, BiomodelVariableBuilder};
    use crate::data_model::OntologyTerm;
    use crate::simulation::data_model::{Algorithm, SimulationBuilder, TimecourseSimulation};
    use crate::visualization::data_model::VisualizationLayoutElement;

    fn simulation() -> Simulation {
        SimulationBuilder::default()
            .id("sim")
            .format(SimulationFormat::SedMl.format().with_version("L1V3"))
            .model(
                BiomodelBuilder::default()
                    .id("model")
                    .format(BiomodelFormat::Sbml.format())
                    .to_variables(
                        BiomodelVariableBuilder::default()
                            .id("A")
                            .target("/sbml:sbml/sbml:model/sbml:listOfSpecies/sbml:species[@id='A']")
                            .build()
                            .unwrap(),
                    )
                    .build()
                    .unwrap(),
            )
            .kind(SimulationKind::Timecourse(TimecourseSimulation {
                start_time: 0.0,
                output_start_time: 0.0,
                end_time: 10.0,
                num_time_points: 100,
            }))
            .algorithm(Algorithm {
                kisao_term: OntologyTerm::new("KISAO", "0000019"),
                ..Default::default()
            })
            .build()
            .unwrap()
    }

    fn encode(simulation: &Simulation, visualization: Option<&Visualization>) -> (SedDocument, Warnings) {
        let encoded = SedMlSimulationWriter
            .encode(simulation, visualization, &WriteOptions::default())
            .unwrap();
        let xml = String::from_utf8(encoded.bytes).unwrap();
        (SedDocument::parse(&xml).unwrap(), encoded.warnings)
    }

    #[test]
    fn test_document_structure() {
        let (document, warnings) = encode(&simulation(), None);

        assert!(warnings.is_empty());
        assert_eq!(document.models[0].language.as_deref(), Some("urn:sedml:language:sbml"));
        assert_eq!(document.simulations[0].base.id(), "sim_simulation");
        assert_eq!(
            document.tasks[0].kind,
            SedTaskKind::Task {
                model_reference: Some("model".to_string()),
                simulation_reference: Some("sim_simulation".to_string()),
            }
        );

        let ids: Vec<_> = document.data_generators.iter().map(|generator| generator.base.id()).collect();
        assert_eq!(ids, vec!["time", "A"]);
        assert_eq!(
            document.data_generators[0].trivial_variable().unwrap().symbol.as_deref(),
            Some(TIME_SYMBOL)
        );
        assert_eq!(document.base.meta_id.as_deref(), Some("_00000001"));
    }

    #[test]
    fn test_format_mismatch() {
        let error = SedMlSimulationWriter
            .encode(&simulation(), None, &WriteOptions { level: 1, version: 2 })
            .unwrap_err();

        assert_eq!(error.to_string(), "Format must be SED-ML L1V2");
    }

    #[test]
    fn test_invalid_ids_are_rejected() {
        let mut simulation = simulation();
        simulation.model.id = "my model".to_string();

        let error = SedMlSimulationWriter
            .encode(&simulation, None, &WriteOptions::default())
            .unwrap_err();

        assert!(matches!(error, SimulationIoError::Library(_)));
    }

    #[test]
    fn test_plots_skip_foreign_results() {
        let visualization = Visualization {
            layout: vec![
                VisualizationLayoutElement::line(
                    "line_logY",
                    vec![SimulationResult::new("sim", "time")],
                    vec![SimulationResult::new("sim", "A"), SimulationResult::new("other", "A")],
                ),
                VisualizationLayoutElement::line(
                    "line",
                    vec![SimulationResult::new("other", "time")],
                    vec![SimulationResult::new("sim", "A")],
                ),
            ],
            ..Default::default()
        };

        let (document, warnings) = encode(&simulation(), Some(&visualization));

        assert_eq!(warnings.of_kind(WarningKind::UnresolvedVisualizationResult).len(), 2);
        let plots: Vec<_> = document
            .outputs
            .iter()
            .filter_map(|output| match &output.kind {
                SedOutputKind::Plot2D(curves) => Some((output.base.id(), curves)),
                _ => None,
            })
            .collect();
        assert_eq!(plots.len(), 1);

        let (plot_id, curves) = &plots[0];
        assert_eq!(*plot_id, "plot_1");
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].base.id(), "plot_1_A_time");
        assert_eq!(curves[0].x_data_reference.as_deref(), Some("time"));
        assert!(!curves[0].log_x);
        assert!(curves[0].log_y);
    }

    #[test]
    fn test_variable_with_time_id_is_skipped() {
        let mut simulation = simulation();
        simulation.model.variables.push(
            BiomodelVariableBuilder::default()
                .id("time")
                .target("/sbml:sbml/sbml:model/sbml:listOfParameters/sbml:parameter[@id='time']")
                .build()
                .unwrap(),
        );

        let (document, warnings) = encode(&simulation, None);

        assert_eq!(warnings.of_kind(WarningKind::ReservedVariableId).len(), 1);
        let ids: Vec<_> = document.data_generators.iter().map(|generator| generator.base.id()).collect();
        assert_eq!(ids, vec!["time", "A"]);
    }
}
