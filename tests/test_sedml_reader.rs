//! Tests for the SED-ML reader.
//!
//! The documents in `tests/data` are hand-crafted and exercise defaulting of
//! model and simulation references, unsupported simulation types and the
//! interpretation of plots.

#[cfg(test)]
mod test_sedml_reader {
    use biosimulations::prelude::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tasks_fall_back_to_default_model_and_simulation() {
        // ARRANGE
        let path = "tests/data/defaults.sedml";

        // ACT
        let read = read_simulation(path, SimulationFormat::SedMl).unwrap();

        // ASSERT
        assert_eq!(read.simulations.len(), 2);
        let ids: Vec<_> = read.simulations.iter().map(|simulation| simulation.id.as_str()).collect();
        assert_eq!(ids, vec!["task_1", "task_2"]);

        for simulation in &read.simulations {
            assert_eq!(simulation.model.id, "decay");
            assert_eq!(simulation.model.file.as_ref().unwrap().name, "decay.xml");
            assert_eq!(simulation.model_parameter_changes.len(), 1);
            assert_eq!(simulation.model_parameter_changes[0].value, ParameterValue::Float(0.25));
            assert_eq!(
                simulation.timecourse().map(|timecourse| timecourse.num_time_points),
                Some(100)
            );
            assert_eq!(simulation.model.variables.len(), 1);
            assert_eq!(simulation.model.variables[0].id, "species_1");
        }
    }

    #[test]
    fn test_curves_of_several_tasks_share_time_axis() {
        // ARRANGE
        let path = "tests/data/defaults.sedml";

        // ACT
        let read = read_simulation(path, SimulationFormat::SedMl).unwrap();

        // ASSERT
        let visualization = read.visualization.unwrap();
        assert_eq!(
            visualization.layout,
            vec![VisualizationLayoutElement::line(
                "line",
                vec![SimulationResult::new("task_1", "time")],
                vec![
                    SimulationResult::new("task_1", "species_1"),
                    SimulationResult::new("task_2", "species_1"),
                ],
            )]
        );
        assert!(read.warnings.is_empty());
    }

    #[test]
    fn test_one_step_simulation_is_unsupported() {
        // ARRANGE
        let path = "tests/data/one_step.sedml";

        // ACT
        let error = read_simulation(path, SimulationFormat::SedMl).unwrap_err();

        // ASSERT
        assert!(matches!(error, SimulationIoError::UnsupportedSimulationType { .. }));
        assert!(error.to_string().contains("Unsupported simulation type"));
        assert_eq!(
            error.to_string(),
            "Unsupported simulation type: oneStep in one_step.sedml"
        );
    }

    #[test]
    fn test_plot_with_mixed_y_scales_is_dropped() {
        // ARRANGE
        let path = "tests/data/mixed_log_y.sedml";

        // ACT
        let read = read_simulation(path, SimulationFormat::SedMl).unwrap();

        // ASSERT
        let visualization = read.visualization.unwrap();
        assert_eq!(
            visualization.layout,
            vec![VisualizationLayoutElement::line(
                "line_logY",
                vec![SimulationResult::new("task", "time")],
                vec![SimulationResult::new("task", "species_1")],
            )]
        );

        assert!(read.warnings.contains("must have the same Y axis"));
        assert_eq!(read.warnings.of_kind(WarningKind::InconsistentAxes).len(), 1);
        assert_eq!(read.warnings.of_kind(WarningKind::DuplicateDataGeneratorId).len(), 1);
        assert_eq!(read.warnings.of_kind(WarningKind::UnresolvedCurve).len(), 1);
    }

    #[test]
    fn test_duplicate_data_generators_still_define_one_variable() {
        // ARRANGE
        let path = "tests/data/mixed_log_y.sedml";

        // ACT
        let read = read_simulation(path, SimulationFormat::SedMl).unwrap();

        // ASSERT
        let ids: Vec<_> = read.simulations[0]
            .model
            .variables
            .iter()
            .map(|variable| variable.id.as_str())
            .collect();
        assert_eq!(ids, vec!["species_1", "species_2"]);
    }

    #[test]
    fn test_output_start_before_start_is_rejected() {
        // ARRANGE
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sedML xmlns="http://sed-ml.org/sed-ml/level1/version3" level="1" version="3">
  <listOfSimulations>
    <uniformTimeCourse id="timecourse" initialTime="5" outputStartTime="0" outputEndTime="10" numberOfPoints="10">
      <algorithm kisaoID="KISAO:0000019"/>
    </uniformTimeCourse>
  </listOfSimulations>
</sedML>"#;

        // ACT
        let error = codec(SimulationFormat::SedMl)
            .unwrap()
            .reader
            .decode(xml.as_bytes(), "inline.sedml")
            .unwrap_err();

        // ASSERT
        assert!(matches!(error, SimulationIoError::OutputStartBeforeStart(_)));
    }

    #[test]
    fn test_duplicate_models_are_rejected() {
        // ARRANGE
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sedML xmlns="http://sed-ml.org/sed-ml/level1/version3" level="1" version="3">
  <listOfModels>
    <model id="decay" language="urn:sedml:language:sbml" source="a.xml"/>
    <model id="decay" language="urn:sedml:language:sbml" source="b.xml"/>
  </listOfModels>
</sedML>"#;

        // ACT
        let error = codec(SimulationFormat::SedMl)
            .unwrap()
            .reader
            .decode(xml.as_bytes(), "inline.sedml")
            .unwrap_err();

        // ASSERT
        assert_eq!(error.to_string(), "Models in inline.sedml must have unique ids");
    }

    #[test]
    fn test_duplicate_task_ids_are_not_plotted() {
        // ARRANGE
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sedML xmlns="http://sed-ml.org/sed-ml/level1/version3" level="1" version="3">
  <listOfSimulations>
    <steadyState id="ss"><algorithm kisaoID="KISAO:0000019"/></steadyState>
  </listOfSimulations>
  <listOfModels>
    <model id="decay" language="urn:sedml:language:sbml" source="decay.xml"/>
  </listOfModels>
  <listOfTasks>
    <task id="task" modelReference="decay" simulationReference="ss"/>
    <task id="task" modelReference="decay" simulationReference="ss"/>
  </listOfTasks>
  <listOfDataGenerators>
    <dataGenerator id="species_1">
      <listOfVariables>
        <variable id="species_1" target="/sbml:sbml/sbml:model/sbml:listOfSpecies/sbml:species[@id='species_1']" taskReference="task"/>
      </listOfVariables>
      <math xmlns="http://www.w3.org/1998/Math/MathML"><ci>species_1</ci></math>
    </dataGenerator>
  </listOfDataGenerators>
  <listOfOutputs>
    <plot2D id="plot">
      <listOfCurves>
        <curve id="curve" logX="false" logY="false" xDataReference="species_1" yDataReference="species_1"/>
      </listOfCurves>
    </plot2D>
  </listOfOutputs>
</sedML>"#;

        // ACT
        let read = codec(SimulationFormat::SedMl)
            .unwrap()
            .reader
            .decode(xml.as_bytes(), "inline.sedml")
            .unwrap();

        // ASSERT
        assert_eq!(read.simulations.len(), 2);
        assert!(read.warnings.contains("Tasks of inline.sedml must have unique ids"));
        assert!(read.warnings.contains("Unable to interpret curve of inline.sedml"));
        assert!(read.visualization.is_none());
    }

    #[test]
    fn test_curves_with_separate_time_axes_keep_every_x() {
        // ARRANGE
        let path = "tests/data/x_axes.sedml";

        // ACT
        let read = read_simulation(path, SimulationFormat::SedMl).unwrap();

        // ASSERT
        let visualization = read.visualization.unwrap();
        assert_eq!(
            visualization.layout[0],
            VisualizationLayoutElement::line(
                "line_logX_logY",
                vec![
                    SimulationResult::new("task_1", "time"),
                    SimulationResult::new("task_2", "time"),
                ],
                vec![
                    SimulationResult::new("task_1", "species_1"),
                    SimulationResult::new("task_2", "species_1"),
                ],
            )
        );
    }

    #[test]
    fn test_plot_with_mixed_x_axes_is_dropped() {
        // ARRANGE
        let path = "tests/data/x_axes.sedml";

        // ACT
        let read = read_simulation(path, SimulationFormat::SedMl).unwrap();

        // ASSERT
        let visualization = read.visualization.unwrap();
        assert_eq!(visualization.layout.len(), 2);
        assert_eq!(read.warnings.of_kind(WarningKind::InconsistentAxes).len(), 1);
        assert!(read
            .warnings
            .contains("Curves of crossed in x_axes.sedml must have the same X axis"));
        assert_eq!(read.warnings.len(), 1);
    }

    #[test]
    fn test_shared_species_x_axis_collapses() {
        // ARRANGE
        let path = "tests/data/x_axes.sedml";

        // ACT
        let read = read_simulation(path, SimulationFormat::SedMl).unwrap();

        // ASSERT
        let visualization = read.visualization.unwrap();
        assert_eq!(
            visualization.layout[1],
            VisualizationLayoutElement::line(
                "line_logX",
                vec![SimulationResult::new("task_1", "species_1")],
                vec![SimulationResult::new("task_1", "species_2")],
            )
        );
    }
}
