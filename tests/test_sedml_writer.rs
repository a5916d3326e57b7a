//! Tests for the SED-ML writer.
//!
//! Simulations are written to SED-ML and read back; the decoded simulations
//! and visualizations must equal the originals.

#[cfg(test)]
mod test_sedml_writer {
    use biosimulations::prelude::*;
    use biosimulations::sedml::writer::SedMlSimulationWriter;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn get_simulation() -> Simulation {
        let model = BiomodelBuilder::default()
            .id("decay")
            .name("Exponential decay")
            .format(BiomodelFormat::Sbml.format())
            .file(RemoteFile {
                name: "decay.xml".to_string(),
                mime_type: BiomodelFormat::Sbml.format().mime_type,
                size: None,
            })
            .to_variables(
                BiomodelVariableBuilder::default()
                    .id("species_1")
                    .name("Substrate")
                    .target("/sbml:sbml/sbml:model/sbml:listOfSpecies/sbml:species[@id='species_1']")
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();

        let metadata = ResourceMetadataBuilder::default()
            .name("Decay of species 1")
            .description("Decay with a halved rate")
            .to_tags("decay")
            .to_tags("tutorial")
            .to_authors(Person::new("Jane", "Doe"))
            .version(2)
            .created(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
            .build()
            .unwrap();

        SimulationBuilder::default()
            .id("simulation_1")
            .metadata(metadata)
            .format(SimulationFormat::SedMl.format().with_version("L1V3"))
            .model(model)
            .to_model_parameter_changes(ParameterChange::new(
                BiomodelParameterBuilder::default()
                    .target("/sbml:sbml/sbml:model/sbml:listOfParameters/sbml:parameter[@id='k_decay']/@value")
                    .id("k_decay")
                    .name("Decay rate")
                    .build()
                    .unwrap(),
                0.25,
            ))
            .kind(SimulationKind::Timecourse(TimecourseSimulation {
                start_time: 0.0,
                output_start_time: 0.0,
                end_time: 10.0,
                num_time_points: 100,
            }))
            .algorithm(Algorithm {
                id: Some("cvode".to_string()),
                name: Some("CVODE".to_string()),
                kisao_term: OntologyTerm::new("KISAO", "0000019"),
            })
            .to_algorithm_parameter_changes(ParameterChange::new(
                AlgorithmParameter {
                    id: Some("rtol".to_string()),
                    name: Some("Relative tolerance".to_string()),
                    kisao_term: OntologyTerm::new("KISAO", "0000209"),
                    value_type: None,
                },
                1e-6,
            ))
            .build()
            .unwrap()
    }

    fn get_visualization() -> Visualization {
        Visualization {
            layout: vec![VisualizationLayoutElement::line(
                "line_logY",
                vec![SimulationResult::new("simulation_1", "time")],
                vec![SimulationResult::new("simulation_1", "species_1")],
            )],
            ..Default::default()
        }
    }

    #[test]
    fn test_round_trip() {
        // ARRANGE
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simulation.sedml");
        let simulation = get_simulation();
        let visualization = get_visualization();

        // ACT
        let write_warnings = write_simulation(
            &simulation,
            &path,
            SimulationFormat::SedMl,
            Some(&visualization),
            &WriteOptions::default(),
        )
        .unwrap();
        let read = read_simulation(&path, SimulationFormat::SedMl).unwrap();

        // ASSERT
        assert!(write_warnings.is_empty());
        assert!(read.warnings.is_empty());
        assert_eq!(read.simulations, vec![simulation]);
        assert_eq!(read.visualization, Some(visualization));
    }

    #[test]
    fn test_time_course_and_algorithm_survive() {
        // ARRANGE
        let mut simulation = get_simulation();
        simulation.metadata = ResourceMetadata::default();
        simulation.model_parameter_changes.clear();
        simulation.algorithm_parameter_changes.clear();

        // ACT
        let encoded = SedMlSimulationWriter
            .encode(&simulation, None, &WriteOptions::default())
            .unwrap();
        let read = biosimulations::sedml::reader::SedMlSimulationReader
            .decode(&encoded.bytes, "simulation.sedml")
            .unwrap();

        // ASSERT
        let decoded = &read.simulations[0];
        assert_eq!(
            decoded.timecourse(),
            Some(&TimecourseSimulation {
                start_time: 0.0,
                output_start_time: 0.0,
                end_time: 10.0,
                num_time_points: 100,
            })
        );
        assert_eq!(decoded.algorithm.kisao_term, OntologyTerm::new("KISAO", "0000019"));
        assert_eq!(decoded.model.variables[0].id, "species_1");
        assert!(decoded.metadata.created.is_some());
        assert!(read.visualization.is_none());
    }

    #[test]
    fn test_writing_is_deterministic() {
        // ARRANGE
        let simulation = get_simulation();
        let visualization = get_visualization();
        let options = WriteOptions::default();

        // ACT
        let first = SedMlSimulationWriter
            .encode(&simulation, Some(&visualization), &options)
            .unwrap();
        let second = SedMlSimulationWriter
            .encode(&simulation, Some(&visualization), &options)
            .unwrap();

        // ASSERT
        assert_eq!(
            String::from_utf8(first.bytes).unwrap(),
            String::from_utf8(second.bytes).unwrap()
        );
    }

    #[test]
    fn test_other_levels_and_versions() {
        for (level, version, namespace) in [
            (1, 1, "http://sed-ml.org/"),
            (1, 2, "http://sed-ml.org/sed-ml/level1/version2"),
        ] {
            // ARRANGE
            let mut simulation = get_simulation();
            simulation.format = simulation.format.with_version(format!("L{level}V{version}"));

            // ACT
            let encoded = SedMlSimulationWriter
                .encode(&simulation, None, &WriteOptions { level, version })
                .unwrap();
            let xml = String::from_utf8(encoded.bytes).unwrap();
            let read = biosimulations::sedml::reader::SedMlSimulationReader
                .decode(xml.as_bytes(), "simulation.sedml")
                .unwrap();

            // ASSERT
            assert!(xml.contains(&format!(r#"xmlns="{namespace}""#)));
            assert_eq!(read.simulations, vec![simulation]);
        }
    }

    #[test]
    fn test_unsupported_level_version() {
        // ARRANGE
        let mut simulation = get_simulation();
        simulation.format = simulation.format.with_version("L2V1");

        // ACT
        let error = SedMlSimulationWriter
            .encode(&simulation, None, &WriteOptions { level: 2, version: 1 })
            .unwrap_err();

        // ASSERT
        assert!(matches!(
            error,
            SimulationIoError::UnsupportedLevelVersion { level: 2, version: 1 }
        ));
    }

    #[test]
    fn test_unpaired_curves_are_skipped() {
        // ARRANGE
        let simulation = get_simulation();
        let visualization = Visualization {
            layout: vec![VisualizationLayoutElement::line(
                "line",
                vec![
                    SimulationResult::new("simulation_1", "time"),
                    SimulationResult::new("simulation_1", "species_1"),
                ],
                vec![
                    SimulationResult::new("simulation_1", "species_1"),
                    SimulationResult::new("simulation_1", "time"),
                    SimulationResult::new("simulation_1", "species_1"),
                ],
            )],
            ..Default::default()
        };

        // ACT
        let encoded = SedMlSimulationWriter
            .encode(&simulation, Some(&visualization), &WriteOptions::default())
            .unwrap();

        // ASSERT
        assert_eq!(encoded.warnings.of_kind(WarningKind::UnpairedCurves).len(), 1);
        assert!(!String::from_utf8(encoded.bytes).unwrap().contains("plot2D"));
    }

    #[test]
    fn test_log_scales_survive() {
        // ARRANGE
        let simulation = get_simulation();
        let visualization = Visualization {
            layout: vec![VisualizationLayoutElement::line(
                "line_logX_logY",
                vec![SimulationResult::new("simulation_1", "time")],
                vec![SimulationResult::new("simulation_1", "species_1")],
            )],
            ..Default::default()
        };

        // ACT
        let encoded = SedMlSimulationWriter
            .encode(&simulation, Some(&visualization), &WriteOptions::default())
            .unwrap();
        let read = biosimulations::sedml::reader::SedMlSimulationReader
            .decode(&encoded.bytes, "simulation.sedml")
            .unwrap();

        // ASSERT
        assert!(read.warnings.is_empty());
        assert_eq!(read.visualization, Some(visualization));
    }
}
