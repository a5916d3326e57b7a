//! Tests for reading SBML models and applying simulation changes to them.

#[cfg(test)]
mod test_model_files {
    use biosimulations::prelude::*;
    use biosimulations::sedml::modify::ModelChangeError;
    use pretty_assertions::assert_eq;

    const MODEL_PATH: &str = "tests/data/decay.xml";

    fn get_simulation(model: Biomodel, changes: Vec<ParameterChange<BiomodelParameter>>) -> Simulation {
        SimulationBuilder::default()
            .id("simulation")
            .format(SimulationFormat::SedMl.format().with_version("L1V3"))
            .model(model)
            .model_parameter_changes(changes)
            .build()
            .unwrap()
    }

    #[test]
    fn test_read_sbml_model() {
        // ACT
        let model = read_biomodel(MODEL_PATH, BiomodelFormat::Sbml).unwrap();

        // ASSERT
        assert_eq!(model.id, "decay");
        assert_eq!(model.name.as_deref(), Some("Exponential decay"));
        assert_eq!(model.file.as_ref().unwrap().name, "decay.xml");
        assert_eq!(
            model.file.as_ref().unwrap().mime_type.as_deref(),
            Some("application/sbml+xml")
        );

        let variable = model.variable("species_2").unwrap();
        assert_eq!(variable.label(), "Product");
        assert_eq!(variable.units.as_deref(), Some("mole"));

        let values: Vec<_> = model
            .parameters
            .iter()
            .map(|parameter| (parameter.id.clone().unwrap(), parameter.value.clone().unwrap()))
            .collect();
        assert_eq!(
            values,
            vec![
                ("k_decay".to_string(), ParameterValue::Float(0.5)),
                ("n_steps".to_string(), ParameterValue::Integer(3)),
            ]
        );
    }

    #[test]
    fn test_modify_model_with_read_parameters() {
        // ARRANGE
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("decay.xml");
        let model = read_biomodel(MODEL_PATH, BiomodelFormat::Sbml).unwrap();
        let changes = model
            .parameters
            .iter()
            .map(|parameter| ParameterChange::new(parameter.clone(), 7))
            .collect();
        let simulation = get_simulation(model, changes);

        // ACT
        modify_xml_model_for_simulation(&simulation, MODEL_PATH, &out_path).unwrap();
        let modified = read_biomodel(&out_path, BiomodelFormat::Sbml).unwrap();

        // ASSERT
        for parameter in &modified.parameters {
            assert_eq!(parameter.value, Some(ParameterValue::Integer(7)));
        }
        assert_eq!(modified.variables, read_biomodel(MODEL_PATH, BiomodelFormat::Sbml).unwrap().variables);
    }

    #[test]
    fn test_modify_model_rejects_unknown_target() {
        // ARRANGE
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("decay.xml");
        let model = read_biomodel(MODEL_PATH, BiomodelFormat::Sbml).unwrap();
        let changes = vec![ParameterChange::new(
            BiomodelParameterBuilder::default()
                .target("/sbml:sbml/sbml:model/sbml:listOfParameters/sbml:parameter[@id='k_missing']/@value")
                .build()
                .unwrap(),
            1.0,
        )];
        let simulation = get_simulation(model, changes);

        // ACT
        let error = modify_xml_model_for_simulation(&simulation, MODEL_PATH, &out_path).unwrap_err();

        // ASSERT
        assert!(matches!(error, ModelChangeError::AmbiguousTarget { count: 0, .. }));
        assert!(!out_path.exists());
    }
}
