//! Data model of visualizations of simulation results.
//!
//! A [`Visualization`] is a grid of charts. Each layout element names a chart and
//! binds the chart's data fields (`x` and `y` for line charts) to simulation
//! results. Results are references into a list of simulations by id; the
//! visualization never owns simulations or variables.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::simulation::data_model::SimulationResult;

/// A visualization of simulation results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct Visualization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Charts of the visualization, in display order.
    #[serde(default)]
    pub layout: Vec<VisualizationLayoutElement>,
}

/// One chart of a visualization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VisualizationLayoutElement {
    pub chart: Chart,

    /// Bindings of the chart's data fields to simulation results.
    pub data: Vec<VisualizationDataField>,
}

impl VisualizationLayoutElement {
    /// Creates a line chart plotting `y` results against `x` results.
    pub fn line(chart_id: impl Into<String>, x: Vec<SimulationResult>, y: Vec<SimulationResult>) -> Self {
        Self {
            chart: Chart::new(chart_id),
            data: vec![
                VisualizationDataField::dynamic("x", x),
                VisualizationDataField::dynamic("y", y),
            ],
        }
    }

    /// Results bound to the data field with the given name.
    pub fn field(&self, name: &str) -> Option<&VisualizationDataField> {
        self.data.iter().find(|field| field.data_field.name == name)
    }

    /// Whether the chart id requests a logarithmic X axis.
    pub fn log_x(&self) -> bool {
        self.chart.id.contains("_logX")
    }

    /// Whether the chart id requests a logarithmic Y axis.
    pub fn log_y(&self) -> bool {
        self.chart.id.contains("_logY")
    }
}

/// A chart type, such as `line` or `line_logX_logY`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Chart {
    pub id: String,
}

impl Chart {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A data field of a chart bound to simulation results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VisualizationDataField {
    pub data_field: ChartDataField,

    #[serde(default)]
    pub simulation_results: Vec<SimulationResult>,
}

impl VisualizationDataField {
    /// Binds an array field fed by simulation results.
    pub fn dynamic(name: impl Into<String>, simulation_results: Vec<SimulationResult>) -> Self {
        Self {
            data_field: ChartDataField {
                name: name.into(),
                shape: ChartDataFieldShape::Array,
                field_type: ChartDataFieldType::DynamicSimulationResult,
            },
            simulation_results,
        }
    }
}

/// A named input of a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChartDataField {
    pub name: String,
    pub shape: ChartDataFieldShape,
    #[serde(rename = "type")]
    pub field_type: ChartDataFieldType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChartDataFieldShape {
    Scalar,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ChartDataFieldType {
    DynamicSimulationResult,
    Static,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_chart_fields_and_scales() {
        let element = VisualizationLayoutElement::line(
            "line_logY",
            vec![SimulationResult::new("sim", "time")],
            vec![SimulationResult::new("sim", "A"), SimulationResult::new("sim", "B")],
        );

        assert!(!element.log_x());
        assert!(element.log_y());
        assert_eq!(element.field("x").unwrap().simulation_results.len(), 1);
        assert_eq!(element.field("y").unwrap().simulation_results.len(), 2);
        assert!(element.field("z").is_none());
    }

    #[test]
    fn test_data_field_json() {
        let field = VisualizationDataField::dynamic("x", vec![]);
        let json = serde_json::to_value(&field).unwrap();

        assert_eq!(json["data_field"]["type"], "dynamicSimulationResult");
        assert_eq!(json["data_field"]["shape"], "array");
    }
}
