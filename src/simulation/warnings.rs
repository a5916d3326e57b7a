//! Non-fatal diagnostics of the simulation codecs.
//!
//! Problems that do not make a document unusable (an unsupported task kind, a
//! duplicate data generator id, a curve that cannot be resolved) are collected in a
//! [`Warnings`] accumulator while reading or writing. The affected part of the
//! document is skipped and processing continues. The collected warnings are returned
//! to the caller together with the result.

use std::fmt;

use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Kinds of non-fatal problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningKind {
    /// A task is not a plain task (e.g. a repeated task)
    UnsupportedTask,
    /// An output is not a 2D plot or a report
    UnsupportedOutput,
    /// Two tasks share an id
    DuplicateTaskId,
    /// Two data generators share an id
    DuplicateDataGeneratorId,
    /// A curve references a data generator, task or variable that cannot be resolved
    UnresolvedCurve,
    /// The curves of a plot do not share an X axis or a Y axis scale
    InconsistentAxes,
    /// A result of a visualization does not belong to the simulation being written
    UnresolvedVisualizationResult,
    /// The X and Y results of a layout element cannot be paired into curves
    UnpairedCurves,
    /// A model variable other than time uses the id `time`
    ReservedVariableId,
}

/// A single non-fatal problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationIoWarning {
    /// Kind of the problem
    pub kind: WarningKind,
    /// Human readable description
    pub message: String,
    /// Element of the document the problem was found in
    pub location: String,
}

impl SimulationIoWarning {
    pub fn new(kind: WarningKind, location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: location.into(),
        }
    }
}

impl fmt::Display for SimulationIoWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}:\n\t└── {}",
            self.location.bold(),
            "Warning".bold().yellow(),
            self.message.bold().yellow()
        )
    }
}

/// Accumulator of the warnings raised during one read or write call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Warnings {
    warnings: Vec<SimulationIoWarning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning and mirrors it to the log.
    ///
    /// # Arguments
    ///
    /// * `kind` - Kind of the problem
    /// * `location` - Element of the document the problem was found in
    /// * `message` - Human readable description
    pub fn push(&mut self, kind: WarningKind, location: impl Into<String>, message: impl Into<String>) {
        let warning = SimulationIoWarning::new(kind, location, message);
        log::warn!("{}: {}", warning.location, warning.message);
        self.warnings.push(warning);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimulationIoWarning> {
        self.warnings.iter()
    }

    /// Warnings of the given kind.
    pub fn of_kind(&self, kind: WarningKind) -> Vec<&SimulationIoWarning> {
        self.warnings
            .iter()
            .filter(|warning| warning.kind == kind)
            .collect()
    }

    /// Whether any warning message contains `text`.
    pub fn contains(&self, text: &str) -> bool {
        self.warnings
            .iter()
            .any(|warning| warning.message.contains(text))
    }
}

impl IntoIterator for Warnings {
    type Item = SimulationIoWarning;
    type IntoIter = std::vec::IntoIter<SimulationIoWarning>;

    fn into_iter(self) -> Self::IntoIter {
        self.warnings.into_iter()
    }
}

impl fmt::Display for Warnings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for warning in &self.warnings {
            writeln!(f, "{warning}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_filter() {
        let mut warnings = Warnings::new();
        warnings.push(WarningKind::UnsupportedTask, "task1", "Task task1 is not supported");
        warnings.push(
            WarningKind::InconsistentAxes,
            "plot_1",
            "Curves of plot_1 in doc.sedml must have the same Y axis",
        );

        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings.of_kind(WarningKind::InconsistentAxes).len(), 1);
        assert!(warnings.contains("must have the same Y axis"));
        assert!(!warnings.contains("X axis"));
    }

    #[test]
    fn test_display_contains_location_and_message() {
        colored::control::set_override(false);
        let warning = SimulationIoWarning::new(WarningKind::UnresolvedCurve, "curve_1", "Unable to interpret curve");

        assert_eq!(
            warning.to_string(),
            "[curve_1] Warning:\n\t└── Unable to interpret curve"
        );
    }
}
