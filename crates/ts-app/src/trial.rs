//! Committed trial records and their table cells.

use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_catalog::{InputDescriptor, OutputDescriptor, SimulationDescriptor};
use ts_core::{InputValueSet, OutputValues, TrialId, format_number};

/// Shown in a cell with no value.
pub const MISSING_CELL: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trial {
    pub id: TrialId,
    pub timestamp: DateTime<Utc>,
    pub inputs: InputValueSet,
    pub outputs: OutputValues,
}

impl Trial {
    pub fn input_cell(&self, input: &InputDescriptor) -> String {
        match self.inputs.get(&input.id) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => MISSING_CELL.to_string(),
        }
    }

    /// Output value followed by its unit, if the output has one.
    pub fn output_cell(&self, output: &OutputDescriptor) -> String {
        match self.outputs.get(&output.id) {
            Some(value) => match &output.unit {
                Some(unit) => format!("{} {}", format_number(*value), unit),
                None => format_number(*value),
            },
            None => MISSING_CELL.to_string(),
        }
    }

    /// Trial number, then inputs and outputs in declaration order.
    pub fn row_cells(&self, simulation: &SimulationDescriptor) -> Vec<String> {
        let mut cells = Vec::with_capacity(1 + simulation.inputs.len() + simulation.outputs.len());
        cells.push(self.id.to_string());
        cells.extend(simulation.inputs.iter().map(|i| self.input_cell(i)));
        cells.extend(simulation.outputs.iter().map(|o| self.output_cell(o)));
        cells
    }
}

/// Column titles matching [`Trial::row_cells`], plus the actions column.
pub fn header_cells(simulation: &SimulationDescriptor) -> Vec<String> {
    let mut cells = vec!["Trial #".to_string()];
    cells.extend(simulation.inputs.iter().map(|i| i.label.clone()));
    cells.extend(simulation.outputs.iter().map(|o| o.label.clone()));
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use ts_catalog::builtin_catalog;
    use ts_core::InputValue;

    #[test]
    fn cells_show_units_and_missing_values() {
        let catalog = builtin_catalog().unwrap();
        let weather = catalog.get_simulation("weather").unwrap();
        let trial = Trial {
            id: TrialId::FIRST,
            timestamp: Utc::now(),
            inputs: [
                ("temperature", InputValue::Number(70.0)),
                ("humidity", InputValue::Number(50.0)),
                ("pressure", InputValue::empty()),
            ]
            .into_iter()
            .collect(),
            outputs: [("precipitation".to_string(), 10.0)].into_iter().collect(),
        };

        assert_eq!(
            trial.row_cells(weather),
            vec!["1", "70", "50", "N/A", "10 mm", "N/A"]
        );
        let header = header_cells(weather);
        assert_eq!(header.first().map(String::as_str), Some("Trial #"));
        assert_eq!(header.last().map(String::as_str), Some("Actions"));
        assert_eq!(header.len(), 7);
    }
}
