//! Current values of the active simulation's inputs.

use tracing::debug;
use ts_catalog::{InputDescriptor, SimulationDescriptor, check_value};
use ts_core::{InputValue, InputValueSet};

use crate::error::InputError;

#[derive(Debug, Clone, Default)]
pub struct InputState {
    simulation_id: Option<String>,
    declared: Vec<InputDescriptor>,
    values: InputValueSet,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every input to its default.
    ///
    /// Idempotent per simulation: a second call for the simulation that is
    /// already active changes nothing and returns `false`.
    pub fn initialize(&mut self, simulation: &SimulationDescriptor) -> bool {
        if self.simulation_id.as_deref() == Some(simulation.id.as_str()) {
            debug!(simulation_id = %simulation.id, "inputs already initialized");
            return false;
        }
        self.simulation_id = Some(simulation.id.clone());
        self.declared = simulation.inputs.clone();
        self.values = simulation.default_values();
        true
    }

    /// Forget the active simulation.
    pub fn clear(&mut self) {
        self.simulation_id = None;
        self.declared.clear();
        self.values.clear();
    }

    pub fn simulation_id(&self) -> Option<&str> {
        self.simulation_id.as_deref()
    }

    pub fn values(&self) -> &InputValueSet {
        &self.values
    }

    pub fn get(&self, input_id: &str) -> Option<&InputValue> {
        self.values.get(input_id)
    }

    pub fn declared(&self) -> &[InputDescriptor] {
        &self.declared
    }

    /// Set one input. The value must fit the input's control; empty clears.
    pub fn set_value(&mut self, input_id: &str, value: InputValue) -> Result<(), InputError> {
        if self.simulation_id.is_none() {
            return Err(InputError::NoSimulation);
        }
        let input = self
            .declared
            .iter()
            .find(|i| i.id == input_id)
            .ok_or_else(|| InputError::UnknownInput {
                id: input_id.to_string(),
            })?;
        check_value(input, &value).map_err(|source| InputError::Rejected {
            id: input_id.to_string(),
            source,
        })?;
        self.values.set(input_id, value);
        Ok(())
    }

    /// True when every declared input holds a value.
    pub fn is_complete(&self) -> bool {
        self.simulation_id.is_some()
            && self.declared.iter().all(|i| !self.values.is_unset(&i.id))
    }

    /// Declared inputs still waiting for a value.
    pub fn missing(&self) -> Vec<&str> {
        self.declared
            .iter()
            .filter(|i| self.values.is_unset(&i.id))
            .map(|i| i.id.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ts_catalog::builtin_catalog;

    #[test]
    fn plant_inputs_start_empty_and_incomplete() {
        let catalog = builtin_catalog().unwrap();
        let mut state = InputState::new();
        assert!(state.initialize(catalog.get_simulation("plant-growth").unwrap()));
        assert!(!state.is_complete());
        assert_eq!(state.missing().len(), 3);
        assert_eq!(state.get("waterAmount"), Some(&InputValue::empty()));
    }

    #[test]
    fn weather_defaults_are_partial() {
        let catalog = builtin_catalog().unwrap();
        let mut state = InputState::new();
        state.initialize(catalog.get_simulation("weather").unwrap());
        assert_eq!(state.get("temperature"), Some(&InputValue::Number(70.0)));
        assert_eq!(state.missing(), vec!["pressure"]);
        state.set_value("pressure", "Normal".into()).unwrap();
        assert!(state.is_complete());
    }

    #[test]
    fn reinitializing_same_simulation_keeps_edits() {
        let catalog = builtin_catalog().unwrap();
        let plant = catalog.get_simulation("plant-growth").unwrap();
        let mut state = InputState::new();
        state.initialize(plant);
        state.set_value("sunlightIntensity", "High".into()).unwrap();

        assert!(!state.initialize(plant));
        assert_eq!(state.get("sunlightIntensity"), Some(&"High".into()));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let catalog = builtin_catalog().unwrap();
        let mut state = InputState::new();
        state.initialize(catalog.get_simulation("weather").unwrap());

        assert!(matches!(
            state.set_value("temperature", InputValue::Number(150.0)),
            Err(InputError::Rejected { .. })
        ));
        assert!(matches!(
            state.set_value("pressure", "Stormy".into()),
            Err(InputError::Rejected { .. })
        ));
        assert!(matches!(
            state.set_value("altitude", InputValue::Number(1.0)),
            Err(InputError::UnknownInput { .. })
        ));
        assert_eq!(state.get("temperature"), Some(&InputValue::Number(70.0)));
    }

    #[test]
    fn no_simulation_rejects_edits() {
        let mut state = InputState::new();
        assert_eq!(
            state.set_value("x", "y".into()),
            Err(InputError::NoSimulation)
        );
        assert!(!state.is_complete());
    }
}
