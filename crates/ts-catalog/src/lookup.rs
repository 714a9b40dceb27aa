//! Simulation lookup and precomputed result matching.

use tracing::{error, warn};
use ts_core::{InputValueSet, OutputValues};

use crate::schema::{Catalog, DataSet, Mapping, SimulationDescriptor};

/// Read out when no mapping describes the current inputs.
pub const NO_MATCH_DESCRIPTION: &str =
    "The simulation runs with the given parameters, showing the relationship between inputs and outputs.";

impl Catalog {
    /// Simulations in declaration order.
    pub fn list_simulations(&self) -> &[SimulationDescriptor] {
        &self.simulations
    }

    pub fn get_simulation(&self, id: &str) -> Option<&SimulationDescriptor> {
        self.simulations.iter().find(|s| s.id == id)
    }

    pub fn dataset(&self, simulation_id: &str) -> Option<&DataSet> {
        self.datasets
            .iter()
            .find(|d| d.simulation_id == simulation_id)
    }

    /// First mapping (declaration order) agreeing with every non-empty input.
    ///
    /// Only keys the mapping declares are compared, so a mapping may leave an
    /// input out and still match.
    pub fn find_mapping(&self, simulation_id: &str, inputs: &InputValueSet) -> Option<&Mapping> {
        let Some(dataset) = self.dataset(simulation_id) else {
            error!(simulation_id, "no data set for simulation");
            return None;
        };

        let mut filtered = inputs.non_empty().peekable();
        if filtered.peek().is_none() {
            warn!(simulation_id, "all inputs are empty");
            return None;
        }
        let filtered: Vec<_> = filtered.collect();

        let found = dataset.mappings.iter().find(|mapping| {
            filtered
                .iter()
                .all(|(key, value)| mapping.inputs.get(key).is_none_or(|stored| stored == *value))
        });

        if found.is_none() {
            warn!(simulation_id, inputs = ?inputs, "no mapping found for inputs");
        }
        found
    }

    /// Precomputed outputs for the inputs, or an empty map when nothing
    /// matches. Empty means "no result", not zero.
    pub fn lookup_outputs(&self, simulation_id: &str, inputs: &InputValueSet) -> OutputValues {
        self.find_mapping(simulation_id, inputs)
            .map(|m| m.outputs.clone())
            .unwrap_or_default()
    }

    /// Animation description for the inputs, or [`NO_MATCH_DESCRIPTION`].
    ///
    /// `None` only when the matching mapping carries no description.
    pub fn lookup_description(
        &self,
        simulation_id: &str,
        inputs: &InputValueSet,
    ) -> Option<String> {
        match self.find_mapping(simulation_id, inputs) {
            Some(mapping) => mapping.animation_description.clone(),
            None => Some(NO_MATCH_DESCRIPTION.to_string()),
        }
    }
}
