//! Conversion of input values into numeric animation inputs.

use tracing::{debug, warn};
use ts_catalog::{InputDescriptor, SimulationDescriptor};
use ts_core::{InputValue, InputValueSet};

/// One value ready to be pushed into the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub input_id: String,
    pub animation_input: String,
    pub value: f64,
}

/// Numeric value for one input, or `None` when it must not be bound.
///
/// Numbers bind as-is. Text goes through the input's value mapping first and
/// is parsed as a number otherwise. Empty and unparseable values are skipped.
pub fn numeric_value(input: &InputDescriptor, value: &InputValue) -> Option<f64> {
    match value {
        InputValue::Number(n) => Some(*n),
        InputValue::Text(s) if s.is_empty() => None,
        InputValue::Text(s) => {
            if let Some(mapped) = input.value_mapping.get(s) {
                return Some(*mapped);
            }
            match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Some(n),
                _ => {
                    warn!(input = %input.id, value = %s, "no mapping found for value");
                    None
                }
            }
        }
    }
}

/// Every binding the current values produce, in input declaration order.
pub fn bindings(simulation: &SimulationDescriptor, values: &InputValueSet) -> Vec<Binding> {
    simulation
        .inputs
        .iter()
        .filter_map(|input| {
            let animation_input = input.animation_input.as_ref()?;
            let value = values.get(&input.id)?;
            match numeric_value(input, value) {
                Some(n) => Some(Binding {
                    input_id: input.id.clone(),
                    animation_input: animation_input.clone(),
                    value: n,
                }),
                None => {
                    debug!(animation_input = %animation_input, "skipping empty value");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ts_catalog::builtin_catalog;

    #[test]
    fn mapped_options_bind_to_their_numbers() {
        let catalog = builtin_catalog().unwrap();
        let plant = catalog.get_simulation("plant-growth").unwrap();
        let values: InputValueSet = [
            ("sunlightIntensity", "High"),
            ("waterAmount", "Low"),
            ("soilNutrition", ""),
        ]
        .into_iter()
        .collect();

        let bound = bindings(plant, &values);
        assert_eq!(bound.len(), 2);
        assert_eq!(bound[0].animation_input, "sunlight_intensity");
        assert_eq!(bound[0].value, 3.0);
        assert_eq!(bound[1].animation_input, "water_intensity");
        assert_eq!(bound[1].value, 1.0);
    }

    #[test]
    fn unmapped_text_falls_back_to_parsing() {
        let catalog = builtin_catalog().unwrap();
        let weather = catalog.get_simulation("weather").unwrap();
        let temperature = weather.input("temperature").unwrap();
        assert_eq!(numeric_value(temperature, &"42.5".into()), Some(42.5));
        assert_eq!(numeric_value(temperature, &"warm".into()), None);
        assert_eq!(numeric_value(temperature, &InputValue::Number(7.0)), Some(7.0));
        assert_eq!(numeric_value(temperature, &InputValue::empty()), None);
    }

    #[test]
    fn weather_defaults_bind_sliders_only() {
        let catalog = builtin_catalog().unwrap();
        let weather = catalog.get_simulation("weather").unwrap();
        let bound = bindings(weather, &weather.default_values());
        let names: Vec<_> = bound.iter().map(|b| b.animation_input.as_str()).collect();
        assert_eq!(names, vec!["temperature", "humidity"]);
    }
}
