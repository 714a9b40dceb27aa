//! Catalog validation logic.

use std::collections::HashSet;

use ts_core::InputValue;

use crate::schema::{Catalog, ControlKind, DataSet, InputDescriptor, SimulationDescriptor};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

/// Why a value does not fit an input control.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    #[error("'{value}' is not one of {options:?}")]
    NotAnOption { value: String, options: Vec<String> },

    #[error("{value} is outside [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    #[error("expected {expected} for a {control} control, got '{value}'")]
    WrongType {
        expected: &'static str,
        control: &'static str,
        value: String,
    },
}

/// Check a value against an input's control constraints. Empty always fits.
pub fn check_value(input: &InputDescriptor, value: &InputValue) -> Result<(), ValueError> {
    if value.is_empty() {
        return Ok(());
    }

    match (&input.control, value) {
        (
            ControlKind::ChoiceList { options } | ControlKind::SegmentedChoice { options },
            InputValue::Text(s),
        ) => {
            if options.iter().any(|o| o == s) {
                Ok(())
            } else {
                Err(ValueError::NotAnOption {
                    value: s.clone(),
                    options: options.clone(),
                })
            }
        }
        (ControlKind::ContinuousRange { min, max, .. }, InputValue::Number(n)) => {
            if n.is_finite() && *n >= *min && *n <= *max {
                Ok(())
            } else {
                Err(ValueError::OutOfRange {
                    value: *n,
                    min: *min,
                    max: *max,
                })
            }
        }
        (ControlKind::ContinuousRange { .. }, other) => Err(ValueError::WrongType {
            expected: "a number",
            control: input.control.label(),
            value: other.to_string(),
        }),
        (_, other) => Err(ValueError::WrongType {
            expected: "an option string",
            control: input.control.label(),
            value: other.to_string(),
        }),
    }
}

pub fn validate_catalog(catalog: &Catalog) -> Result<(), ValidationError> {
    if catalog.version > crate::LATEST_VERSION || catalog.version == 0 {
        return Err(ValidationError::UnsupportedVersion {
            version: catalog.version,
        });
    }

    let mut simulation_ids = HashSet::new();
    for simulation in &catalog.simulations {
        if !simulation_ids.insert(simulation.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: simulation.id.clone(),
                context: "simulations".to_string(),
            });
        }
        validate_simulation(simulation)?;
    }

    let mut dataset_ids = HashSet::new();
    for dataset in &catalog.datasets {
        if !dataset_ids.insert(dataset.simulation_id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: dataset.simulation_id.clone(),
                context: "datasets".to_string(),
            });
        }
        let simulation = catalog
            .simulations
            .iter()
            .find(|s| s.id == dataset.simulation_id)
            .ok_or_else(|| ValidationError::MissingReference {
                id: dataset.simulation_id.clone(),
                context: "dataset simulation_id".to_string(),
            })?;
        validate_dataset(dataset, simulation)?;
    }

    Ok(())
}

fn validate_simulation(simulation: &SimulationDescriptor) -> Result<(), ValidationError> {
    if simulation.max_trials == 0 {
        return Err(ValidationError::InvalidValue {
            field: format!("{}.max_trials", simulation.id),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        });
    }

    let mut input_ids = HashSet::new();
    for input in &simulation.inputs {
        if !input_ids.insert(input.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: input.id.clone(),
                context: format!("simulation '{}' inputs", simulation.id),
            });
        }
        validate_input(input, &simulation.id)?;
    }

    let mut output_ids = HashSet::new();
    for output in &simulation.outputs {
        if !output_ids.insert(output.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: output.id.clone(),
                context: format!("simulation '{}' outputs", simulation.id),
            });
        }
    }

    Ok(())
}

fn validate_input(input: &InputDescriptor, simulation_id: &str) -> Result<(), ValidationError> {
    let field = |name: &str| format!("{}.{}.{}", simulation_id, input.id, name);

    match &input.control {
        ControlKind::ChoiceList { options } | ControlKind::SegmentedChoice { options } => {
            if options.is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: field("options"),
                    value: "[]".to_string(),
                    reason: "choice controls need at least one option".to_string(),
                });
            }
            for key in input.value_mapping.keys() {
                if !options.contains(key) {
                    return Err(ValidationError::MissingReference {
                        id: key.clone(),
                        context: field("value_mapping"),
                    });
                }
            }
        }
        ControlKind::ContinuousRange { min, max, step } => {
            if !(min.is_finite() && max.is_finite() && min < max) {
                return Err(ValidationError::InvalidValue {
                    field: field("min/max"),
                    value: format!("{}..{}", min, max),
                    reason: "min must be below max".to_string(),
                });
            }
            if !(step.is_finite() && *step > 0.0) {
                return Err(ValidationError::InvalidValue {
                    field: field("step"),
                    value: step.to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        }
    }

    if let Err(err) = check_value(input, &input.default_value) {
        return Err(ValidationError::InvalidValue {
            field: field("default_value"),
            value: input.default_value.to_string(),
            reason: err.to_string(),
        });
    }

    Ok(())
}

fn validate_dataset(
    dataset: &DataSet,
    simulation: &SimulationDescriptor,
) -> Result<(), ValidationError> {
    for (index, mapping) in dataset.mappings.iter().enumerate() {
        let context = format!("dataset '{}' mapping {}", dataset.simulation_id, index);
        for (key, _) in mapping.inputs.iter() {
            if simulation.input(key).is_none() {
                return Err(ValidationError::MissingReference {
                    id: key.to_string(),
                    context: format!("{} inputs", context),
                });
            }
        }
        for key in mapping.outputs.keys() {
            if simulation.output(key).is_none() {
                return Err(ValidationError::MissingReference {
                    id: key.clone(),
                    context: format!("{} outputs", context),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn choice(options: &[&str]) -> InputDescriptor {
        InputDescriptor {
            id: "level".to_string(),
            label: "Level".to_string(),
            control: ControlKind::ChoiceList {
                options: options.iter().map(|s| s.to_string()).collect(),
            },
            default_value: InputValue::empty(),
            animation_input: None,
            value_mapping: BTreeMap::new(),
        }
    }

    fn range(min: f64, max: f64) -> InputDescriptor {
        InputDescriptor {
            id: "temperature".to_string(),
            label: "Temperature".to_string(),
            control: ControlKind::ContinuousRange {
                min,
                max,
                step: 1.0,
            },
            default_value: InputValue::Number(min),
            animation_input: None,
            value_mapping: BTreeMap::new(),
        }
    }

    #[test]
    fn choice_values_must_be_listed() {
        let input = choice(&["Low", "High"]);
        assert!(check_value(&input, &"Low".into()).is_ok());
        assert!(check_value(&input, &InputValue::empty()).is_ok());
        assert!(matches!(
            check_value(&input, &"Medium".into()),
            Err(ValueError::NotAnOption { .. })
        ));
        assert!(matches!(
            check_value(&input, &InputValue::Number(1.0)),
            Err(ValueError::WrongType { .. })
        ));
    }

    #[test]
    fn range_values_are_bounded() {
        let input = range(0.0, 100.0);
        assert!(check_value(&input, &InputValue::Number(0.0)).is_ok());
        assert!(check_value(&input, &InputValue::Number(100.0)).is_ok());
        assert!(matches!(
            check_value(&input, &InputValue::Number(100.5)),
            Err(ValueError::OutOfRange { .. })
        ));
        assert!(matches!(
            check_value(&input, &InputValue::Number(f64::NAN)),
            Err(ValueError::OutOfRange { .. })
        ));
        assert!(matches!(
            check_value(&input, &"warm".into()),
            Err(ValueError::WrongType { .. })
        ));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let input = range(10.0, 5.0);
        assert!(validate_input(&input, "sim").is_err());
    }

    #[test]
    fn mapping_key_outside_options_is_rejected() {
        let mut input = choice(&["Low", "High"]);
        input.value_mapping.insert("Medium".to_string(), 2.0);
        assert!(matches!(
            validate_input(&input, "sim"),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn default_must_conform() {
        let mut input = choice(&["Low", "High"]);
        input.default_value = "Extreme".into();
        assert!(matches!(
            validate_input(&input, "sim"),
            Err(ValidationError::InvalidValue { .. })
        ));
    }
}
