//! Catalog schema definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_core::{InputValue, InputValueSet, OutputValues};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    pub version: u32,
    #[serde(default)]
    pub simulations: Vec<SimulationDescriptor>,
    #[serde(default)]
    pub datasets: Vec<DataSet>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub animation: AnimationDef,
    #[serde(default)]
    pub inputs: Vec<InputDescriptor>,
    #[serde(default)]
    pub outputs: Vec<OutputDescriptor>,
    pub max_trials: u32,
}

impl SimulationDescriptor {
    pub fn input(&self, id: &str) -> Option<&InputDescriptor> {
        self.inputs.iter().find(|i| i.id == id)
    }

    pub fn output(&self, id: &str) -> Option<&OutputDescriptor> {
        self.outputs.iter().find(|o| o.id == id)
    }

    pub fn animation_duration_ms(&self) -> u64 {
        self.animation.duration_ms
    }

    /// Every input set to its configured default.
    pub fn default_values(&self) -> InputValueSet {
        self.inputs
            .iter()
            .map(|i| (i.id.clone(), i.default_value.clone()))
            .collect()
    }

    /// Zero for every declared output.
    pub fn zero_outputs(&self) -> OutputValues {
        self.outputs.iter().map(|o| (o.id.clone(), 0.0)).collect()
    }
}

/// Reference to the animation that illustrates a simulation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimationDef {
    pub resource: String,
    pub state_machine: String,
    /// Modeled playback length; the commit is deferred by this much.
    #[serde(default)]
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputDescriptor {
    pub id: String,
    pub label: String,
    pub control: ControlKind,
    #[serde(default)]
    pub default_value: InputValue,
    /// Name of the numeric input this value drives in the animation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_input: Option<String>,
    /// Discrete option -> numeric animation value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub value_mapping: BTreeMap<String, f64>,
}

impl InputDescriptor {
    pub fn options(&self) -> Option<&[String]> {
        match &self.control {
            ControlKind::ChoiceList { options } | ControlKind::SegmentedChoice { options } => {
                Some(options)
            }
            ControlKind::ContinuousRange { .. } => None,
        }
    }

    /// Turn raw text (command line, text box) into a value of the right kind
    /// for this control. Conformance is checked separately.
    pub fn parse_value(&self, raw: &str) -> InputValue {
        match self.control {
            ControlKind::ContinuousRange { .. } => InputValue::parse_loose(raw),
            ControlKind::ChoiceList { .. } | ControlKind::SegmentedChoice { .. } => {
                InputValue::Text(raw.trim().to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ControlKind {
    ChoiceList { options: Vec<String> },
    ContinuousRange { min: f64, max: f64, step: f64 },
    SegmentedChoice { options: Vec<String> },
}

impl ControlKind {
    pub fn label(&self) -> &'static str {
        match self {
            ControlKind::ChoiceList { .. } => "choice list",
            ControlKind::ContinuousRange { .. } => "continuous range",
            ControlKind::SegmentedChoice { .. } => "segmented choice",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputDescriptor {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Precomputed input -> output table for one simulation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataSet {
    pub simulation_id: String,
    #[serde(default)]
    pub mappings: Vec<Mapping>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Mapping {
    pub inputs: InputValueSet,
    pub outputs: OutputValues,
    /// What the animation shows for these inputs, read out to screen readers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_description: Option<String>,
}
