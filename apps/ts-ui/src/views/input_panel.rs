use ts_app::InputState;
use ts_catalog::{ControlKind, InputDescriptor, SimulationDescriptor};
use ts_core::InputValue;

/// What the user did in the input panel this frame.
#[derive(Default)]
pub struct InputPanelResponse {
    pub edits: Vec<(String, InputValue)>,
    pub run_clicked: bool,
}

#[derive(Default)]
pub struct InputPanel;

impl InputPanel {
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        simulation: &SimulationDescriptor,
        inputs: &InputState,
        running: bool,
        removing_row: bool,
        validation_error: Option<&str>,
    ) -> InputPanelResponse {
        let mut response = InputPanelResponse::default();

        ui.heading(&simulation.name);
        if !simulation.description.is_empty() {
            ui.label(&simulation.description);
        }
        ui.separator();

        ui.add_enabled_ui(!running, |ui| {
            for input in &simulation.inputs {
                let current = inputs.get(&input.id).cloned().unwrap_or_default();
                if let Some(value) = Self::show_control(ui, input, &current) {
                    response.edits.push((input.id.clone(), value));
                }
                ui.add_space(6.0);
            }
        });

        ui.separator();
        let label = if running {
            "Running..."
        } else {
            "Run Simulation"
        };
        if ui
            .add_enabled(
                !running && !removing_row,
                egui::Button::new(label).min_size(egui::vec2(160.0, 28.0)),
            )
            .clicked()
        {
            response.run_clicked = true;
        }
        if let Some(message) = validation_error {
            ui.colored_label(ui.visuals().error_fg_color, message);
        }

        response
    }

    fn show_control(
        ui: &mut egui::Ui,
        input: &InputDescriptor,
        current: &InputValue,
    ) -> Option<InputValue> {
        ui.label(egui::RichText::new(&input.label).strong());
        match &input.control {
            ControlKind::ChoiceList { options } => {
                let selected = current.as_text().unwrap_or_default();
                let shown = if selected.is_empty() { "Select..." } else { selected };
                let mut picked = None;
                egui::ComboBox::from_id_salt(("input", &input.id))
                    .selected_text(shown)
                    .width(180.0)
                    .show_ui(ui, |ui| {
                        for option in options {
                            if ui.selectable_label(selected == option, option).clicked()
                                && selected != option
                            {
                                picked = Some(InputValue::Text(option.clone()));
                            }
                        }
                    });
                picked
            }
            ControlKind::SegmentedChoice { options } => {
                let mut picked = None;
                ui.horizontal(|ui| {
                    for option in options {
                        let active = current.as_text() == Some(option.as_str());
                        if ui.selectable_label(active, option).clicked() && !active {
                            picked = Some(InputValue::Text(option.clone()));
                        }
                    }
                });
                picked
            }
            ControlKind::ContinuousRange { min, max, step } => {
                let mut value = current.as_number().unwrap_or(*min);
                let changed = ui
                    .add(egui::Slider::new(&mut value, *min..=*max).step_by(*step))
                    .changed();
                changed.then_some(InputValue::Number(value))
            }
        }
    }
}
