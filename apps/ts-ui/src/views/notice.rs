use ts_app::RunError;

/// Modal shown when a run is refused because the table is full.
/// Returns true when dismissed.
pub fn show_max_trials_notice(ctx: &egui::Context, max_trials: u32) -> bool {
    let mut dismissed = false;
    egui::Window::new("Maximum trials reached")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(RunError::MaxTrialsReached { max: max_trials }.to_string());
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });
    dismissed
}
