use egui_extras::{Column, TableBuilder};
use ts_app::{
    ContainerHeight, EMPTY_TABLE_TEXT, RowRender, RowSlot, TRAILING_ROW_TEXT, TableBody,
    TableRenderState, Trial, header_cells,
};
use ts_catalog::SimulationDescriptor;
use ts_core::TrialId;

pub const ROW_HEIGHT: f32 = 32.0;
const HEADER_HEIGHT: f32 = 24.0;
const ID_COLUMN_WIDTH: f32 = 70.0;
const VALUE_COLUMN_WIDTH: f32 = 130.0;
const ACTION_COLUMN_WIDTH: f32 = 80.0;

/// Measurements and clicks from one frame of the table.
#[derive(Default)]
pub struct TrialsResponse {
    pub delete: Option<TrialId>,
    pub container_height: Option<f32>,
    pub content_width: f32,
    pub viewport_width: f32,
}

#[derive(Default)]
pub struct TrialsView {
    last_height: Option<f32>,
}

impl TrialsView {
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        simulation: &SimulationDescriptor,
        trials: &[Trial],
        render: &TableRenderState,
        deleting: bool,
        scroll_into_view: bool,
    ) -> TrialsResponse {
        let columns = header_cells(simulation);
        let value_columns = columns.len().saturating_sub(2);
        let content_width = ID_COLUMN_WIDTH
            + value_columns as f32 * VALUE_COLUMN_WIDTH
            + ACTION_COLUMN_WIDTH;
        let mut response = TrialsResponse {
            content_width,
            viewport_width: ui.available_width(),
            container_height: self.last_height,
            ..Default::default()
        };

        ui.horizontal(|ui| {
            ui.heading("Trials");
            ui.label(format!("{} / {}", trials.len(), simulation.max_trials));
            if render.has_overflow {
                ui.weak("Scroll sideways for more columns");
            }
        });

        let frame = egui::ScrollArea::horizontal()
            .id_salt("trials_scroll")
            .show(ui, |ui| {
                let mut builder = TableBuilder::new(ui)
                    .striped(true)
                    .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                    .column(Column::exact(ID_COLUMN_WIDTH).clip(false));
                for _ in 0..value_columns {
                    builder = builder.column(Column::exact(VALUE_COLUMN_WIDTH).clip(false));
                }
                builder = builder.column(Column::exact(ACTION_COLUMN_WIDTH).clip(false));
                if let ContainerHeight::Fixed(height) = render.container_height {
                    let body = (height - HEADER_HEIGHT).max(0.0);
                    builder = builder.min_scrolled_height(body).max_scroll_height(body);
                } else {
                    builder = builder.vscroll(false);
                }

                builder
                    .header(HEADER_HEIGHT, |mut header| {
                        for title in &columns {
                            header.col(|ui| {
                                ui.strong(title);
                            });
                        }
                    })
                    .body(|mut body| match &render.body {
                        TableBody::Empty => {
                            body.row(ROW_HEIGHT, |mut row| {
                                row.col(|ui| {
                                    ui.weak(EMPTY_TABLE_TEXT);
                                });
                                for _ in 1..columns.len() {
                                    row.col(|_| {});
                                }
                            });
                        }
                        TableBody::Rows { rows, trailing } => {
                            for spec in rows {
                                let height = match spec.slot {
                                    RowSlot::Placeholder { height } => height,
                                    RowSlot::Trial(_) => ROW_HEIGHT,
                                };
                                body.row(height, |mut row| {
                                    let trial = match spec.slot {
                                        RowSlot::Trial(id) => trials.iter().find(|t| t.id == id),
                                        RowSlot::Placeholder { .. } => None,
                                    };
                                    let cells = trial.map(|t| t.row_cells(simulation));
                                    for col in 0..columns.len() {
                                        row.col(|ui| {
                                            if let Some(id) = Self::show_cell(
                                                ui,
                                                spec,
                                                trial.map(|t| t.id),
                                                cells.as_ref().and_then(|c| c.get(col)),
                                                col + 1 == columns.len(),
                                                deleting,
                                            ) {
                                                response.delete = Some(id);
                                            }
                                        });
                                    }
                                });
                            }
                            if let Some(trailing) = trailing {
                                body.row(ROW_HEIGHT, |mut row| {
                                    row.col(|ui| {
                                        let rect = ui
                                            .max_rect()
                                            .translate(egui::vec2(0.0, trailing.offset_y));
                                        ui.painter().text(
                                            rect.left_center(),
                                            egui::Align2::LEFT_CENTER,
                                            TRAILING_ROW_TEXT,
                                            egui::FontId::proportional(13.0),
                                            ui.visuals().weak_text_color(),
                                        );
                                    });
                                    for _ in 1..columns.len() {
                                        row.col(|_| {});
                                    }
                                });
                            }
                        }
                    });
            });

        let height = frame.inner_rect.height();
        if height > 0.0 && render.container_height == ContainerHeight::Auto {
            self.last_height = Some(height);
        }
        if scroll_into_view {
            ui.scroll_to_rect(frame.inner_rect, Some(egui::Align::BOTTOM));
        }
        response
    }

    /// Draw one cell. Returns the trial to delete if its button was clicked.
    fn show_cell(
        ui: &mut egui::Ui,
        spec: &RowRender,
        trial_id: Option<TrialId>,
        text: Option<&String>,
        is_action: bool,
        deleting: bool,
    ) -> Option<TrialId> {
        let trial_id = trial_id?;
        let rect = ui.max_rect().translate(egui::vec2(0.0, spec.offset_y));
        if spec.highlighted {
            let color = ui.visuals().selection.bg_fill.gamma_multiply(0.35);
            ui.painter().rect_filled(rect, 0.0, color);
        }

        if spec.offset_y != 0.0 {
            // Moving rows are painted, not laid out, so they can leave their cell.
            let label = if is_action { "" } else { text.map_or("", String::as_str) };
            ui.painter().text(
                rect.left_center(),
                egui::Align2::LEFT_CENTER,
                label,
                egui::FontId::proportional(14.0),
                ui.visuals().text_color(),
            );
            return None;
        }

        if is_action {
            let clicked = ui
                .add_enabled(!deleting, egui::Button::new("Delete").small())
                .on_hover_text(format!("Delete trial {}", trial_id))
                .clicked();
            return clicked.then_some(trial_id);
        }
        ui.label(text.map_or("", String::as_str));
        None
    }
}
