use egui::{Color32, Pos2, Rect, Sense, Stroke, pos2, vec2};
use ts_animation::AdapterStatus;
use ts_catalog::SimulationDescriptor;

use crate::preview_engine::{PreviewFrame, PreviewKind};

const VIEW_HEIGHT: f32 = 240.0;

#[derive(Default)]
pub struct AnimationView;

impl AnimationView {
    /// Draw the animation area. Returns its size for the engine.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        simulation: &SimulationDescriptor,
        status: &AdapterStatus,
        frame: &PreviewFrame,
    ) -> egui::Vec2 {
        let (rect, _) =
            ui.allocate_exact_size(vec2(ui.available_width(), VIEW_HEIGHT), Sense::hover());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 6.0, ui.visuals().extreme_bg_color);

        let text_color = ui.visuals().text_color();
        match status {
            AdapterStatus::Failed(message) => {
                painter.text(
                    rect.center() - vec2(0.0, 10.0),
                    egui::Align2::CENTER_CENTER,
                    "Animation unavailable",
                    egui::FontId::proportional(18.0),
                    text_color,
                );
                painter.text(
                    rect.center() + vec2(0.0, 14.0),
                    egui::Align2::CENTER_CENTER,
                    message,
                    egui::FontId::proportional(12.0),
                    ui.visuals().weak_text_color(),
                );
            }
            AdapterStatus::Loading => {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Loading animation...",
                    egui::FontId::proportional(16.0),
                    text_color,
                );
            }
            AdapterStatus::Unloaded => {}
            AdapterStatus::Ready => {
                let progress = frame.elapsed.map_or(0.0, |elapsed| {
                    let total = simulation.animation_duration_ms().max(1) as f32;
                    (elapsed.as_millis() as f32 / total).clamp(0.0, 1.0)
                });
                if !frame.playing && frame.elapsed.is_none() {
                    painter.text(
                        rect.left_top() + vec2(12.0, 12.0),
                        egui::Align2::LEFT_TOP,
                        "Ready",
                        egui::FontId::proportional(12.0),
                        ui.visuals().weak_text_color(),
                    );
                }
                match frame.kind {
                    PreviewKind::Plant => draw_plant(&painter, rect, frame, progress),
                    PreviewKind::Weather => draw_weather(&painter, rect, frame, progress),
                    PreviewKind::Generic | PreviewKind::None => {
                        draw_progress(&painter, rect, progress, text_color)
                    }
                }
            }
        }
        rect.size()
    }
}

fn input(frame: &PreviewFrame, name: &str) -> Option<f64> {
    frame.inputs.get(name).copied()
}

fn draw_plant(painter: &egui::Painter, rect: Rect, frame: &PreviewFrame, progress: f32) {
    let ground_y = rect.bottom() - 24.0;
    painter.rect_filled(
        Rect::from_min_max(pos2(rect.left(), ground_y), rect.max),
        0.0,
        Color32::from_rgb(121, 85, 58),
    );

    let levels: Vec<f64> = ["sunlight_intensity", "water_intensity", "soil_nutrition"]
        .iter()
        .filter_map(|n| input(frame, n))
        .collect();
    if levels.is_empty() {
        return;
    }
    let vigor = (levels.iter().sum::<f64>() / (levels.len() as f64 * 3.0)) as f32;

    if let Some(sun) = input(frame, "sunlight_intensity") {
        painter.circle_filled(
            pos2(rect.right() - 40.0, rect.top() + 40.0),
            8.0 + sun as f32 * 6.0,
            Color32::from_rgb(250, 204, 21),
        );
    }

    let base = pos2(rect.center().x, ground_y);
    let height = (rect.height() - 60.0) * vigor * progress;
    let top = base - vec2(0.0, height);
    let stem = Color32::from_rgb(34, 139, 34);
    painter.line_segment([base, top], Stroke::new(2.0 + 3.0 * vigor, stem));

    let leaves = (vigor * 6.0 * progress).round() as usize;
    for i in 0..leaves {
        let t = (i + 1) as f32 / (leaves + 1) as f32;
        let at = base - vec2(0.0, height * t);
        let side = if i % 2 == 0 { 1.0 } else { -1.0 };
        painter.circle_filled(at + vec2(side * 12.0, 0.0), 6.0 + 4.0 * vigor, stem);
    }
    if vigor > 0.8 && progress >= 1.0 {
        for dx in [-14.0, 0.0, 14.0] {
            painter.circle_filled(top + vec2(dx, -6.0), 6.0, Color32::from_rgb(236, 72, 153));
        }
    }
}

fn draw_weather(painter: &egui::Painter, rect: Rect, frame: &PreviewFrame, progress: f32) {
    let warmth = input(frame, "temperature").unwrap_or(50.0) as f32 / 100.0;
    let sky = Color32::from_rgb(
        (90.0 + 120.0 * warmth) as u8,
        (150.0 + 40.0 * warmth) as u8,
        (230.0 - 80.0 * warmth) as u8,
    );
    painter.rect_filled(rect.shrink(4.0), 4.0, sky);

    let humidity = input(frame, "humidity").unwrap_or(0.0) as f32 / 100.0;
    let clouds = 1 + (humidity * 4.0 * progress).round() as usize;
    let mut centers: Vec<Pos2> = Vec::with_capacity(clouds);
    for i in 0..clouds {
        let x = rect.left() + rect.width() * (i as f32 + 0.5) / clouds as f32;
        let center = pos2(x, rect.top() + 50.0);
        painter.circle_filled(center, 22.0, Color32::from_gray(235));
        painter.circle_filled(center + vec2(18.0, 6.0), 16.0, Color32::from_gray(225));
        centers.push(center);
    }

    let pressure = input(frame, "pressure").unwrap_or(0.0) as f32;
    let drops = (pressure * humidity * 12.0 * progress) as usize;
    let rain = Color32::from_rgb(59, 130, 246);
    for (i, center) in centers.iter().cycle().take(drops).enumerate() {
        let dx = (i as f32 * 37.0) % 40.0 - 20.0;
        let dy = 40.0 + (i as f32 * 53.0) % (rect.height() - 100.0).max(1.0);
        let start = *center + vec2(dx, dy);
        painter.line_segment([start, start + vec2(-3.0, 10.0)], Stroke::new(2.0, rain));
    }
}

fn draw_progress(painter: &egui::Painter, rect: Rect, progress: f32, color: Color32) {
    let bar = Rect::from_min_size(
        pos2(rect.left() + 20.0, rect.center().y - 6.0),
        vec2(rect.width() - 40.0, 12.0),
    );
    painter.rect_stroke(bar, 4.0, Stroke::new(1.0, color));
    let mut filled = bar;
    filled.set_width(bar.width() * progress);
    painter.rect_filled(filled, 4.0, color);
}
