use std::path::PathBuf;
use std::time::{Duration, Instant};

use egui_file_dialog::{DialogMode, FileDialog};
use tracing::{error, info, warn};
use ts_animation::AnimationAdapter;
use ts_app::{
    AppConfig, LiveRegion, OrchestratorEvent, PreferenceStore, RunState, Session, SessionEvent,
    ThemePreference,
};
use ts_catalog::{Catalog, SimulationDescriptor};
use ts_core::Millis;

use crate::preview_engine::{PreviewEngine, PreviewHandle};
use crate::views::{AnimationView, InputPanel, ROW_HEIGHT, TrialsView, show_max_trials_notice};

pub struct TrialscopeApp {
    session: Session<LiveRegion>,
    preview: PreviewHandle,
    prefs: PreferenceStore,
    theme: ThemePreference,
    clock: Instant,
    file_dialog: FileDialog,
    last_directory: Option<PathBuf>,
    status_message: Option<String>,
    input_panel: InputPanel,
    animation_view: AnimationView,
    trials_view: TrialsView,
    last_container: egui::Vec2,
    scroll_to_results: bool,
}

fn animation_inputs(simulation: &SimulationDescriptor) -> Vec<String> {
    simulation
        .inputs
        .iter()
        .filter_map(|i| i.animation_input.clone())
        .collect()
}

fn apply_theme(ctx: &egui::Context, theme: ThemePreference) {
    ctx.set_visuals(if theme.is_dark() {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    });
}

impl TrialscopeApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, catalog: Catalog) -> Self {
        let (engine, preview) = PreviewEngine::new();
        let initial = config.initial_simulation(&catalog);
        if let Some(sim) = initial.as_deref().and_then(|id| catalog.get_simulation(id)) {
            preview.declare_inputs(animation_inputs(sim));
        }

        let session = Session::new(
            catalog,
            AnimationAdapter::new(Box::new(engine)),
            LiveRegion::new(config.timing.announce_clear_ms),
            config.timing.clone(),
            initial.as_deref(),
        );

        let prefs = PreferenceStore::new(config.preferences_path());
        let theme = prefs.load_theme();
        apply_theme(&cc.egui_ctx, theme);

        Self {
            session,
            preview,
            prefs,
            theme,
            clock: Instant::now(),
            file_dialog: FileDialog::new(),
            last_directory: config
                .catalog
                .as_ref()
                .and_then(|p| p.parent())
                .map(|p| p.to_path_buf()),
            status_message: None,
            input_panel: InputPanel,
            animation_view: AnimationView,
            trials_view: TrialsView::default(),
            last_container: egui::Vec2::ZERO,
            scroll_to_results: false,
        }
    }

    fn now(&self) -> Millis {
        self.clock.elapsed().as_millis() as Millis
    }

    fn select_simulation(&mut self, id: &str) {
        if let Some(sim) = self.session.orchestrator().catalog().get_simulation(id) {
            self.preview.declare_inputs(animation_inputs(sim));
        }
        match self.session.select_simulation(id) {
            Ok(()) => self.after_load(),
            Err(err) => self.status_message = Some(err.to_string()),
        }
    }

    fn open_catalog(&mut self, path: PathBuf) {
        match ts_catalog::load_path(&path) {
            Ok(catalog) => {
                if let Some(parent) = path.parent() {
                    self.last_directory = Some(parent.to_path_buf());
                }
                if let Some(sim) = catalog.list_simulations().first() {
                    self.preview.declare_inputs(animation_inputs(sim));
                }
                info!(path = %path.display(), "catalog opened");
                match self.session.replace_catalog(catalog) {
                    Ok(()) => {
                        self.after_load();
                        self.status_message = Some(format!("Loaded {}", path.display()));
                    }
                    Err(err) => self.status_message = Some(err.to_string()),
                }
            }
            Err(err) => {
                error!(path = %path.display(), "failed to open catalog: {}", err);
                self.status_message = Some(format!("Failed to open catalog: {err}"));
            }
        }
    }

    /// Size a freshly loaded animation to the last known container.
    fn after_load(&mut self) {
        let size = self.last_container;
        if size != egui::Vec2::ZERO {
            self.session
                .orchestrator_mut()
                .adapter_mut()
                .resize_to_container(size.x, size.y);
        }
    }

    fn toggle_theme(&mut self, ctx: &egui::Context, now: Millis) {
        self.theme = self.theme.toggled();
        if let Err(err) = self.prefs.save_theme(self.theme) {
            warn!("failed to save theme preference: {}", err);
        }
        apply_theme(ctx, self.theme);
        self.session
            .table_mut()
            .overflow_mut()
            .mark_theme_changed(now);
    }

    fn handle_events(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            match event {
                SessionEvent::Run(OrchestratorEvent::ScrollResultsIntoView) => {
                    self.scroll_to_results = true;
                }
                SessionEvent::Run(OrchestratorEvent::TrialCommitted { trial, .. }) => {
                    self.status_message = Some(format!("Trial {} recorded", trial.id));
                }
                _ => {}
            }
        }
    }

    fn schedule_repaint(&self, ctx: &egui::Context, now: Millis) {
        let playing = self.session.orchestrator().state() == RunState::Playing;
        if playing || self.session.table().is_animating() {
            ctx.request_repaint();
        } else if let Some(due) = self.session.next_due() {
            ctx.request_repaint_after(Duration::from_millis(due.saturating_sub(now)));
        }
    }
}

impl eframe::App for TrialscopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = self.now();
        let events = self.session.tick(now);
        self.handle_events(events);

        let running = self.session.orchestrator().is_running();
        let active_id = self
            .session
            .orchestrator()
            .active_simulation()
            .map(|s| s.id.clone());

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let mut choice = None;
                ui.add_enabled_ui(!running, |ui| {
                    let selected = self
                        .session
                        .orchestrator()
                        .active_simulation()
                        .map(|s| s.name.clone())
                        .unwrap_or_else(|| "Select simulation".to_string());
                    egui::ComboBox::from_id_salt("simulation")
                        .selected_text(selected)
                        .show_ui(ui, |ui| {
                            for sim in self.session.orchestrator().catalog().list_simulations() {
                                let is_active = active_id.as_deref() == Some(sim.id.as_str());
                                if ui.selectable_label(is_active, &sim.name).clicked() && !is_active
                                {
                                    choice = Some(sim.id.clone());
                                }
                            }
                        });

                    if ui.button("Open catalog").clicked() {
                        let initial_dir = self.last_directory.as_ref().and_then(|p| p.to_str());
                        let _ = self
                            .file_dialog
                            .open(DialogMode::SelectFile, true, initial_dir);
                    }
                });
                if let Some(id) = choice {
                    self.select_simulation(&id);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let label = if self.theme.is_dark() {
                        "Light mode"
                    } else {
                        "Dark mode"
                    };
                    if ui.button(label).clicked() {
                        self.toggle_theme(ctx, now);
                    }
                });
            });
        });

        self.file_dialog.update(ctx);
        if let Some(path) = self.file_dialog.take_selected() {
            self.open_catalog(path.to_path_buf());
        }

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let live = self.session.orchestrator().announcer().content();
                if !live.is_empty() {
                    ui.label(live);
                }
                if let Some(message) = &self.status_message {
                    ui.separator();
                    ui.weak(message);
                }
            });
        });

        let Some(simulation) = self.session.orchestrator().active_simulation().cloned() else {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.label("No simulation selected.");
            });
            return;
        };

        let panel = egui::SidePanel::left("inputs")
            .default_width(260.0)
            .show(ctx, |ui| {
                let orchestrator = self.session.orchestrator();
                self.input_panel.show(
                    ui,
                    &simulation,
                    orchestrator.inputs(),
                    running,
                    self.session.table().is_animating(),
                    orchestrator.validation_error(),
                )
            })
            .inner;

        for (input_id, value) in panel.edits {
            if let Err(err) = self.session.set_input(&input_id, value) {
                warn!(input = %input_id, "input rejected: {}", err);
                self.status_message = Some(err.to_string());
            }
        }
        if panel.run_clicked {
            match self.session.request_run(now) {
                Ok(ticket) => {
                    self.status_message = None;
                    if !ticket.animated {
                        info!(trial = %ticket.trial_id, "recorded without animation");
                    }
                }
                Err(err) => info!("run not started: {}", err),
            }
        }

        let render = self.session.render_table(now);
        let deleting = self.session.table().is_animating();
        let scroll = std::mem::take(&mut self.scroll_to_results);
        let frame = self.preview.frame();

        let (container, table) = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let status = self.session.orchestrator().adapter().status().clone();
                let container = self.animation_view.show(ui, &simulation, &status, &frame);
                ui.add_space(12.0);
                let table = self.trials_view.show(
                    ui,
                    &simulation,
                    self.session.orchestrator().trials(),
                    &render,
                    deleting,
                    scroll,
                );
                (container, table)
            })
            .inner;

        if container != self.last_container {
            self.last_container = container;
            self.session
                .orchestrator_mut()
                .adapter_mut()
                .resize_to_container(container.x, container.y);
            self.session.table_mut().overflow_mut().mark_resized();
        }

        if self.session.table().overflow().needs_measure(now) {
            self.session.table_mut().overflow_mut().record(
                table.content_width,
                table.viewport_width,
                now,
            );
        }

        if let Some(trial_id) = table.delete {
            self.session
                .request_delete(trial_id, Some(ROW_HEIGHT), table.container_height, now);
        }

        if self.session.orchestrator().max_trials_notice() {
            let max = self.session.orchestrator().max_trials() as u32;
            if show_max_trials_notice(ctx, max) {
                self.session.orchestrator_mut().dismiss_max_trials_notice();
            }
        }

        self.schedule_repaint(ctx, now);
    }
}
