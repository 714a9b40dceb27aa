#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod preview_engine;
mod views;

use std::path::PathBuf;

use app::TrialscopeApp;
use ts_app::AppConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => AppConfig::load(&path)?,
        None => AppConfig::default(),
    };
    let catalog = config.load_catalog()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 820.0])
            .with_title("Trialscope"),
        ..Default::default()
    };

    eframe::run_native(
        "Trialscope",
        options,
        Box::new(|cc| Ok(Box::new(TrialscopeApp::new(cc, config, catalog)))),
    )?;
    Ok(())
}
