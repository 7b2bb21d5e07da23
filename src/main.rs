#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use shape_studio::{EditorConfig, ShapeStudioApp, APP_ID};

/// Reads the editor config named by the first argument or `SHAPE_STUDIO_CONFIG`,
/// falling back to defaults.
fn load_config() -> EditorConfig {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SHAPE_STUDIO_CONFIG").ok());

    let Some(path) = path else {
        return EditorConfig::default();
    };
    match EditorConfig::load(&path) {
        Ok(config) => config,
        Err(err) => {
            log::error!("Ignoring config {}: {}", path, err);
            EditorConfig::default()
        }
    }
}

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config = load_config();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 720.0])
            .with_min_inner_size([720.0, 640.0])
            .with_title("Shape Studio")
            .with_app_id(APP_ID),
        ..Default::default()
    };

    eframe::run_native(
        APP_ID,
        native_options,
        Box::new(|cc| Ok(Box::new(ShapeStudioApp::new(cc, config)))),
    )
}
