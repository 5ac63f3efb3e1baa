use eframe::egui;
use std::path::PathBuf;
use sumo_robot_controller::domain::settings::SettingsService;
use sumo_robot_controller::infrastructure::logging::init_logger;
use sumo_robot_controller::presentation::app::RobotControllerApp;

fn main() -> Result<(), eframe::Error> {
    let settings = SettingsService::new().unwrap_or_else(|e| {
        eprintln!("Falling back to local settings file: {}", e);
        SettingsService::with_path(PathBuf::from("settings.json"))
    });

    let logging_guard = init_logger(&settings.get().log_settings)
        .map_err(|e| eprintln!("Failed to initialize logging: {}", e))
        .ok();

    tracing::info!("Starting Sumo Robot Controller");

    if !settings.path().exists() {
        if let Err(e) = settings.save() {
            tracing::warn!("Could not write default settings: {}", e);
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 640.0])
            .with_title("Sumo Robot Controller"),
        ..Default::default()
    };

    eframe::run_native(
        "Sumo Robot Controller",
        options,
        Box::new(move |cc| {
            let app = RobotControllerApp::new(cc, settings, logging_guard)?;
            Ok(Box::new(app))
        }),
    )
}
