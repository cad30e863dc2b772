mod app;
mod app_dir;
mod config_file;
mod hud;
mod input;

use eframe::egui;
use tracing::{error, info};

use app::TilebrotApp;

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Tilebrot");

    let config = config_file::load_config(&config_file::config_path());
    let size = [config.width as f32, config.height as f32];

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Tilebrot")
            .with_inner_size(size)
            .with_resizable(false),
        ..Default::default()
    };

    eframe::run_native(
        "Tilebrot",
        options,
        Box::new(move |cc| match TilebrotApp::new(&cc.egui_ctx, config) {
            Ok(app) => Ok(Box::new(app)),
            Err(e) => {
                error!("Failed to start renderer: {e}");
                Err(e.into())
            }
        }),
    )
}
