mod backend_bridge;
mod controller;
mod media;
mod ui;

use crossbeam_channel::bounded;
use eframe::egui;
use shared::settings::load_settings;

use crate::{
    backend_bridge::{commands::BackendCommand, runtime::spawn_backend_thread},
    controller::events::UiEvent,
    ui::LoaderDemoApp,
};

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings(None);
    let download_dir = dirs::download_dir().unwrap_or_else(std::env::temp_dir);

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    spawn_backend_thread(cmd_rx, ui_tx, settings.download_text.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Page Loader Demo")
            .with_inner_size([900.0, 640.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Page Loader Demo",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(LoaderDemoApp::new(
                cmd_tx,
                ui_rx,
                &settings,
                download_dir,
            )))
        }),
    )
}
