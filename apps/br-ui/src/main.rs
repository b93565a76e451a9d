#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod report_worker;
mod views;

use app::ReportApp;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_title("3-HP Biorefinery Report"),
        ..Default::default()
    };

    eframe::run_native(
        "3-HP Biorefinery Report",
        options,
        Box::new(|cc| Ok(Box::new(ReportApp::new(cc)))),
    )
}
