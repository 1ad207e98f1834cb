//! Main application entry point (native).

fn main() -> eframe::Result<()> {
    env_logger::init();
    log::info!("Starting Artboard");

    artboard_app::run(artboard_app::AppConfig::from_env())
}
