mod app;

fn main() {
    env_logger::init();
    log::info!("petpal starting up");

    if let Err(e) = app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
