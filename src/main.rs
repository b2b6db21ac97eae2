mod app;
mod config;
mod detector;
mod domain;
mod infrastructure;
mod telegram;

use anyhow::Result;
use infrastructure::{directories, logging, shutdown};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config)?;
    logging::init_tracing(&config, &paths)?;

    let shutdown = shutdown::Shutdown::new();
    let app = match app::DetectorApp::initialize(config, &paths, shutdown.clone()) {
        Ok(app) => app,
        Err(err) => {
            tracing::error!(target: "model", error = ?err, "startup aborted");
            return Err(err);
        }
    };
    shutdown::install_signal_handlers(shutdown);

    app.run().await
}
