use tracing::{error, info};

use depot::web::WebServer;
use depot::{Config, Database};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = depot::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        depot::logging::init_console_only(&config.logging.level);
    }

    info!("depot - single-tenant file storage");
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    let server = match WebServer::new(&config, db).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to initialize server: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("Server error: {e}");
        std::process::exit(1);
    }
}
