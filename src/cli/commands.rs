//! CLI command implementations

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{error, info, success, warn};
use crate::config::{self, loader::CONFIG_FILENAME, Config, StoreBackend};
use crate::store::PgStore;

/// Write a default courses.toml
pub async fn init(force: bool) -> Result<()> {
    let config_path = Path::new(CONFIG_FILENAME);

    if config_path.exists() && !force {
        warn(&format!("{} already exists (use --force to overwrite)", CONFIG_FILENAME));
        return Ok(());
    }

    fs::write(config_path, config::loader::default_config_content())?;

    success(&format!("Created {}", CONFIG_FILENAME));
    info("Run 'courses-api serve' to start the API");

    Ok(())
}

/// Start the HTTP API server
pub async fn serve(host: Option<String>, port: Option<u16>, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = resolve_config(config_path)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    if config.database.backend == StoreBackend::Memory {
        warn("Using the in-memory store; data is lost when the server stops");
    }
    info(&format!("Starting server at http://{}", config.bind_address()));

    if let Err(e) = crate::api::run_server(config).await {
        error(&format!("Server failed: {}", e));
        return Err(e.into());
    }
    Ok(())
}

/// Create the database schema
pub async fn migrate(config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path)?;

    if config.database.backend != StoreBackend::Postgres {
        warn("The configured backend is not postgres; nothing to migrate");
        return Ok(());
    }

    let store = PgStore::connect(&config.database.url).await?;
    store.migrate().await?;
    success("Database schema is up to date");
    Ok(())
}

/// An explicit path must exist; otherwise search for courses.toml and fall back to defaults
fn resolve_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => config::load_config_from_path(&path)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e)),
        None => match config::load_config() {
            Ok(config) => Ok(config),
            Err(crate::Error::ConfigNotFound) => {
                warn(&format!("No {} found, using defaults", CONFIG_FILENAME));
                Ok(Config::default())
            }
            Err(e) => Err(anyhow::anyhow!("{}", e)),
        },
    }
}
