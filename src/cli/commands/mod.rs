pub mod check;
pub mod dump;
pub mod stats;

use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use tracing::{info, warn};

/// Load the application configuration, or explain how to provide one
pub fn load_app_config() -> AppResult<AppConfig> {
    match AppConfig::load() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            Ok(config)
        }
        Err(e) => {
            warn!("Failed to load configuration: {}", e);
            info!("Create config.toml or set MITM_* environment variables to configure file paths");
            Err(AppError::Config(format!("Configuration error: {}", e)))
        }
    }
}
