use crate::errors::AppResult;
use crate::loader::{HttpLoader, Loader};
use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Application configuration loaded from config.toml or environment variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub fingerprints: FingerprintsConfig,
    pub loader: LoaderConfig,
}

/// Names of the three signature files consumed by the processor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintsConfig {
    pub browser_file: String,
    pub mitm_file: String,
    pub bad_header_file: String,
}

/// Where signature files are fetched from. With no base URL the host
/// filesystem is used directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for FingerprintsConfig {
    fn default() -> Self {
        Self {
            browser_file: "fingerprints/browser.sig".to_string(),
            mitm_file: "fingerprints/mitm.sig".to_string(),
            bad_header_file: "fingerprints/badheader.sig".to_string(),
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_seconds: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from config.toml file and environment variables
    /// Environment variables take precedence over file configuration
    pub fn load() -> Result<Self, ConfigError> {
        let fingerprint_defaults = FingerprintsConfig::default();
        let loader_defaults = LoaderConfig::default();
        let config = Config::builder()
            // Start with default values
            .set_default("fingerprints.browser_file", fingerprint_defaults.browser_file)?
            .set_default("fingerprints.mitm_file", fingerprint_defaults.mitm_file)?
            .set_default(
                "fingerprints.bad_header_file",
                fingerprint_defaults.bad_header_file,
            )?
            .set_default("loader.timeout_seconds", loader_defaults.timeout_seconds)?
            // Load from config.toml if it exists
            .add_source(File::with_name("config").required(false))
            // MITM_* environment variables override file configuration
            .add_source(config::Environment::with_prefix("MITM").separator("__"))
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        // Check for specific environment variables with custom names
        if let Ok(browser_file) = env::var("MITM_BROWSER_FILE") {
            app_config.fingerprints.browser_file = browser_file;
        }
        if let Ok(mitm_file) = env::var("MITM_MITM_FILE") {
            app_config.fingerprints.mitm_file = mitm_file;
        }
        if let Ok(bad_header_file) = env::var("MITM_BAD_HEADER_FILE") {
            app_config.fingerprints.bad_header_file = bad_header_file;
        }
        if let Ok(base_url) = env::var("MITM_LOADER_URL") {
            app_config.loader.base_url = Some(base_url);
        }

        Ok(app_config)
    }

    /// Build the configured remote loader, if any. `None` means the
    /// processor should read the host filesystem directly.
    pub fn build_loader(&self) -> AppResult<Option<Box<dyn Loader>>> {
        match &self.loader.base_url {
            Some(base_url) => {
                let loader =
                    HttpLoader::new(base_url, Duration::from_secs(self.loader.timeout_seconds))?;
                Ok(Some(Box::new(loader)))
            }
            None => Ok(None),
        }
    }
}
