//! Pluggable signature-file loader
//!
//! The processor reads its fingerprint corpora through a [`Loader`]
//! capability so deployments can serve signature files from somewhere other
//! than the host filesystem. Loads run on the caller's thread and complete
//! before any check starts; the core never suspends.

use crate::errors::{AppError, AppResult};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Capability for fetching a named signature file as a byte stream
pub trait Loader: Send + Sync {
    fn load_file(&self, name: &str) -> AppResult<Box<dyn Read + Send>>;
}

/// Loads files from the host filesystem, optionally under a base directory.
/// This is the default when no loader is configured.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    base_dir: Option<PathBuf>,
}

impl FileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        FileLoader {
            base_dir: Some(base_dir.into()),
        }
    }
}

impl Loader for FileLoader {
    fn load_file(&self, name: &str) -> AppResult<Box<dyn Read + Send>> {
        let path = match &self.base_dir {
            Some(base) => base.join(name),
            None => PathBuf::from(name),
        };
        debug!("loading signature file {}", path.display());
        let file = File::open(&path)
            .map_err(|err| AppError::Loader(format!("{}: {}", path.display(), err)))?;
        Ok(Box::new(file))
    }
}

/// Fetches signature files from a remote HTTP(S) source by joining the file
/// name onto a base URL
pub struct HttpLoader {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpLoader {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(HttpLoader {
            base_url: base_url.into(),
            client,
        })
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), name)
    }
}

impl Loader for HttpLoader {
    fn load_file(&self, name: &str) -> AppResult<Box<dyn Read + Send>> {
        let url = self.url_for(name);
        debug!("fetching signature file {}", url);
        let response = self.client.get(&url).send()?.error_for_status()?;
        Ok(Box::new(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_loader_reads_contents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("browser.sig"), "# empty corpus\n").unwrap();

        let loader = FileLoader::with_base_dir(dir.path());
        let mut contents = String::new();
        loader
            .load_file("browser.sig")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "# empty corpus\n");
    }

    #[test]
    fn test_file_loader_missing_file_is_loader_error() {
        let loader = FileLoader::new();
        let err = match loader.load_file("/definitely/not/here.sig") {
            Ok(_) => panic!("expected an error"),
            Err(e) => e,
        };
        assert!(matches!(err, AppError::Loader(_)));
    }

    #[test]
    fn test_http_loader_joins_urls() {
        let loader = HttpLoader::new("https://example.test/sigs/", Duration::from_secs(5)).unwrap();
        assert_eq!(loader.url_for("mitm.sig"), "https://example.test/sigs/mitm.sig");
    }
}
