//! Common Test Utilities
//!
//! Shared fixture builders used across the integration suites: canonical
//! corpus lines, observed fingerprints that match them, and a helper that
//! materialises signature files in a temp directory and builds a processor
//! from them.

#![allow(dead_code)]

use anyhow::Result;
use mitm_analyser::processor::{Processor, ProcessorConfig};
use mitm_analyser::types::{
    BrowserName, BrowserVersion, DeviceType, OsName, RequestFingerprint, UaFingerprint,
};
use std::path::Path;
use tempfile::TempDir;

/// A Chrome desktop record whose request signature admits
/// [`chrome_request`]
pub const CHROME_RECORD: &str =
    "chrome:90-120:windows:computer:|301,303,304:$c02b,$c02f:^0,5,a,?15:17,1d:0:1,2,3:grease";

/// A catch-all MITM record for a known proxy product
pub const PROXY_MITM_RECORD: &str =
    "*:*-*:*:*:|300,303,305:2f,9c,c02b,c02f:0,5:1d:0:1,2:|foo-proxy:proxy:c";

/// An observed ClientHello that fits [`CHROME_RECORD`] outright
pub fn chrome_request() -> RequestFingerprint {
    "303:c02b,c02f:0,5:1d:0:1,2:".parse().unwrap()
}

/// An observed user agent that fits [`CHROME_RECORD`]
pub fn chrome_ua() -> UaFingerprint {
    UaFingerprint {
        browser_name: BrowserName::Chrome,
        browser_version: BrowserVersion::Major(100),
        os_name: OsName::Windows,
        device_type: DeviceType::Computer,
        quirk: vec![],
    }
}

pub const CHROME_RAW_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/100.0.4896.60 Safari/537.36";

/// Signature files materialised in a temp directory
pub struct TestCorpus {
    dir: TempDir,
}

impl TestCorpus {
    /// Write the three signature files with the given contents
    pub fn new(browser: &str, mitm: &str, bad_headers: &str) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("browser.sig"), browser)?;
        std::fs::write(dir.path().join("mitm.sig"), mitm)?;
        std::fs::write(dir.path().join("badheader.sig"), bad_headers)?;
        Ok(TestCorpus { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Processor configuration pointing at the corpus files
    pub fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig {
            browser_file_name: self.file_name("browser.sig"),
            mitm_file_name: self.file_name("mitm.sig"),
            bad_header_file_name: self.file_name("badheader.sig"),
            loader: None,
        }
    }

    /// Build a processor from the corpus
    pub fn processor(&self) -> Result<Processor> {
        Ok(Processor::new(&self.processor_config())?)
    }

    fn file_name(&self, name: &str) -> String {
        self.dir.path().join(name).to_str().unwrap().to_string()
    }
}

/// Processor loaded from browser/MITM corpora with no bad headers
pub fn processor_from(browser: &str, mitm: &str) -> Result<Processor> {
    TestCorpus::new(browser, mitm, "")?.processor()
}
