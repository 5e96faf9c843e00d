use crate::cli::commands::load_app_config;
use crate::database::RecordStore;
use crate::errors::AppResult;
use crate::processor::{Processor, ProcessorConfig};
use crate::types::{RequestFingerprint, UaFingerprint};
use clap::Args;
use tracing::info;

#[derive(Args)]
#[command(author, version, about, long_about = None)]
pub struct CheckCommand {
    /// Raw User-Agent header value
    #[arg(long)]
    user_agent: String,

    /// Decoded user-agent fingerprint (browser:version:os:device:quirks)
    #[arg(long)]
    ua_fingerprint: String,

    /// Decoded ClientHello fingerprint
    /// (version:cipher:extension:curve:ecpointfmt:header:quirk, hex lists)
    #[arg(long)]
    request_fingerprint: String,

    /// Browser signature file (overrides config.toml and env vars)
    #[arg(long)]
    browser_file: Option<String>,

    /// MITM signature file (overrides config.toml and env vars)
    #[arg(long)]
    mitm_file: Option<String>,

    /// Bad-header file (overrides config.toml and env vars)
    #[arg(long)]
    bad_header_file: Option<String>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

impl CheckCommand {
    pub fn run(&self) -> AppResult<()> {
        let app_config = load_app_config()?;

        // CLI arguments override config values
        let mut processor_config = ProcessorConfig::from_app_config(&app_config)?;
        if let Some(browser_file) = &self.browser_file {
            processor_config.browser_file_name = browser_file.clone();
        }
        if let Some(mitm_file) = &self.mitm_file {
            processor_config.mitm_file_name = mitm_file.clone();
        }
        if let Some(bad_header_file) = &self.bad_header_file {
            processor_config.bad_header_file_name = bad_header_file.clone();
        }

        let processor = Processor::new(&processor_config)?;
        info!(
            "checking user agent {:?} against {} browser records",
            self.user_agent,
            processor.browser_store().len()
        );

        let ua_fingerprint: UaFingerprint = self.ua_fingerprint.parse()?;
        let request_fingerprint: RequestFingerprint = self.request_fingerprint.parse()?;
        let report = processor.check(&ua_fingerprint, &self.user_agent, &request_fingerprint);

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };
        println!("{}", rendered);
        Ok(())
    }
}
