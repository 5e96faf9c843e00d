use crate::cli::commands::load_app_config;
use crate::database::RecordStore;
use crate::errors::AppResult;
use crate::processor::{Processor, ProcessorConfig};
use clap::Args;

#[derive(Args)]
#[command(author, version, about, long_about = None)]
pub struct StatsCommand {}

impl StatsCommand {
    pub fn run(&self) -> AppResult<()> {
        let app_config = load_app_config()?;
        let processor_config = ProcessorConfig::from_app_config(&app_config)?;
        let processor = Processor::new(&processor_config)?;

        println!("=== Corpus Statistics ===");
        println!("Browser records: {}", processor.browser_store().len());
        println!("MITM records:    {}", processor.mitm_store().len());
        println!("Bad headers:     {}", processor.bad_header_set().len());
        println!();
        println!("Browser records per (browser, os) bucket:");
        for ((browser, os), count) in processor.browser_store().bucket_counts() {
            println!("  {:>6} {:<10} {}", count, browser.to_string(), os);
        }
        Ok(())
    }
}
