use crate::database::{LinearStore, RecordStore, TreeStore};
use crate::errors::AppResult;
use clap::Args;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
#[command(author, version, about, long_about = None)]
pub struct DumpCommand {
    /// Signature file to load and re-serialise
    #[arg(long)]
    file: PathBuf,

    /// Index through the browser/OS tree store instead of the linear store
    /// (output is then bucket order, not input order)
    #[arg(long)]
    tree: bool,
}

impl DumpCommand {
    pub fn run(&self) -> AppResult<()> {
        let mut reader = BufReader::new(File::open(&self.file)?);
        let mut stdout = std::io::stdout();
        if self.tree {
            let store = TreeStore::from_reader(&mut reader)?;
            info!("loaded {} records from {}", store.len(), self.file.display());
            store.dump(&mut stdout)?;
        } else {
            let store = LinearStore::from_reader(&mut reader)?;
            info!("loaded {} records from {}", store.len(), self.file.display());
            store.dump(&mut stdout)?;
        }
        Ok(())
    }
}
