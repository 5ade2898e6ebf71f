use std::path::PathBuf;

use clap::Parser;
use libcat_dal::catalog::SqliteCatalog;
use libcat_transfer::import::Importer;
use libcat_types::config::BackendConfig;

use crate::commands::{open_pool, Executor};

/// Imports catalog spreadsheet, prints import report as JSON
#[derive(Parser, Debug)]
pub struct ImportCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(help = "Spreadsheet file (.xlsx, .xls, .ods)")]
    file: PathBuf,
}

impl Executor for ImportCmd {
    async fn run(self) -> anyhow::Result<()> {
        let data = tokio::fs::read(&self.file).await?;
        let pool = open_pool(&self.backend).await?;
        let catalog = SqliteCatalog::new(pool);
        let report = Importer::new(&catalog).import_bytes(data).await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}
