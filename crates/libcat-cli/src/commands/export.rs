use std::path::PathBuf;

use clap::Parser;
use libcat_dal::catalog::SqliteCatalog;
use libcat_transfer::{export::Exporter, EXPORT_FILE_NAME};
use libcat_types::config::BackendConfig;
use tracing::info;

use crate::commands::{open_pool, Executor};

#[derive(Parser, Debug)]
pub struct ExportCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(short, long, help = "Output file", default_value = EXPORT_FILE_NAME)]
    output: PathBuf,
}

impl Executor for ExportCmd {
    async fn run(self) -> anyhow::Result<()> {
        let pool = open_pool(&self.backend).await?;
        let catalog = SqliteCatalog::new(pool);
        let data = Exporter::new(&catalog).export().await?;
        tokio::fs::write(&self.output, &data).await?;
        info!("Exported catalog to {:?} ({} bytes)", self.output, data.len());
        Ok(())
    }
}
