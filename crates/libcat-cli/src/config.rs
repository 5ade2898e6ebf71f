use clap::{Parser, Subcommand};

use crate::commands::{create_user::CreateUserCmd, export::ExportCmd, import::ImportCmd};

#[derive(Parser)]
#[command(
    version,
    about,
    long_about = "CLI for libcat - manages users and imports/exports catalog spreadsheets directly in the database."
)]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    CreateUser(CreateUserCmd),
    Import(ImportCmd),
    Export(ExportCmd),
}

impl crate::commands::Executor for Command {
    async fn run(self) -> anyhow::Result<()> {
        match self {
            Command::CreateUser(cmd) => cmd.run().await,
            Command::Import(cmd) => cmd.run().await,
            Command::Export(cmd) => cmd.run().await,
        }
    }
}
