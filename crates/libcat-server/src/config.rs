use std::{path::PathBuf, time::Duration};

use crate::error::Result;
pub use clap::Parser;
use libcat_app::state::AppConfig;
use libcat_dal::author::AuthorDeletePolicy;
use libcat_types::config::BackendConfig;
use url::Url;

#[derive(Debug, Clone, clap::Parser)]
#[command(version, about = "Library catalog server")]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "LIBCAT_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "LIBCAT_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "LIBCAT_BASE_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of frontend app and server, as visible to users"
    )]
    pub base_url: Url,

    #[command(flatten)]
    pub backend: BackendConfig,

    #[arg(
        long,
        env = "LIBCAT_TOKEN_VALIDITY",
        default_value = "1 day",
        help = "Default token validity in human friendly format (e.g. 1d, 1h, 1m, 1s - or combined)",
        value_parser = humantime::parse_duration
    )]
    pub token_validity: Duration,

    #[arg(
        long,
        env = "LIBCAT_UPLOAD_LIMIT_MB",
        default_value = "20",
        help = "Maximum size of uploaded spreadsheet in MB"
    )]
    pub upload_limit_mb: usize,

    #[arg(
        long,
        env = "LIBCAT_DEFAULT_PAGE_SIZE",
        default_value = "100",
        value_parser = clap::value_parser!(u32).range(1..=1000),
        help = "Default page size"
    )]
    pub default_page_size: u32,

    #[arg(
        long,
        env = "LIBCAT_AUTHOR_DELETE_POLICY",
        default_value = "detach",
        help = "What happens to books of deleted author: detach (keep books without author) or cascade (delete them)"
    )]
    pub author_delete_policy: AuthorDeletePolicy,

    #[arg(long, env = "LIBCAT_CORS", help = "Enable permissive CORS")]
    pub cors: bool,
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.backend.data_dir()
    }

    pub fn database_url(&self) -> String {
        self.backend.database_url()
    }
}

impl From<&ServerConfig> for AppConfig {
    fn from(config: &ServerConfig) -> Self {
        AppConfig {
            base_url: config.base_url.clone(),
            default_page_size: config.default_page_size,
            upload_limit_mb: config.upload_limit_mb,
            author_delete_policy: config.author_delete_policy,
        }
    }
}
