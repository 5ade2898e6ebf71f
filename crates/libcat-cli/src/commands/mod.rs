use libcat_dal::Pool;
use libcat_types::config::BackendConfig;

pub mod create_user;
pub mod export;
pub mod import;

#[allow(async_fn_in_trait)]
pub trait Executor {
    async fn run(self) -> anyhow::Result<()>;
}

/// Opens catalog database, creating data directory and schema when missing
async fn open_pool(backend: &BackendConfig) -> anyhow::Result<Pool> {
    backend.ensure_data_dir()?;
    let pool = libcat_dal::new_pool(&backend.database_url()).await?;
    libcat_dal::migrate(&pool).await?;
    Ok(pool)
}
