use std::sync::Arc;

use crate::error::Result;
use libcat_auth::token::TokenManager;
use libcat_dal::{author::AuthorDeletePolicy, Pool};
use tokio::sync::{Mutex, MutexGuard};
use url::Url;

#[derive(Clone)]
pub struct AppState {
    state: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(app_config: AppConfig, pool: Pool, tokens: TokenManager) -> Self {
        AppState {
            state: Arc::new(AppStateInner {
                app_config,
                pool,
                tokens,
                import_lock: Mutex::new(()),
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.app_config
    }

    pub fn build_url(&self, relative_url: &str) -> Result<Url> {
        let base = &self.config().base_url;
        let url = base.join(relative_url)?;
        Ok(url)
    }

    pub fn pool(&self) -> &Pool {
        &self.state.pool
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.state.tokens
    }

    /// Imports are run one at a time, guard must be held for whole import
    pub async fn lock_import(&self) -> MutexGuard<'_, ()> {
        self.state.import_lock.lock().await
    }
}

// Validation context for `axum_valid::Garde` extractors (garde `Context = ()`)
impl axum::extract::FromRef<AppState> for () {
    fn from_ref(_state: &AppState) -> Self {}
}

struct AppStateInner {
    pool: Pool,
    app_config: AppConfig,
    tokens: TokenManager,
    import_lock: Mutex<()>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: Url,
    pub default_page_size: u32,
    pub upload_limit_mb: usize,
    pub author_delete_policy: AuthorDeletePolicy,
}
