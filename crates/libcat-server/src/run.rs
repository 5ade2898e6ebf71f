use std::path::Path;

use crate::config::ServerConfig;
use crate::error::Result;
use axum::http::StatusCode;
use axum::{response::IntoResponse, routing::get, Router};
use futures::FutureExt;
use libcat_app::rest_api::{author, book, collection, genre, profile, search, stats, transfer};
use libcat_app::state::AppState;
use libcat_app::{
    auth::{auth_router, token::TokenLayer},
    user::users_router,
};
use libcat_auth::token::{TokenManager, MIN_SECRET_LEN};
use tokio::{fs, io::AsyncWriteExt as _};
use tracing::{debug, info};

const SECRET_FILE: &str = "secret";

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}

pub async fn run_with_state(args: ServerConfig, state: AppState) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let mut app = main_router(state);

    if args.cors {
        app = app.layer(tower_http::cors::CorsLayer::very_permissive());
    }

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server stopped");
    Ok(())
}

#[cfg(feature = "openapi")]
fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::openapi::Components;

    #[derive(utoipa::OpenApi)]
    #[openapi(modifiers(&SecurityAddon), security(("bearer" = [])))]
    struct OpenApi;

    struct SecurityAddon;

    impl utoipa::Modify for SecurityAddon {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

            openapi
                .components
                .get_or_insert_with(Components::new)
                .add_security_scheme(
                    "bearer",
                    SecurityScheme::Http(
                        HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build(),
                    ),
                );
        }
    }

    use utoipa::OpenApi as _;
    OpenApi::openapi()
        .nest("/api/author", author::api_docs())
        .nest("/api/book", book::api_docs())
        .nest("/api/book", libcat_app::rest_api::comment::api_docs())
        .nest("/api/genre", genre::api_docs())
        .nest("/api/collection", collection::api_docs())
        .nest("/api/profile", profile::api_docs())
        .nest("/api/search", search::api_docs())
        .nest("/api/stats", stats::api_docs())
        .nest("/api/transfer", transfer::api_docs())
        .nest("/users", libcat_app::user::api_docs())
        .nest("/auth", libcat_app::auth::api_docs())
}

pub fn main_router(state: AppState) -> Router<()> {
    #[allow(unused_mut)]
    let mut router = Router::new()
        .nest("/users", users_router())
        .nest("/api/author", author::router())
        .nest("/api/genre", genre::router())
        .nest("/api/book", book::router())
        .nest("/api/collection", collection::router())
        .nest("/api/profile", profile::router())
        .nest("/api/search", search::router())
        .nest("/api/stats", stats::router())
        .nest(
            "/api/transfer",
            transfer::router(state.config().upload_limit_mb),
        )
        // Token is checked for all routes above, anonymous access is decided per route
        .layer(TokenLayer::new(state.clone()))
        .nest("/auth", auth_router())
        .layer(tower_cookies::CookieManagerLayer::new())
        .with_state(state)
        .route("/health", get(health));

    #[cfg(feature = "openapi")]
    {
        let docs = api_docs();
        router = router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs),
        );
    }
    router
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    // Its OK here to block, as it's short and called only on init
    let data_dir = config.backend.ensure_data_dir()?;

    let pool = libcat_dal::new_pool(&config.database_url()).await?;
    libcat_dal::migrate(&pool).await?;
    debug!("Database ready at {}", config.database_url());

    let secret = read_secret(&data_dir).await?;
    let tokens = TokenManager::new(&secret, config.token_validity)?;
    Ok(AppState::new(config.into(), pool, tokens))
}

async fn read_secret(data_dir: &Path) -> Result<Vec<u8>, std::io::Error> {
    let secret_file = data_dir.join(SECRET_FILE);

    let secret = if fs::try_exists(&secret_file).await? {
        fs::read(&secret_file).await?
    } else {
        let random_bytes = rand::random::<[u8; MIN_SECRET_LEN]>();
        #[cfg(unix)]
        let mut file = {
            use std::fs::OpenOptions;
            use std::os::unix::fs::OpenOptionsExt;
            {
                // Only current user can read the secret
                let _f = OpenOptions::new()
                    .mode(0o600)
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(&secret_file)?;
            }
            fs::File::options().write(true).open(&secret_file).await?
        };
        #[cfg(not(unix))]
        let mut file = fs::File::create(&secret_file).await?;

        file.write_all(&random_bytes).await?;
        info!("Generated new token secret");
        random_bytes.to_vec()
    };
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_secret_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let first = read_secret(dir.path()).await.unwrap();
        assert_eq!(first.len(), MIN_SECRET_LEN);
        let second = read_secret(dir.path()).await.unwrap();
        assert_eq!(first, second);
    }
}
