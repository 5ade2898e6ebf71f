use std::{fmt::Display, path::Path, time::Duration};

use anyhow::{Result, anyhow};
use libcat_dal::user::{CreateUser, UserRepository};
use libcat_server::config::{Parser, ServerConfig};
use rand::Rng as _;
use reqwest::{
    Client, Url,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde_json::json;
use tempfile::TempDir;
use time::{OffsetDateTime, PrimitiveDateTime};
use tracing::{debug, info};

pub mod rest;

const HEALTH_RETRIES: u32 = 50;

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, std::time::Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

pub struct ConfigGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
}

pub fn test_config(
    test_name: &str,
    base_dir: &Path,
    extra_args: &[&str],
) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix_in(format!("{}_", test_name), base_dir)?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?;
    let port = port.to_string();
    let base_url = format!("http://localhost:{}", port);
    let mut args = vec![
        "libcat-e2e-tests",
        "--data-dir",
        &data_dir,
        "--port",
        &port,
        "--base-url",
        &base_url,
    ];
    args.extend_from_slice(extra_args);
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

/// Test config with migrated database, so users can be created before server starts
pub async fn prepare_env(test_name: &str) -> Result<(ServerConfig, ConfigGuard)> {
    prepare_env_with_args(test_name, &[]).await
}

pub async fn prepare_env_with_args(
    test_name: &str,
    extra_args: &[&str],
) -> Result<(ServerConfig, ConfigGuard)> {
    let (args, guard) = test_config(test_name, &std::env::temp_dir(), extra_args)?;
    let pool = libcat_dal::new_pool(&args.database_url()).await?;
    libcat_dal::migrate(&pool).await?;
    pool.close().await;
    Ok((args, guard))
}

/// Starts server in background task and waits until it is healthy
pub async fn spawn_server(args: ServerConfig) -> Result<()> {
    let health_url = args.base_url.join("health")?;
    let state = libcat_server::run::build_state(&args).await?;
    tokio::spawn(async move {
        let res = libcat_server::run::run_graceful_with_state(
            args,
            state,
            std::future::pending::<()>(),
        )
        .await;
        if let Err(e) = res {
            tracing::error!("Server failed: {e}");
        }
    });

    let client = Client::new();
    for _ in 0..HEALTH_RETRIES {
        match client.get(health_url.clone()).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Server is up");
                return Ok(());
            }
            _ => tokio::time::sleep(Duration::from_millis(100)).await,
        }
    }
    Err(anyhow!("Server did not start"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestUser {
    Admin,
    TrustedUser,
    User,
}

impl TestUser {
    pub fn name(&self) -> &'static str {
        match self {
            TestUser::Admin => "admin",
            TestUser::TrustedUser => "trusted",
            TestUser::User => "reader",
        }
    }

    pub fn email(&self) -> String {
        format!("{}@localhost", self.name())
    }

    pub fn password(&self) -> &'static str {
        match self {
            TestUser::Admin => "admin-password",
            TestUser::TrustedUser => "trusted-password",
            TestUser::User => "reader-password",
        }
    }

    fn roles(&self) -> Option<Vec<String>> {
        match self {
            TestUser::Admin => Some(vec!["admin".to_string()]),
            TestUser::TrustedUser => Some(vec!["trusted".to_string()]),
            TestUser::User => None,
        }
    }
}

/// Creates test user directly in database
pub async fn add_user(args: &ServerConfig, user: TestUser) -> Result<libcat_dal::user::User> {
    let pool = libcat_dal::new_pool(&args.database_url()).await?;
    let repository = UserRepository::new(pool.clone());
    let new_user = CreateUser {
        name: user.name().to_string(),
        email: user.email().parse()?,
        password: Some(user.password().to_string()),
        roles: user.roles(),
    };
    let created = repository.create(new_user).await?;
    pool.close().await;
    Ok(created)
}

/// Logs in and returns client sending the token in `Authorization` header, plus the token
pub async fn login(base_url: &Url, user: TestUser) -> Result<(Client, String)> {
    let response = Client::new()
        .post(base_url.join("auth/login")?)
        .json(&json!({"email": user.email(), "password": user.password()}))
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(anyhow!("Login failed with status {}", response.status()));
    }
    let token = response.text().await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token))?,
    );
    let client = Client::builder()
        .cookie_store(true)
        .default_headers(headers)
        .build()?;
    Ok((client, token))
}

/// Creates user, starts server and returns client logged in as that user
pub async fn launch_env(args: ServerConfig, user: TestUser) -> Result<(Client, String)> {
    let base_url = args.base_url.clone();
    add_user(&args, user).await?;
    spawn_server(args).await?;
    info!("Server started at {base_url}");
    login(&base_url, user).await
}

pub fn extend_url(url: &Url, segment: impl Display) -> Url {
    let mut url = url.clone();
    url.path_segments_mut()
        .expect("base URL")
        .pop_if_empty()
        .push(&segment.to_string());
    url
}

/// Current UTC time, as stored in database timestamps
pub fn now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}
