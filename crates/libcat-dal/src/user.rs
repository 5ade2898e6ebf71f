use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{Result as HashResult, SaltString, rand_core::OsRng},
};

use garde::Validate;
use libcat_types::{claim::Role, general::ValidEmail, validation::rules};
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, Executor};
use tracing::{debug, info};

use crate::{
    ChosenDB, Error,
    account::{AccountEvent, AccountHooks},
    count_to_total,
    error::Result,
};

fn hash_password(password: &str) -> HashResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(password_hash)
}

fn verify_password(password: &str, password_hash: &str) -> HashResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)?;
    let res = Argon2::default().verify_password(password.as_bytes(), &parsed_hash);
    if let Err(e) = res {
        debug!("Invalid password, error {e}");
    }
    Ok(res.is_ok())
}

fn is_valid_role(role: &str, _ctx: &()) -> garde::Result {
    role.parse::<Role>().map_err(garde::Error::new).map(|_| ())
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateUser {
    #[garde(length(min = 3, max = 150), custom(rules::username))]
    pub name: String,
    #[garde(dive)]
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub email: ValidEmail,
    #[garde(length(min = 8, max = 255))]
    pub password: Option<String>,
    #[garde(inner(inner(custom(is_valid_role))))]
    pub roles: Option<Vec<String>>,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    roles: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<String>))]
    pub roles: Vec<Role>,
}

impl From<UserRow> for User {
    fn from(value: UserRow) -> Self {
        let roles = value
            .roles
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse().ok())
            .collect();
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            roles,
        }
    }
}

pub type UserRepository = UserRepositoryImpl<sqlx::Pool<ChosenDB>>;

pub struct UserRepositoryImpl<E> {
    executor: E,
    hooks: AccountHooks,
}

impl<'c, E> UserRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB> + Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self::with_hooks(executor, AccountHooks::default())
    }

    pub fn with_hooks(executor: E, hooks: AccountHooks) -> Self {
        Self { executor, hooks }
    }

    /// Creates account together with everything account observers provision for it
    pub async fn create(&self, payload: CreateUser) -> Result<User> {
        let password = payload.password.map(|p| hash_password(&p)).transpose()?;
        let roles = payload.roles.map(|roles| roles.join(","));

        let mut tx = self.executor.begin().await?;
        let result =
            sqlx::query("INSERT INTO users (name, email, password, roles) VALUES (?, ?, ?, ?)")
                .bind(&payload.name)
                .bind(payload.email.as_ref())
                .bind(password)
                .bind(roles)
                .execute(&mut *tx)
                .await
                .map_err(Error::on_write("User"))?;
        let user_id = result.last_insert_rowid();
        self.hooks
            .emit(&mut *tx, AccountEvent::Created { user_id })
            .await?;
        tx.commit().await?;

        info!("Created account {} ({user_id})", payload.name);
        self.get(user_id).await
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM users")
            .fetch_one(&self.executor)
            .await?;
        Ok(count_to_total(count))
    }

    pub async fn list(&self, limit: i64) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, roles FROM users ORDER BY id LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.executor)
        .await?
        .into_iter()
        .map(User::from)
        .collect();
        Ok(users)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;
        if res.rows_affected() == 0 {
            Err(Error::not_found("User", id))
        } else {
            Ok(())
        }
    }

    pub async fn get(&self, id: i64) -> Result<User> {
        sqlx::query_as::<_, UserRow>("SELECT id, name, email, roles FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .map(User::from)
            .ok_or_else(|| Error::not_found("User", id))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user =
            sqlx::query_as::<_, UserRow>("SELECT id, name, email, roles FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.executor)
                .await?
                .map(User::from);
        Ok(user)
    }

    pub async fn check_password(&self, email: &str, password: &str) -> Result<User> {
        let (id, hashed_password): (i64, Option<String>) =
            sqlx::query_as("SELECT id, password FROM users WHERE email = ?")
                .bind(email)
                .fetch_one(&self.executor)
                .await
                .map_err(|e| {
                    debug!("User check error: {e}");
                    Error::InvalidCredentials
                })?;
        if let Some(hashed_password) = hashed_password {
            if verify_password(password, &hashed_password).unwrap_or(false) {
                return self.get(id).await;
            }
        }
        Err(Error::InvalidCredentials)
    }
}
