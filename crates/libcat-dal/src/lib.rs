pub mod account;
pub mod author;
pub mod book;
pub mod catalog;
pub mod collection;
pub mod comment;
pub mod error;
pub mod genre;
pub mod profile;
pub mod user;

use std::{fmt::Display, str::FromStr};

pub use error::Error;
pub use sqlx::Error as SqlxError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::debug;

use crate::error::Result;

pub type ChosenDB = sqlx::Sqlite;
pub type ChosenRow = sqlx::sqlite::SqliteRow;
pub type Pool = sqlx::Pool<ChosenDB>;

pub const MAX_LIMIT: usize = 10_000;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

pub async fn new_pool(database_url: &str) -> Result<Pool, Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(50)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Single connection in memory database with schema applied, the connection is never recycled
/// as it would drop the database
pub async fn new_memory_pool() -> Result<Pool, Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &Pool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    debug!("Database schema is up to date");
    Ok(())
}

#[derive(Debug, Clone)]
pub enum Order {
    Asc(String),
    Desc(String),
}

impl Order {
    fn qualified(&self, alias: Option<&str>) -> String {
        let (name, suffix) = match self {
            Order::Asc(s) => (s, ""),
            Order::Desc(s) => (s, " DESC"),
        };
        match alias {
            Some(alias) => format!("{alias}.{name}{suffix}"),
            None => format!("{name}{suffix}"),
        }
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.qualified(None))
    }
}

impl AsRef<str> for Order {
    fn as_ref(&self) -> &str {
        match self {
            Order::Asc(s) => s.as_str(),
            Order::Desc(s) => s.as_str(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListingParams {
    pub offset: i64,
    pub limit: i64,
    pub order: Option<Vec<Order>>,
}

impl Default for ListingParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: MAX_LIMIT as i64,
            order: None,
        }
    }
}

impl ListingParams {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset,
            limit,
            order: None,
        }
    }
    pub fn with_order(mut self, order: Vec<Order>) -> Self {
        self.order = Some(order);
        self
    }

    /// `ORDER BY` clause (or empty string), field names are checked against `valid_fields`
    /// and optionally qualified with table alias
    pub fn order_clause(&self, valid_fields: &[&str], alias: Option<&str>) -> Result<String> {
        let ordering = self
            .order
            .as_ref()
            .filter(|o| !o.is_empty())
            .map(|o| {
                o.iter()
                    .map(|o| {
                        if valid_fields.contains(&o.as_ref()) {
                            Ok(o.qualified(alias))
                        } else {
                            Err(Error::InvalidOrderByField(o.as_ref().to_string()))
                        }
                    })
                    .collect::<Result<Vec<String>>>()
                    .map(|o| format!("ORDER BY {}", o.join(", ")))
            })
            .transpose()?
            .unwrap_or_default();
        Ok(ordering)
    }
}

/// One page of listed records
#[derive(Debug)]
pub struct Batch<T> {
    pub offset: i64,
    pub limit: i64,
    pub rows: Vec<T>,
    pub total: u64,
}

pub(crate) fn count_to_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

/// Loads nested struct from joined columns named `<prefix>_<field>`
pub trait FromRowPrefixed: Sized {
    fn from_row_prefixed(row: &ChosenRow) -> Result<Option<Self>, sqlx::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_clause() {
        let params = ListingParams::default().with_order(vec![
            Order::Asc("title".into()),
            Order::Desc("id".into()),
        ]);
        assert_eq!(
            params.order_clause(&["id", "title"], Some("b")).unwrap(),
            "ORDER BY b.title, b.id DESC"
        );
        assert_eq!(
            params.order_clause(&["id", "title"], None).unwrap(),
            "ORDER BY title, id DESC"
        );
        assert!(matches!(
            params.order_clause(&["id"], None),
            Err(Error::InvalidOrderByField(f)) if f == "title"
        ));
        assert_eq!(ListingParams::default().order_clause(&["id"], None).unwrap(), "");
    }
}
