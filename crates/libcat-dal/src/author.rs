use std::{fmt::Display, str::FromStr};

use crate::{Batch, ChosenDB, Error, FromRowPrefixed, ListingParams, count_to_total, error::Result};
use futures::TryStreamExt as _;
use garde::Validate;
use libcat_types::validation::rules;
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, Executor, Row as _};
use tracing::debug;

pub const DEFAULT_BIO: &str = "No bio";

const VALID_ORDER_FIELDS: &[&str] = &["id", "name", "surname", "created", "modified"];

/// What happens to books of deleted author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorDeletePolicy {
    /// Books are kept, without author
    #[default]
    Detach,
    /// Books are deleted with the author
    Cascade,
}

impl FromStr for AuthorDeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "detach" => Ok(AuthorDeletePolicy::Detach),
            "cascade" => Ok(AuthorDeletePolicy::Cascade),
            other => Err(format!("Invalid author delete policy {other}, use detach or cascade")),
        }
    }
}

impl Display for AuthorDeletePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthorDeletePolicy::Detach => write!(f, "detach"),
            AuthorDeletePolicy::Cascade => write!(f, "cascade"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateAuthor {
    #[garde(length(max = 30), custom(rules::name))]
    pub name: String,
    #[garde(length(max = 30), custom(rules::name))]
    pub surname: String,
    #[garde(length(max = 200))]
    pub bio: Option<String>,
    #[garde(skip)]
    #[serde(default, skip_deserializing)]
    pub created_by: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateAuthor {
    #[garde(length(max = 30), custom(rules::name))]
    pub name: String,
    #[garde(length(max = 30), custom(rules::name))]
    pub surname: String,
    #[garde(length(max = 200))]
    pub bio: String,
    #[garde(range(min = 0))]
    pub version: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub bio: String,
    pub version: i64,
    pub created_by: Option<String>,
    pub created: time::PrimitiveDateTime,
    pub modified: time::PrimitiveDateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuthorShort {
    pub id: i64,
    pub name: String,
    pub surname: String,
}

impl FromRowPrefixed for AuthorShort {
    fn from_row_prefixed(row: &crate::ChosenRow) -> Result<Option<Self>, sqlx::Error> {
        let id: Option<i64> = row.try_get("author_id")?;
        id.map(|id| {
            Ok(AuthorShort {
                id,
                name: row.try_get("author_name")?,
                surname: row.try_get("author_surname")?,
            })
        })
        .transpose()
    }
}

pub type AuthorRepository = AuthorRepositoryImpl<sqlx::Pool<ChosenDB>>;

pub struct AuthorRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> AuthorRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB> + Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateAuthor) -> Result<Author> {
        let bio = payload
            .bio
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| DEFAULT_BIO.to_string());
        let result =
            sqlx::query("INSERT INTO author (name, surname, bio, created_by) VALUES (?, ?, ?, ?)")
                .bind(&payload.name)
                .bind(&payload.surname)
                .bind(bio)
                .bind(&payload.created_by)
                .execute(&self.executor)
                .await
                .map_err(Error::on_write("Author"))?;

        self.get(result.last_insert_rowid()).await
    }

    pub async fn update(&self, id: i64, payload: UpdateAuthor) -> Result<Author> {
        let version = payload.version.ok_or_else(|| {
            debug!("No version provided");
            Error::MissingVersion
        })?;
        let result = sqlx::query(
            "UPDATE author SET name = ?, surname = ?, bio = ?, version = ?, modified = CURRENT_TIMESTAMP
            WHERE id = ? AND version = ?",
        )
        .bind(&payload.name)
        .bind(&payload.surname)
        .bind(&payload.bio)
        .bind(version + 1)
        .bind(id)
        .bind(version)
        .execute(&self.executor)
        .await
        .map_err(Error::on_write("Author"))?;

        if result.rows_affected() == 0 {
            Err(Error::FailedUpdate { id, version })
        } else {
            self.get(id).await
        }
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM author")
            .fetch_one(&self.executor)
            .await?;
        Ok(count_to_total(count))
    }

    pub async fn list(&self, params: ListingParams) -> Result<Batch<AuthorShort>> {
        let order = params.order_clause(VALID_ORDER_FIELDS, None)?;
        let rows = sqlx::query_as::<_, AuthorShort>(&format!(
            "SELECT id, name, surname FROM author {order} LIMIT ? OFFSET ?"
        ))
        .bind(params.limit)
        .bind(params.offset)
        .fetch(&self.executor)
        .try_collect::<Vec<_>>()
        .await?;
        let total = self.count().await?;
        Ok(Batch {
            offset: params.offset,
            limit: params.limit,
            rows,
            total,
        })
    }

    /// Latest authors as shown on catalog front page - by name descending
    pub async fn latest(&self, limit: i64) -> Result<Vec<AuthorShort>> {
        let rows = sqlx::query_as::<_, AuthorShort>(
            "SELECT id, name, surname FROM author ORDER BY name DESC, surname DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.executor)
        .await?;
        Ok(rows)
    }

    pub async fn search(&self, term: &str, limit: i64) -> Result<Vec<AuthorShort>> {
        let pattern = format!("%{term}%");
        let rows = sqlx::query_as::<_, AuthorShort>(
            "SELECT id, name, surname FROM author WHERE name LIKE ? OR surname LIKE ?
            ORDER BY name, surname LIMIT ?",
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.executor)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_name(&self, name: &str, surname: &str) -> Result<Option<Author>> {
        let record = sqlx::query_as::<_, Author>("SELECT * FROM author WHERE name = ? AND surname = ?")
            .bind(name)
            .bind(surname)
            .fetch_optional(&self.executor)
            .await?;
        Ok(record)
    }

    pub async fn get(&self, id: i64) -> Result<Author> {
        sqlx::query_as::<_, Author>("SELECT * FROM author WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::not_found("Author", id))
    }

    pub async fn delete(&self, id: i64, policy: AuthorDeletePolicy) -> Result<()> {
        let mut tx = self.executor.begin().await?;

        let books = match policy {
            // an authorless book with the same title blocks detaching
            AuthorDeletePolicy::Detach => {
                sqlx::query("UPDATE book SET author_id = NULL WHERE author_id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .map_err(Error::on_write("Book"))?
            }
            AuthorDeletePolicy::Cascade => {
                sqlx::query("DELETE FROM book WHERE author_id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?
            }
        };

        let res = sqlx::query("DELETE FROM author WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if res.rows_affected() == 0 {
            return Err(Error::not_found("Author", id));
        }
        tx.commit().await?;
        debug!(
            "Deleted author {id}, {policy} {} books",
            books.rows_affected()
        );
        Ok(())
    }
}
