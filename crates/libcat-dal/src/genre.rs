use crate::{Batch, ChosenDB, Error, ListingParams, count_to_total, error::Result};
use garde::Validate;
use libcat_types::validation::rules;
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, Executor};

const VALID_ORDER_FIELDS: &[&str] = &["id", "name"];

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateGenre {
    #[garde(length(max = 30), custom(rules::genre_name))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateGenre {
    #[garde(length(max = 30), custom(rules::genre_name))]
    pub name: String,
    #[garde(range(min = 0))]
    pub version: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Genre {
    pub id: i64,
    pub name: String,
    pub version: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GenreShort {
    pub id: i64,
    pub name: String,
}

pub type GenreRepository = GenreRepositoryImpl<sqlx::Pool<ChosenDB>>;

pub struct GenreRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> GenreRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB> + Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateGenre) -> Result<Genre> {
        let result = sqlx::query("INSERT INTO genre (name) VALUES (?)")
            .bind(&payload.name)
            .execute(&self.executor)
            .await
            .map_err(Error::on_write("Genre"))?;
        self.get(result.last_insert_rowid()).await
    }

    pub async fn update(&self, id: i64, payload: UpdateGenre) -> Result<Genre> {
        let version = payload.version.ok_or(Error::MissingVersion)?;
        let result =
            sqlx::query("UPDATE genre SET name = ?, version = ? WHERE id = ? AND version = ?")
                .bind(&payload.name)
                .bind(version + 1)
                .bind(id)
                .bind(version)
                .execute(&self.executor)
                .await
                .map_err(Error::on_write("Genre"))?;
        if result.rows_affected() == 0 {
            return Err(Error::FailedUpdate { id, version });
        }
        self.get(id).await
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM genre")
            .fetch_one(&self.executor)
            .await?;
        Ok(count_to_total(count))
    }

    pub async fn list(&self, params: ListingParams) -> Result<Batch<GenreShort>> {
        let order = params.order_clause(VALID_ORDER_FIELDS, None)?;
        let rows = sqlx::query_as::<_, GenreShort>(&format!(
            "SELECT id, name FROM genre {order} LIMIT ? OFFSET ?"
        ))
        .bind(params.limit)
        .bind(params.offset)
        .fetch_all(&self.executor)
        .await?;
        Ok(Batch {
            offset: params.offset,
            limit: params.limit,
            rows,
            total: self.count().await?,
        })
    }

    pub async fn list_all(&self) -> Result<Vec<GenreShort>> {
        let rows = sqlx::query_as::<_, GenreShort>("SELECT id, name FROM genre ORDER BY name")
            .fetch_all(&self.executor)
            .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: i64) -> Result<Genre> {
        sqlx::query_as::<_, Genre>("SELECT id, name, version FROM genre WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::not_found("Genre", id))
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Genre>> {
        let genre =
            sqlx::query_as::<_, Genre>("SELECT id, name, version FROM genre WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.executor)
                .await?;
        Ok(genre)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM genre WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;
        if res.rows_affected() == 0 {
            Err(Error::not_found("Genre", id))
        } else {
            Ok(())
        }
    }
}
