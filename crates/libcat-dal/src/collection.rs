use crate::{ChosenDB, Error, book::BookShort, error::Result};
use garde::Validate;
use libcat_types::validation::rules;
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, Executor};

const COLLECTION_COLUMNS: &str = "id, creator_id, name, information, date_created, version";

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateCollection {
    #[garde(length(max = 50), custom(rules::name))]
    pub name: String,
    #[garde(length(max = 500))]
    pub information: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateCollection {
    #[garde(length(max = 50), custom(rules::name))]
    pub name: String,
    #[garde(length(max = 500))]
    pub information: String,
    #[garde(range(min = 0))]
    pub version: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Collection {
    pub id: i64,
    pub creator_id: i64,
    pub name: String,
    pub information: String,
    pub date_created: Option<time::Date>,
    pub version: i64,
}

pub type CollectionRepository = CollectionRepositoryImpl<sqlx::Pool<ChosenDB>>;

/// Collections are always accessed on behalf of their owner,
/// collection of other user behaves as if it does not exist
pub struct CollectionRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> CollectionRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB> + Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn list(&self, owner_id: i64) -> Result<Vec<Collection>> {
        let rows = sqlx::query_as::<_, Collection>(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collection WHERE creator_id = ? ORDER BY name"
        ))
        .bind(owner_id)
        .fetch_all(&self.executor)
        .await?;
        Ok(rows)
    }

    pub async fn create(&self, owner_id: i64, payload: CreateCollection) -> Result<Collection> {
        let result =
            sqlx::query("INSERT INTO collection (creator_id, name, information) VALUES (?, ?, ?)")
                .bind(owner_id)
                .bind(&payload.name)
                .bind(payload.information.unwrap_or_default())
                .execute(&self.executor)
                .await
                .map_err(Error::on_write("Collection"))?;
        self.get(result.last_insert_rowid(), owner_id).await
    }

    pub async fn get(&self, id: i64, owner_id: i64) -> Result<Collection> {
        sqlx::query_as::<_, Collection>(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collection WHERE id = ? AND creator_id = ?"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.executor)
        .await?
        .ok_or_else(|| Error::not_found("Collection", id))
    }

    pub async fn update(
        &self,
        id: i64,
        owner_id: i64,
        payload: UpdateCollection,
    ) -> Result<Collection> {
        let version = payload.version.ok_or(Error::MissingVersion)?;
        // ownership first, so foreign collection is reported as missing, not as stale
        self.get(id, owner_id).await?;
        let result = sqlx::query(
            "UPDATE collection SET name = ?, information = ?, version = ?
            WHERE id = ? AND creator_id = ? AND version = ?",
        )
        .bind(&payload.name)
        .bind(&payload.information)
        .bind(version + 1)
        .bind(id)
        .bind(owner_id)
        .bind(version)
        .execute(&self.executor)
        .await
        .map_err(Error::on_write("Collection"))?;
        if result.rows_affected() == 0 {
            return Err(Error::FailedUpdate { id, version });
        }
        self.get(id, owner_id).await
    }

    pub async fn delete(&self, id: i64, owner_id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM collection WHERE id = ? AND creator_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.executor)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::not_found("Collection", id));
        }
        Ok(())
    }

    pub async fn books(&self, id: i64, owner_id: i64) -> Result<Vec<BookShort>> {
        self.get(id, owner_id).await?;
        let rows = sqlx::query_as::<_, BookShort>(
            "SELECT b.id, b.title, b.isbn, b.author_id, a.name AS author_name, a.surname AS author_surname
            FROM collection_books cb JOIN book b ON cb.book_id = b.id
            LEFT JOIN author a ON b.author_id = a.id
            WHERE cb.collection_id = ? ORDER BY b.title",
        )
        .bind(id)
        .fetch_all(&self.executor)
        .await?;
        Ok(rows)
    }

    /// Returns false if the book was already in the collection
    pub async fn add_book(&self, id: i64, owner_id: i64, book_id: i64) -> Result<bool> {
        self.get(id, owner_id).await?;
        let res = sqlx::query(
            "INSERT INTO collection_books (collection_id, book_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(book_id)
        .execute(&self.executor)
        .await
        .map_err(Error::on_write("Book"))?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn remove_book(&self, id: i64, owner_id: i64, book_id: i64) -> Result<()> {
        self.get(id, owner_id).await?;
        let res =
            sqlx::query("DELETE FROM collection_books WHERE collection_id = ? AND book_id = ?")
                .bind(id)
                .bind(book_id)
                .execute(&self.executor)
                .await?;
        if res.rows_affected() == 0 {
            return Err(Error::not_found("Book in collection", book_id));
        }
        Ok(())
    }
}
