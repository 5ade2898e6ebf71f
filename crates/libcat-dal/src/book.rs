use std::collections::HashMap;

use crate::{
    Batch, ChosenDB, ChosenRow, Error, FromRowPrefixed, ListingParams, author::AuthorShort,
    count_to_total, error::Result, genre::GenreShort,
};
use garde::Validate;
use libcat_types::validation::rules;
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, Executor, Row as _, SqliteConnection};
use tracing::debug;

const VALID_ORDER_FIELDS: &[&str] = &["id", "title", "isbn", "created", "modified"];

const BOOK_COLUMNS: &str = "b.id, b.title, b.isbn, b.information, b.version, b.created_by, b.created, b.modified,
    b.author_id, a.name AS author_name, a.surname AS author_surname";

const SHORT_COLUMNS: &str =
    "b.id, b.title, b.isbn, b.author_id, a.name AS author_name, a.surname AS author_surname";

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateBook {
    #[garde(length(max = 50), custom(rules::title))]
    pub title: String,
    #[garde(range(min = 1))]
    pub author_id: Option<i64>,
    #[garde(custom(rules::isbn))]
    pub isbn: String,
    #[garde(length(max = 500))]
    pub information: Option<String>,
    #[garde(skip)]
    pub genres: Option<Vec<i64>>,
    #[garde(skip)]
    #[serde(default, skip_deserializing)]
    pub created_by: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateBook {
    #[garde(length(max = 50), custom(rules::title))]
    pub title: String,
    #[garde(range(min = 1))]
    pub author_id: Option<i64>,
    #[garde(custom(rules::isbn))]
    pub isbn: String,
    #[garde(length(max = 500))]
    pub information: String,
    /// When present replaces book genres
    #[garde(skip)]
    pub genres: Option<Vec<i64>>,
    #[garde(range(min = 0))]
    pub version: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: Option<AuthorShort>,
    pub isbn: String,
    pub information: String,
    pub genres: Vec<GenreShort>,
    pub version: i64,
    pub created_by: Option<String>,
    pub created: time::PrimitiveDateTime,
    pub modified: time::PrimitiveDateTime,
}

impl sqlx::FromRow<'_, ChosenRow> for Book {
    fn from_row(row: &ChosenRow) -> Result<Self, sqlx::Error> {
        Ok(Book {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            author: AuthorShort::from_row_prefixed(row)?,
            isbn: row.try_get("isbn")?,
            information: row.try_get("information")?,
            genres: Vec::new(),
            version: row.try_get("version")?,
            created_by: row.try_get("created_by")?,
            created: row.try_get("created")?,
            modified: row.try_get("modified")?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookShort {
    pub id: i64,
    pub title: String,
    pub isbn: String,
    pub author: Option<AuthorShort>,
}

impl sqlx::FromRow<'_, ChosenRow> for BookShort {
    fn from_row(row: &ChosenRow) -> Result<Self, sqlx::Error> {
        Ok(BookShort {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            isbn: row.try_get("isbn")?,
            author: AuthorShort::from_row_prefixed(row)?,
        })
    }
}

/// One bar of a chart - label and number of books
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ChartEntry {
    pub label: String,
    pub count: i64,
}

/// Genres of a book in order they were attached
pub(crate) async fn book_genres(conn: &mut SqliteConnection, book_id: i64) -> Result<Vec<GenreShort>> {
    let genres = sqlx::query_as::<_, GenreShort>(
        "SELECT g.id, g.name FROM book_genres bg JOIN genre g ON bg.genre_id = g.id
        WHERE bg.book_id = ? ORDER BY bg.rowid",
    )
    .bind(book_id)
    .fetch_all(conn)
    .await?;
    Ok(genres)
}

pub(crate) async fn genres_by_book(conn: &mut SqliteConnection) -> Result<HashMap<i64, Vec<GenreShort>>> {
    let rows: Vec<(i64, i64, String)> = sqlx::query_as(
        "SELECT bg.book_id, g.id, g.name FROM book_genres bg JOIN genre g ON bg.genre_id = g.id
        ORDER BY bg.rowid",
    )
    .fetch_all(conn)
    .await?;
    let mut map: HashMap<i64, Vec<GenreShort>> = HashMap::new();
    for (book_id, id, name) in rows {
        map.entry(book_id).or_default().push(GenreShort { id, name });
    }
    Ok(map)
}

async fn set_genres(conn: &mut SqliteConnection, book_id: i64, genres: &[i64]) -> Result<()> {
    sqlx::query("DELETE FROM book_genres WHERE book_id = ?")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;
    for genre_id in genres {
        sqlx::query("INSERT OR IGNORE INTO book_genres (book_id, genre_id) VALUES (?, ?)")
            .bind(book_id)
            .bind(genre_id)
            .execute(&mut *conn)
            .await
            .map_err(Error::on_write("Genre"))?;
    }
    Ok(())
}

pub type BookRepository = BookRepositoryImpl<sqlx::Pool<ChosenDB>>;

pub struct BookRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> BookRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB> + Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateBook) -> Result<Book> {
        let mut tx = self.executor.begin().await?;
        let result = sqlx::query(
            "INSERT INTO book (title, author_id, isbn, information, created_by) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&payload.title)
        .bind(payload.author_id)
        .bind(&payload.isbn)
        .bind(payload.information.unwrap_or_default())
        .bind(&payload.created_by)
        .execute(&mut *tx)
        .await
        .map_err(Error::on_write("Book"))?;
        let id = result.last_insert_rowid();
        if let Some(genres) = payload.genres {
            set_genres(&mut *tx, id, &genres).await?;
        }
        tx.commit().await?;
        self.get(id).await
    }

    pub async fn update(&self, id: i64, payload: UpdateBook) -> Result<Book> {
        let version = payload.version.ok_or(Error::MissingVersion)?;
        let mut tx = self.executor.begin().await?;
        let result = sqlx::query(
            "UPDATE book SET title = ?, author_id = ?, isbn = ?, information = ?, version = ?,
            modified = CURRENT_TIMESTAMP WHERE id = ? AND version = ?",
        )
        .bind(&payload.title)
        .bind(payload.author_id)
        .bind(&payload.isbn)
        .bind(&payload.information)
        .bind(version + 1)
        .bind(id)
        .bind(version)
        .execute(&mut *tx)
        .await
        .map_err(Error::on_write("Book"))?;

        if result.rows_affected() == 0 {
            return Err(Error::FailedUpdate { id, version });
        }
        if let Some(genres) = payload.genres {
            set_genres(&mut *tx, id, &genres).await?;
        }
        tx.commit().await?;
        self.get(id).await
    }

    pub async fn get(&self, id: i64) -> Result<Book> {
        let mut conn = self.executor.acquire().await?;
        let mut book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM book b LEFT JOIN author a ON b.author_id = a.id WHERE b.id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| Error::not_found("Book", id))?;
        book.genres = book_genres(&mut *conn, id).await?;
        Ok(book)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM book WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::not_found("Book", id));
        }
        debug!("Deleted book {id}");
        Ok(())
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM book")
            .fetch_one(&self.executor)
            .await?;
        Ok(count_to_total(count))
    }

    pub async fn list(&self, params: ListingParams) -> Result<Batch<BookShort>> {
        let order = params.order_clause(VALID_ORDER_FIELDS, Some("b"))?;
        let rows = sqlx::query_as::<_, BookShort>(&format!(
            "SELECT {SHORT_COLUMNS} FROM book b LEFT JOIN author a ON b.author_id = a.id
            {order} LIMIT ? OFFSET ?"
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

    pub async fn list_by_author(
        &self,
        params: ListingParams,
        author_id: i64,
    ) -> Result<Batch<BookShort>> {
        let order = params.order_clause(VALID_ORDER_FIELDS, Some("b"))?;
        let rows = sqlx::query_as::<_, BookShort>(&format!(
            "SELECT {SHORT_COLUMNS} FROM book b LEFT JOIN author a ON b.author_id = a.id
            WHERE b.author_id = ? {order} LIMIT ? OFFSET ?"
        ))
        .bind(author_id)
        .bind(params.limit)
        .bind(params.offset)
        .fetch_all(&self.executor)
        .await?;
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM book WHERE author_id = ?")
            .bind(author_id)
            .fetch_one(&self.executor)
            .await?;
        Ok(Batch {
            offset: params.offset,
            limit: params.limit,
            rows,
            total: count_to_total(count),
        })
    }

    pub async fn search_by_title(&self, term: &str, limit: i64) -> Result<Vec<BookShort>> {
        let rows = sqlx::query_as::<_, BookShort>(&format!(
            "SELECT {SHORT_COLUMNS} FROM book b LEFT JOIN author a ON b.author_id = a.id
            WHERE b.title LIKE ? ORDER BY b.title LIMIT ?"
        ))
        .bind(format!("%{term}%"))
        .bind(limit)
        .fetch_all(&self.executor)
        .await?;
        Ok(rows)
    }

    pub async fn search_by_genre(&self, term: &str, limit: i64) -> Result<Vec<BookShort>> {
        let rows = sqlx::query_as::<_, BookShort>(&format!(
            "SELECT DISTINCT {SHORT_COLUMNS} FROM book b LEFT JOIN author a ON b.author_id = a.id
            JOIN book_genres bg ON bg.book_id = b.id JOIN genre g ON bg.genre_id = g.id
            WHERE g.name LIKE ? ORDER BY b.title LIMIT ?"
        ))
        .bind(format!("%{term}%"))
        .bind(limit)
        .fetch_all(&self.executor)
        .await?;
        Ok(rows)
    }

    /// Number of books in each genre
    pub async fn books_per_genre(&self) -> Result<Vec<ChartEntry>> {
        let rows = sqlx::query_as::<_, ChartEntry>(
            "SELECT g.name AS label, count(bg.book_id) AS count FROM genre g
            LEFT JOIN book_genres bg ON bg.genre_id = g.id GROUP BY g.id ORDER BY g.name",
        )
        .fetch_all(&self.executor)
        .await?;
        Ok(rows)
    }

    pub async fn books_per_author(&self) -> Result<Vec<ChartEntry>> {
        let rows = sqlx::query_as::<_, ChartEntry>(
            "SELECT a.name || ' ' || a.surname AS label, count(b.id) AS count FROM author a
            LEFT JOIN book b ON b.author_id = a.id GROUP BY a.id ORDER BY a.surname, a.name",
        )
        .fetch_all(&self.executor)
        .await?;
        Ok(rows)
    }
}
