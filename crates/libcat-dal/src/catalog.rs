//! Narrow store interface used by spreadsheet import and export.
//!
//! Identity lookups go through unique indexes and inserts are create-if-absent,
//! so concurrent importers cannot create duplicate authors or genres.

use std::future::Future;

use serde::Serialize;
use sqlx::{Row as _, sqlite::SqliteRow};

use crate::{Error, Pool, author::AuthorShort, book::genres_by_book, error::Result, genre::GenreShort};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: String,
    pub surname: String,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author_id: Option<i64>,
    pub isbn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CatalogBook {
    pub id: i64,
    pub title: String,
    pub author_id: Option<i64>,
    pub isbn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportAuthor {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub bio: String,
}

/// Book with embedded author and genres in order they were attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub author: Option<ExportAuthor>,
    pub book_id: i64,
    pub title: String,
    pub isbn: String,
    pub genres: Vec<String>,
}

pub trait CatalogStore: Send + Sync {
    fn find_author(
        &self,
        name: &str,
        surname: &str,
    ) -> impl Future<Output = Result<Option<AuthorShort>>> + Send;

    /// New author gets id one above current maximum, returns false if author already exists
    fn insert_author_if_absent(&self, author: &NewAuthor) -> impl Future<Output = Result<bool>> + Send;

    fn find_book_by_isbn(&self, isbn: &str) -> impl Future<Output = Result<Option<CatalogBook>>> + Send;

    fn find_book_by_title(
        &self,
        title: &str,
        author_id: Option<i64>,
    ) -> impl Future<Output = Result<Option<CatalogBook>>> + Send;

    /// Fails with [`Error::DuplicateKey`] when isbn or (title, author) is taken
    fn insert_book(&self, book: &NewBook) -> impl Future<Output = Result<CatalogBook>> + Send;

    fn find_genre(&self, name: &str) -> impl Future<Output = Result<Option<GenreShort>>> + Send;

    fn insert_genre_if_absent(&self, name: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Returns false if the genre was already attached
    fn attach_genre(&self, book_id: i64, genre_id: i64) -> impl Future<Output = Result<bool>> + Send;

    /// All books ordered by id
    fn export_rows(&self) -> impl Future<Output = Result<Vec<ExportRow>>> + Send;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogCounts {
    pub authors: u64,
    pub books: u64,
    pub genres: u64,
    pub genre_links: u64,
}

#[derive(Clone)]
pub struct SqliteCatalog {
    pool: Pool,
}

impl SqliteCatalog {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn counts(&self) -> Result<CatalogCounts> {
        let (authors, books, genres, genre_links): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT (SELECT count(*) FROM author), (SELECT count(*) FROM book),
            (SELECT count(*) FROM genre), (SELECT count(*) FROM book_genres)",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(CatalogCounts {
            authors: crate::count_to_total(authors),
            books: crate::count_to_total(books),
            genres: crate::count_to_total(genres),
            genre_links: crate::count_to_total(genre_links),
        })
    }
}

fn export_row(row: &SqliteRow) -> Result<ExportRow, sqlx::Error> {
    let author_id: Option<i64> = row.try_get("author_id")?;
    let author = author_id
        .map(|id| {
            Ok::<_, sqlx::Error>(ExportAuthor {
                id,
                name: row.try_get("author_name")?,
                surname: row.try_get("author_surname")?,
                bio: row.try_get("author_bio")?,
            })
        })
        .transpose()?;
    Ok(ExportRow {
        author,
        book_id: row.try_get("id")?,
        title: row.try_get("title")?,
        isbn: row.try_get("isbn")?,
        genres: Vec::new(),
    })
}

impl CatalogStore for SqliteCatalog {
    async fn find_author(&self, name: &str, surname: &str) -> Result<Option<AuthorShort>> {
        let author = sqlx::query_as::<_, AuthorShort>(
            "SELECT id, name, surname FROM author WHERE name = ? AND surname = ?",
        )
        .bind(name)
        .bind(surname)
        .fetch_optional(&self.pool)
        .await?;
        Ok(author)
    }

    async fn insert_author_if_absent(&self, author: &NewAuthor) -> Result<bool> {
        let bio = author
            .bio
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(crate::author::DEFAULT_BIO);
        // WHERE true is needed by sqlite parser for upsert after SELECT
        let res = sqlx::query(
            "INSERT INTO author (id, name, surname, bio)
            SELECT coalesce(max(id), 0) + 1, ?, ?, ? FROM author WHERE true
            ON CONFLICT DO NOTHING",
        )
        .bind(&author.name)
        .bind(&author.surname)
        .bind(bio)
        .execute(&self.pool)
        .await
        .map_err(Error::on_write("Author"))?;
        Ok(res.rows_affected() > 0)
    }

    async fn find_book_by_isbn(&self, isbn: &str) -> Result<Option<CatalogBook>> {
        let book = sqlx::query_as::<_, CatalogBook>(
            "SELECT id, title, author_id, isbn FROM book WHERE isbn = ?",
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    async fn find_book_by_title(
        &self,
        title: &str,
        author_id: Option<i64>,
    ) -> Result<Option<CatalogBook>> {
        let book = sqlx::query_as::<_, CatalogBook>(
            "SELECT id, title, author_id, isbn FROM book WHERE title = ? AND author_id IS ?",
        )
        .bind(title)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    async fn insert_book(&self, book: &NewBook) -> Result<CatalogBook> {
        let result = sqlx::query("INSERT INTO book (title, author_id, isbn) VALUES (?, ?, ?)")
            .bind(&book.title)
            .bind(book.author_id)
            .bind(&book.isbn)
            .execute(&self.pool)
            .await
            .map_err(Error::on_write("Book"))?;
        Ok(CatalogBook {
            id: result.last_insert_rowid(),
            title: book.title.clone(),
            author_id: book.author_id,
            isbn: book.isbn.clone(),
        })
    }

    async fn find_genre(&self, name: &str) -> Result<Option<GenreShort>> {
        let genre = sqlx::query_as::<_, GenreShort>("SELECT id, name FROM genre WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(genre)
    }

    async fn insert_genre_if_absent(&self, name: &str) -> Result<bool> {
        let res = sqlx::query("INSERT INTO genre (name) VALUES (?) ON CONFLICT DO NOTHING")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn attach_genre(&self, book_id: i64, genre_id: i64) -> Result<bool> {
        let res = sqlx::query("INSERT OR IGNORE INTO book_genres (book_id, genre_id) VALUES (?, ?)")
            .bind(book_id)
            .bind(genre_id)
            .execute(&self.pool)
            .await
            .map_err(Error::on_write("Genre"))?;
        Ok(res.rows_affected() > 0)
    }

    async fn export_rows(&self) -> Result<Vec<ExportRow>> {
        let mut conn = self.pool.acquire().await?;
        let mut rows = sqlx::query(
            "SELECT b.id, b.title, b.isbn, b.author_id, a.name AS author_name,
            a.surname AS author_surname, a.bio AS author_bio
            FROM book b LEFT JOIN author a ON b.author_id = a.id ORDER BY b.id",
        )
        .fetch_all(&mut *conn)
        .await?
        .iter()
        .map(export_row)
        .collect::<Result<Vec<_>, _>>()?;

        let mut genres = genres_by_book(&mut *conn).await?;
        for row in rows.iter_mut() {
            if let Some(book_genres) = genres.remove(&row.book_id) {
                row.genres = book_genres.into_iter().map(|g| g.name).collect();
            }
        }
        Ok(rows)
    }
}
