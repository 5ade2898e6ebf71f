use libcat_dal::catalog::{CatalogBook, CatalogStore, NewAuthor, NewBook};
use libcat_types::{ValidationError, validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    COLUMNS,
    error::{Error, Result},
    sheet::{self, Cell, SheetRow},
};

const AUTHOR_ID_HEADER: &str = "id_author";
const ISBN_HEADER: &str = "isbn";
const ISBN_COLUMN: usize = 6;
const GENRE_COLUMNS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum WarningKind {
    MalformedRow,
    InvalidAuthor,
    InvalidBook,
    InvalidGenre,
    DuplicateKey,
}

/// Non fatal problem of one spreadsheet row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RowWarning {
    pub row: usize,
    pub book_id: Option<String>,
    pub kind: WarningKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ImportReport {
    pub rows: usize,
    pub authors_created: usize,
    pub books_created: usize,
    pub books_matched: usize,
    pub genres_created: usize,
    pub genres_attached: usize,
    pub warnings: Vec<RowWarning>,
}

impl ImportReport {
    fn warn(&mut self, row: &ImportRow, kind: WarningKind, message: impl Into<String>) {
        let message = message.into();
        warn!("Row {}: {message}", row.number);
        self.warnings.push(RowWarning {
            row: row.number,
            book_id: row.book_id.clone(),
            kind,
            message,
        });
    }
}

/// Data row in fixed column layout, author and book id columns are informational only
#[derive(Debug, Clone, PartialEq, Eq)]
struct ImportRow {
    number: usize,
    book_id: Option<String>,
    name: String,
    surname: String,
    bio: String,
    title: String,
    isbn: String,
    genres: Vec<String>,
}

impl ImportRow {
    fn parse(row: &SheetRow) -> std::result::Result<Self, (Option<String>, String)> {
        let mut values = Vec::with_capacity(COLUMNS.len());
        let mut problems = Vec::new();
        for (idx, column) in COLUMNS.iter().enumerate() {
            match row.cells.get(idx) {
                None | Some(Cell::Empty) => values.push(String::new()),
                Some(Cell::Text(text)) => values.push(text.trim().to_string()),
                Some(Cell::Int(number)) => values.push(number.to_string()),
                Some(Cell::Unsupported(kind)) => {
                    problems.push(format!("column {column} contains unsupported {kind} value"));
                    values.push(String::new());
                }
            }
        }
        let book_id = Some(values[4].clone()).filter(|id| !id.is_empty());
        if !problems.is_empty() {
            return Err((book_id, problems.join(", ")));
        }
        let mut values = values.into_iter();
        let mut next = || values.next().unwrap_or_default();
        let _author_id = next();
        let name = next();
        let surname = next();
        let bio = next();
        let _book_id = next();
        let title = next();
        let isbn = next();
        let genres = (0..GENRE_COLUMNS)
            .map(|_| next())
            .filter(|g| !g.is_empty())
            .collect();
        Ok(ImportRow {
            number: row.number,
            book_id,
            name,
            surname,
            bio,
            title,
            isbn,
            genres,
        })
    }

    fn has_author(&self) -> bool {
        !(self.name.is_empty() && self.surname.is_empty())
    }
}

fn is_header(row: &SheetRow) -> bool {
    let cell_is = |idx: usize, expected: &str| {
        matches!(row.cells.get(idx), Some(Cell::Text(t)) if t.trim().eq_ignore_ascii_case(expected))
    };
    cell_is(0, AUTHOR_ID_HEADER) || cell_is(ISBN_COLUMN, ISBN_HEADER)
}

/// Reconciles spreadsheet rows with catalog store.
///
/// Authors are matched by (name, surname), books by ISBN first and by (title, author) second,
/// genres by exact name. Existing records are never overwritten, matching book only gets
/// new genres attached. Rows are imported one by one without enclosing transaction,
/// so if store fails, rows before the failing one stay imported.
pub struct Importer<'a, S> {
    store: &'a S,
}

impl<'a, S: CatalogStore> Importer<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn import_bytes(&self, data: Vec<u8>) -> Result<ImportReport> {
        let rows = sheet::read_rows(data).map_err(Error::MalformedInputFile)?;
        self.import_rows(rows).await
    }

    pub async fn import_rows(&self, rows: Vec<SheetRow>) -> Result<ImportReport> {
        let mut report = ImportReport::default();
        let skip_header = rows.first().map(is_header).unwrap_or(false);
        for row in rows.iter().skip(usize::from(skip_header)) {
            if row.is_blank() {
                continue;
            }
            report.rows += 1;
            match ImportRow::parse(row) {
                Ok(row) => self
                    .import_row(&row, &mut report)
                    .await
                    .map_err(|source| Error::ImportAborted {
                        row: row.number,
                        source,
                    })?,
                Err((book_id, message)) => {
                    warn!("Row {}: {message}", row.number);
                    report.warnings.push(RowWarning {
                        row: row.number,
                        book_id,
                        kind: WarningKind::MalformedRow,
                        message,
                    })
                }
            }
        }
        info!(
            "Imported {} rows: {} authors, {} books created, {} books matched, {} genres created, {} warnings",
            report.rows,
            report.authors_created,
            report.books_created,
            report.books_matched,
            report.genres_created,
            report.warnings.len()
        );
        Ok(report)
    }

    /// Only store failures are returned as error, all row problems end up in report
    async fn import_row(
        &self,
        row: &ImportRow,
        report: &mut ImportReport,
    ) -> libcat_dal::error::Result<()> {
        debug!("Importing row {}: {} by {} {}", row.number, row.title, row.name, row.surname);
        let author_id = if row.has_author() {
            match self.resolve_author(row, report).await? {
                Some(id) => Some(id),
                None => return Ok(()),
            }
        } else {
            None
        };

        let book = match self.store.find_book_by_isbn(&row.isbn).await? {
            Some(existing) if existing.title == row.title && existing.author_id == author_id => {
                report.books_matched += 1;
                existing
            }
            Some(existing) => {
                report.warn(
                    row,
                    WarningKind::DuplicateKey,
                    format!(
                        "ISBN {} already belongs to book {} \"{}\"",
                        row.isbn, existing.id, existing.title
                    ),
                );
                return Ok(());
            }
            None => match self.create_book(row, author_id, report).await? {
                Some(book) => book,
                None => return Ok(()),
            },
        };

        self.attach_genres(row, &book, report).await
    }

    async fn resolve_author(
        &self,
        row: &ImportRow,
        report: &mut ImportReport,
    ) -> libcat_dal::error::Result<Option<i64>> {
        if let Some(author) = self.store.find_author(&row.name, &row.surname).await? {
            return Ok(Some(author.id));
        }
        if let Err(e) = validation::validate_author(&row.name, &row.surname) {
            report.warn(row, WarningKind::InvalidAuthor, e.to_string());
            return Ok(None);
        }
        let new_author = NewAuthor {
            name: row.name.clone(),
            surname: row.surname.clone(),
            bio: Some(row.bio.clone()).filter(|b| !b.is_empty()),
        };
        if self.store.insert_author_if_absent(&new_author).await? {
            report.authors_created += 1;
        }
        let author = self
            .store
            .find_author(&row.name, &row.surname)
            .await?
            .ok_or_else(|| {
                libcat_dal::Error::RecordNotFound(format!("Author {} {}", row.name, row.surname))
            })?;
        Ok(Some(author.id))
    }

    async fn create_book(
        &self,
        row: &ImportRow,
        author_id: Option<i64>,
        report: &mut ImportReport,
    ) -> libcat_dal::error::Result<Option<CatalogBook>> {
        if let Some(existing) = self.store.find_book_by_title(&row.title, author_id).await? {
            report.warn(
                row,
                WarningKind::DuplicateKey,
                format!(
                    "Book \"{}\" of this author already exists with ISBN {}",
                    existing.title, existing.isbn
                ),
            );
            return Ok(None);
        }
        if let Err(e) = validation::validate_book(&row.title, &row.isbn) {
            report.warn(row, WarningKind::InvalidBook, e.to_string());
            return Ok(None);
        }
        let new_book = NewBook {
            title: row.title.clone(),
            author_id,
            isbn: row.isbn.clone(),
        };
        match self.store.insert_book(&new_book).await {
            Ok(book) => {
                report.books_created += 1;
                Ok(Some(book))
            }
            Err(libcat_dal::Error::DuplicateKey(entity)) => {
                report.warn(
                    row,
                    WarningKind::DuplicateKey,
                    format!("{entity} with ISBN {} or same title already exists", row.isbn),
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn attach_genres(
        &self,
        row: &ImportRow,
        book: &CatalogBook,
        report: &mut ImportReport,
    ) -> libcat_dal::error::Result<()> {
        for name in &row.genres {
            if let Err(e) = validation::check_genre_name(name) {
                let message = match e {
                    ValidationError::InvalidFormat { reason, .. } => {
                        format!("Genre \"{name}\" {reason}")
                    }
                    e => e.to_string(),
                };
                report.warn(row, WarningKind::InvalidGenre, message);
                continue;
            }
            let genre = match self.store.find_genre(name).await? {
                Some(genre) => genre,
                None => {
                    if self.store.insert_genre_if_absent(name).await? {
                        report.genres_created += 1;
                    }
                    self.store.find_genre(name).await?.ok_or_else(|| {
                        libcat_dal::Error::RecordNotFound(format!("Genre {name}"))
                    })?
                }
            };
            if self.store.attach_genre(book.id, genre.id).await? {
                report.genres_attached += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_row(number: usize, cells: &[&str]) -> SheetRow {
        SheetRow {
            number,
            cells: cells
                .iter()
                .map(|c| if c.is_empty() { Cell::Empty } else { Cell::text(*c) })
                .collect(),
        }
    }

    #[test]
    fn test_header_detection() {
        assert!(is_header(&sheet_row(1, &["ID_AUTHOR", "Name"])));
        assert!(is_header(&sheet_row(1, &["", "", "", "", "", "", "ISBN"])));
        assert!(!is_header(&sheet_row(1, &["1", "Taras"])));
    }

    #[test]
    fn test_row_parsing() {
        let row = ImportRow::parse(&sheet_row(
            5,
            &["1", " Taras ", "Shevchenko", "", "12", "Kobzar", "9780000000001", "poetry", "", "classic"],
        ))
        .unwrap();
        assert_eq!(row.number, 5);
        assert_eq!(row.name, "Taras");
        assert_eq!(row.book_id.as_deref(), Some("12"));
        assert_eq!(row.genres, ["poetry", "classic"]);

        let short = ImportRow::parse(&sheet_row(6, &["", "", "", "", "", "Anonymous Tales", "9780000000009"]))
            .unwrap();
        assert!(!short.has_author());
        assert!(short.genres.is_empty());

        let mut broken = sheet_row(7, &["1", "Taras", "Shevchenko", "", "13"]);
        broken.cells.push(Cell::Unsupported("date"));
        let (book_id, message) = ImportRow::parse(&broken).unwrap_err();
        assert_eq!(book_id.as_deref(), Some("13"));
        assert!(message.contains("title"));
    }
}
