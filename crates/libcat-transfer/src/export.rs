use libcat_dal::catalog::{CatalogStore, ExportRow};
use tracing::info;

use crate::{
    COLUMNS, SHEET_NAME,
    error::Result,
    sheet::{self, Cell},
};

const EXPORTED_GENRES: usize = 3;

fn to_cells(row: ExportRow) -> Vec<Cell> {
    let mut cells = match row.author {
        Some(author) => vec![
            Cell::Int(author.id),
            Cell::Text(author.name),
            Cell::Text(author.surname),
            Cell::Text(author.bio),
        ],
        None => vec![Cell::Empty; 4],
    };
    cells.push(Cell::Int(row.book_id));
    cells.push(Cell::Text(row.title));
    // ISBN stays text, otherwise spreadsheet applications show it in scientific notation
    cells.push(Cell::Text(row.isbn));
    cells.extend(
        row.genres
            .into_iter()
            .take(EXPORTED_GENRES)
            .map(Cell::Text),
    );
    cells
}

/// Writes whole catalog as xlsx workbook, one row per book ordered by book id
pub struct Exporter<'a, S> {
    store: &'a S,
}

impl<'a, S: CatalogStore> Exporter<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn export(&self) -> Result<Vec<u8>> {
        let rows = self.store.export_rows().await?;
        let count = rows.len();
        let data = sheet::write_sheet(SHEET_NAME, &COLUMNS, rows.into_iter().map(to_cells))?;
        info!("Exported {count} books, {} bytes", data.len());
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use libcat_dal::catalog::ExportAuthor;

    use super::*;

    #[test]
    fn test_cells_of_book_without_author() {
        let cells = to_cells(ExportRow {
            author: None,
            book_id: 3,
            title: "Anonymous Tales".to_string(),
            isbn: "9780000000009".to_string(),
            genres: vec![],
        });
        assert_eq!(cells.len(), 7);
        assert!(cells[..4].iter().all(|c| *c == Cell::Empty));
        assert_eq!(cells[4], Cell::Int(3));
    }

    #[test]
    fn test_only_three_genres_exported() {
        let cells = to_cells(ExportRow {
            author: Some(ExportAuthor {
                id: 1,
                name: "Lesya".to_string(),
                surname: "Ukrainka".to_string(),
                bio: "No bio".to_string(),
            }),
            book_id: 1,
            title: "Forest Song".to_string(),
            isbn: "9780000000003".to_string(),
            genres: ["drama", "poetry", "fairy tale", "classic"]
                .map(String::from)
                .to_vec(),
        });
        assert_eq!(cells.len(), 10);
        assert_eq!(cells[9], Cell::text("fairy tale"));
    }
}
