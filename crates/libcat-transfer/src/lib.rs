//! Spreadsheet import and export of the catalog.
//!
//! Both directions use the same flat layout, one row per book:
//! `id_author, Name, Surname, Bio, id_book, title, isbn, genre1, genre2, genre3`.

pub mod error;
pub mod export;
pub mod import;
pub mod sheet;

pub use error::{Error, Result};
pub use export::Exporter;
pub use import::{ImportReport, Importer, RowWarning, WarningKind};

pub const SHEET_NAME: &str = "Data";

pub const COLUMNS: [&str; 10] = [
    "id_author",
    "Name",
    "Surname",
    "Bio",
    "id_book",
    "title",
    "isbn",
    "genre1",
    "genre2",
    "genre3",
];

/// File name offered for download of exported catalog
pub const EXPORT_FILE_NAME: &str = "Data.xlsx";

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
