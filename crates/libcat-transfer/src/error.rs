pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("Cannot read spreadsheet: {0}")]
    Read(#[from] calamine::Error),

    #[error("Cannot write spreadsheet: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("Spreadsheet has no sheet")]
    NoSheet,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input is not a readable spreadsheet, nothing was imported
    #[error("Malformed input file: {0}")]
    MalformedInputFile(#[source] SheetError),

    /// Store failed on given spreadsheet row, rows before it stay imported
    #[error("Import aborted at row {row}: {source}")]
    ImportAborted {
        row: usize,
        #[source]
        source: libcat_dal::Error,
    },

    #[error("Store error: {0}")]
    Store(#[from] libcat_dal::Error),

    #[error("Export error: {0}")]
    Sheet(#[from] SheetError),
}
