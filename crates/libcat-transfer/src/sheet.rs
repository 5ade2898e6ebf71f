//! Minimal spreadsheet codec: first sheet in, single sheet out.

use std::io::Cursor;

use calamine::{Data, Reader as _, open_workbook_auto_from_rs};
use rust_xlsxwriter::{Format, Workbook};

use crate::error::SheetError;

/// Largest float which is still shown as an integer, ISBNs stored as numbers fit well below
const MAX_INTEGRAL_FLOAT: f64 = 1e15;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    /// Cell type which has no text representation for import (error, date)
    Unsupported(&'static str),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty => Cell::Empty,
            Data::String(s) if s.trim().is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Text(i.to_string()),
            Data::Float(f) if f.fract() == 0.0 && f.abs() < MAX_INTEGRAL_FLOAT => {
                Cell::Text(format!("{}", *f as i64))
            }
            Data::Float(f) => Cell::Text(f.to_string()),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::DateTime(_) | Data::DateTimeIso(_) | Data::DurationIso(_) => {
                Cell::Unsupported("date")
            }
            Data::Error(_) => Cell::Unsupported("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    /// 1-based row number as shown by spreadsheet applications
    pub number: usize,
    pub cells: Vec<Cell>,
}

impl SheetRow {
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| *c == Cell::Empty)
    }
}

/// Reads all rows of the first sheet, format (xlsx, xls, ods) is detected from content
pub fn read_rows(data: Vec<u8>) -> Result<Vec<SheetRow>, SheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))?;
    let range = workbook.worksheet_range_at(0).ok_or(SheetError::NoSheet)??;
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or_default();
    let first_col = range.start().map(|(_, col)| col as usize).unwrap_or_default();

    let rows = range
        .rows()
        .enumerate()
        .map(|(idx, cells)| {
            let cells = std::iter::repeat_n(Cell::Empty, first_col)
                .chain(cells.iter().map(Cell::from))
                .collect();
            SheetRow {
                number: first_row + idx + 1,
                cells,
            }
        })
        .collect();
    Ok(rows)
}

/// Writes one sheet with bold header into xlsx workbook
pub fn write_sheet<I>(name: &str, header: &[&str], rows: I) -> Result<Vec<u8>, SheetError>
where
    I: IntoIterator<Item = Vec<Cell>>,
{
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name)?;
        let bold = Format::new().set_bold();
        for (col, title) in header.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *title, &bold)?;
        }
        for (idx, row) in rows.into_iter().enumerate() {
            let row_num = idx as u32 + 1;
            for (col, cell) in row.into_iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Empty | Cell::Unsupported(_) => {}
                    Cell::Text(text) => {
                        sheet.write_string(row_num, col, text)?;
                    }
                    Cell::Int(number) => {
                        sheet.write_number(row_num, col, number as f64)?;
                    }
                }
            }
        }
    }
    let data = workbook.save_to_buffer()?;
    Ok(data)
}
