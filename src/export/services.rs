use anyhow::Context;
use rust_xlsxwriter::Workbook;
use time::PrimitiveDateTime;

use crate::{clock, entries::repo_types::ProductionEntry};

pub const HEADERS: [&str; 11] = [
    "ID",
    "Date",
    "Company",
    "Auth Person",
    "Employee ID",
    "Product",
    "Final Batch",
    "Batch Quantity",
    "Urea %",
    "Density",
    "Photo",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Blank,
}

impl From<Option<&str>> for Cell {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Cell::Blank, |s| Cell::Text(s.to_string()))
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Cell::Blank, Cell::Number)
    }
}

/// Flattens an entry into the column order of [`HEADERS`].
pub fn export_row(e: &ProductionEntry) -> [Cell; 11] {
    [
        Cell::Number(e.id as f64),
        Cell::Text(clock::display(e.created_at)),
        e.company_name.as_deref().into(),
        e.authorised_person.as_deref().into(),
        e.employee_id.as_deref().into(),
        e.sf_batch_number.as_deref().into(),
        e.final_batch_number.as_deref().into(),
        e.batch_quantity.as_deref().into(),
        e.urea_percentage.into(),
        e.density.into(),
        e.photo_path.as_deref().into(),
    ]
}

pub fn export_filename(now: PrimitiveDateTime) -> String {
    format!("production_data_global_{}.xlsx", clock::date_stamp(now))
}

/// Serializes every entry into a single-sheet workbook.
pub fn build_workbook(entries: &[ProductionEntry]) -> anyhow::Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Sheet1").context("name worksheet")?;
        for (col, title) in HEADERS.iter().enumerate() {
            sheet
                .write_string(0, col as u16, *title)
                .context("write header")?;
        }
        for (idx, entry) in entries.iter().enumerate() {
            let row = (idx + 1) as u32;
            for (col, cell) in export_row(entry).into_iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Number(n) => {
                        sheet.write_number(row, col, n).context("write number")?;
                    }
                    Cell::Text(s) => {
                        sheet.write_string(row, col, s).context("write text")?;
                    }
                    Cell::Blank => {}
                }
            }
        }
    }
    workbook.save_to_buffer().context("serialize workbook")
}
