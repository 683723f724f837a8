//! Read the staff worksheet

use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Reader, Xlsx, open_workbook};

use super::values::cell_to_string;
use crate::timetable::{ColumnKind, ImportRow, classify_column};

/// Header and data rows of the staff sheet
#[derive(Debug, Clone)]
pub struct StaffSheet {
    /// Name of the worksheet that was read
    pub sheet_name: String,
    /// Header texts as written, in column order
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
}

/// One data row with its cells paired to their headers
#[derive(Debug, Clone)]
pub struct SheetRow {
    /// One-based spreadsheet row number
    pub row_number: u32,
    pub cells: Vec<(String, Option<String>)>,
}

impl SheetRow {
    /// Typed view of the row
    pub fn to_import_row(&self) -> ImportRow {
        ImportRow::from_cells(
            self.row_number,
            self.cells
                .iter()
                .map(|(header, value)| (header.as_str(), value.as_deref())),
        )
    }
}

impl StaffSheet {
    /// Typed views of every data row
    pub fn import_rows(&self) -> Vec<ImportRow> {
        self.rows.iter().map(SheetRow::to_import_row).collect()
    }

    /// Day-period headers whose period digit is outside `1..=7`
    pub fn invalid_period_columns(&self) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|h| matches!(classify_column(h), ColumnKind::Period(p) if !p.is_in_range()))
            .map(String::as_str)
            .collect()
    }
}

/// Read the staff sheet from an `.xlsx` workbook.
///
/// `sheet` selects a worksheet by name; without it the first sheet is used.
/// The first row of the used range is the header row.
pub fn read_staff_sheet<P: AsRef<Path>>(path: P, sheet: Option<&str>) -> Result<StaffSheet> {
    let path = path.as_ref();
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(name) => {
            if !sheet_names.iter().any(|s| s == name) {
                bail!(
                    "Sheet '{}' not found in {} (available: {})",
                    name,
                    path.display(),
                    sheet_names.join(", ")
                );
            }
            name.to_string()
        }
        None => sheet_names
            .first()
            .cloned()
            .context("Excel file has no sheets")?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    // Row offset of the used range; calamine drops leading empty rows
    let first_row = range.start().map(|(row, _)| row).unwrap_or(0);

    let mut rows_iter = range.rows();
    let Some(header_row) = rows_iter.next() else {
        bail!("Sheet '{}' is empty", sheet_name);
    };

    let headers: Vec<String> = header_row
        .iter()
        .map(|c| cell_to_string(c).unwrap_or_default())
        .collect();

    let mut rows = Vec::new();
    for (offset, row) in rows_iter.enumerate() {
        // header is at `first_row` (0-based), data starts one below; +1 for 1-based
        let row_number = first_row + offset as u32 + 2;

        let cells = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.trim().is_empty())
            .map(|(col_idx, header)| {
                let value = row.get(col_idx).and_then(cell_to_string);
                (header.clone(), value)
            })
            .collect();

        rows.push(SheetRow { row_number, cells });
    }

    if rows.is_empty() {
        bail!("Sheet '{}' has a header row but no data rows", sheet_name);
    }

    Ok(StaffSheet {
        sheet_name,
        headers,
        rows,
    })
}
