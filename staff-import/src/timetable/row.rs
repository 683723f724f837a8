//! Typed view of one spreadsheet row

use super::{ColumnKind, PeriodColumn, classify_column};

/// Header of the email column
pub const EMAIL_COLUMN: &str = "Mail id";
/// Header of the display name column
pub const NAME_COLUMN: &str = "Staff Name";
/// Optional header holding a photo URL or file name
pub const PHOTO_COLUMN: &str = "Photo";

/// A non-empty cell under a day-period header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodCell {
    /// Original header text (kept for error messages)
    pub header: String,
    pub column: PeriodColumn,
    pub value: String,
}

/// One staff member as read from the sheet.
///
/// Identity fields are typed; the remaining cells are reduced to the
/// day-period columns, in sheet column order. Any other column is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRow {
    /// One-based spreadsheet row number (the header is row 1)
    pub row_number: u32,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub photo: Option<String>,
    pub periods: Vec<PeriodCell>,
}

impl ImportRow {
    /// Build a row from `(header, value)` pairs.
    ///
    /// Identity headers and values are trimmed, and blank identity values
    /// count as missing. Day-period headers are classified as written, so
    /// `"M1 "` is not a period column. Empty cells never reach `periods`.
    pub fn from_cells<'a, I>(row_number: u32, cells: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let mut row = ImportRow {
            row_number,
            ..Default::default()
        };

        for (header, value) in cells {
            let Some(value) = value.filter(|v| !v.is_empty()) else {
                continue;
            };

            // Identity headers tolerate stray spaces; period headers must match exactly
            match header.trim() {
                EMAIL_COLUMN => row.email = non_blank(value),
                NAME_COLUMN => row.full_name = non_blank(value),
                PHOTO_COLUMN => row.photo = non_blank(value),
                _ => {
                    if let ColumnKind::Period(column) = classify_column(header) {
                        row.periods.push(PeriodCell {
                            header: header.to_string(),
                            column,
                            value: value.to_string(),
                        });
                    }
                }
            }
        }

        row
    }

    /// Email and name, when both are present
    pub fn identity(&self) -> Option<(&str, &str)> {
        Some((self.email.as_deref()?, self.full_name.as_deref()?))
    }

    /// Headers of the identity columns that are missing
    pub fn missing_identity(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.email.is_none() {
            missing.push(EMAIL_COLUMN);
        }
        if self.full_name.is_none() {
            missing.push(NAME_COLUMN);
        }
        missing
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
