//! Staff timetable model and the row-to-week transform
//!
//! A spreadsheet row carries identity columns (`Mail id`, `Staff Name`, `Photo`)
//! next to day-period columns such as `M1`, `Th3` or `Sa7`. This module turns
//! such a row into a typed [`ImportRow`] and builds the full [`WeekGrid`] that is
//! upserted for the staff member.

mod build;
mod columns;
mod error;
mod row;
mod week;

pub use build::build_week;
pub use columns::{ColumnKind, PeriodColumn, classify_column};
pub use error::TimetableError;
pub use row::ImportRow;
pub use week::{Day, PERIODS_PER_DAY, WeekGrid};
