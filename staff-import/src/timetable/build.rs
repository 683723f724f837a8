//! Row-to-week transform

use super::{ImportRow, TimetableError, WeekGrid};

/// Build the full week for a row.
///
/// Each day-period cell lands at `week[day][digit - 1]`; every other slot stays
/// empty. When two columns address the same slot the later column wins. A
/// period digit outside `1..=7` fails the whole row.
pub fn build_week(row: &ImportRow) -> Result<WeekGrid, TimetableError> {
    let mut week = WeekGrid::new();

    for cell in &row.periods {
        let period = cell
            .column
            .period_index()
            .ok_or_else(|| TimetableError::PeriodOutOfRange {
                column: cell.header.clone(),
                period: cell.column.digit,
            })?;
        week.set(cell.column.day, period, cell.value.as_str(), &cell.header)?;
    }

    Ok(week)
}
