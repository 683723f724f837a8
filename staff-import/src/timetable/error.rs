//! Errors raised while building a week grid

/// Error from timetable construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimetableError {
    /// A day-period column names a period outside `1..=7`
    PeriodOutOfRange {
        /// Header of the offending column (e.g. "M8")
        column: String,
        /// The one-based period digit taken from the header
        period: u32,
    },
}

impl std::fmt::Display for TimetableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimetableError::PeriodOutOfRange { column, period } => write!(
                f,
                "column '{}' refers to period {}, but a day only has periods 1-{}",
                column,
                period,
                super::PERIODS_PER_DAY
            ),
        }
    }
}

impl std::error::Error for TimetableError {}
