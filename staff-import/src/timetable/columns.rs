//! Classification of spreadsheet headers into day-period columns

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Day, PERIODS_PER_DAY};

/// Day code followed by exactly one ASCII digit, anchored on both ends so that
/// `T1` and `Th1` never shadow each other.
static PERIOD_COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(M|T|W|Th|F|Sa)([0-9])$").expect("period column pattern"));

/// A header that names a day and a one-based period digit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodColumn {
    pub day: Day,
    /// Digit as written in the header (`1` for the first period)
    pub digit: u32,
}

impl PeriodColumn {
    /// Zero-based slot index, or `None` when the digit is outside `1..=7`
    pub fn period_index(&self) -> Option<usize> {
        let digit = self.digit as usize;
        (1..=PERIODS_PER_DAY).contains(&digit).then(|| digit - 1)
    }

    /// Whether the digit addresses a real slot
    pub fn is_in_range(&self) -> bool {
        self.period_index().is_some()
    }
}

/// What a header means to the importer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Day-period column
    Period(PeriodColumn),
    /// Anything else (identity columns, notes, stray columns)
    Other,
}

/// Classify a header. Only an exact match of the day-period pattern counts.
pub fn classify_column(header: &str) -> ColumnKind {
    let Some(caps) = PERIOD_COLUMN.captures(header) else {
        return ColumnKind::Other;
    };

    let day = caps.get(1).and_then(|m| Day::from_code(m.as_str()));
    let digit = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());

    match (day, digit) {
        (Some(day), Some(digit)) => ColumnKind::Period(PeriodColumn { day, digit }),
        _ => ColumnKind::Other,
    }
}
