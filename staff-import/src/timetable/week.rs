//! Fixed six-day, seven-period week grid

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use super::TimetableError;

/// Number of period slots in every day
pub const PERIODS_PER_DAY: usize = 7;

/// A teaching day, Monday through Saturday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    /// All days in week order
    pub const ALL: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    /// Resolve a spreadsheet day code (`M`, `T`, `W`, `Th`, `F`, `Sa`)
    pub fn from_code(code: &str) -> Option<Day> {
        match code {
            "M" => Some(Day::Monday),
            "T" => Some(Day::Tuesday),
            "W" => Some(Day::Wednesday),
            "Th" => Some(Day::Thursday),
            "F" => Some(Day::Friday),
            "Sa" => Some(Day::Saturday),
            _ => None,
        }
    }

    /// The spreadsheet day code for this day
    #[cfg(test)]
    pub fn code(self) -> &'static str {
        match self {
            Day::Monday => "M",
            Day::Tuesday => "T",
            Day::Wednesday => "W",
            Day::Thursday => "Th",
            Day::Friday => "F",
            Day::Saturday => "Sa",
        }
    }

    /// Column name of this day in the `timetable` table
    pub fn column_name(self) -> &'static str {
        match self {
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
            Day::Saturday => "saturday",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

/// A staff member's full week.
///
/// Every day always holds exactly [`PERIODS_PER_DAY`] slots. Unset slots are
/// `None` and serialize as `null`, so writing a grid replaces the whole week
/// instead of merging into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekGrid {
    slots: [[Option<String>; PERIODS_PER_DAY]; 6],
}

impl WeekGrid {
    /// Create an empty week
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the label for a zero-based period of a day.
    ///
    /// `column` is only used to describe the error when `period` is out of range.
    pub fn set(
        &mut self,
        day: Day,
        period: usize,
        label: impl Into<String>,
        column: &str,
    ) -> Result<(), TimetableError> {
        let slot = self.slots[day.index()].get_mut(period).ok_or_else(|| {
            TimetableError::PeriodOutOfRange {
                column: column.to_string(),
                period: period as u32 + 1,
            }
        })?;
        *slot = Some(label.into());
        Ok(())
    }

    /// Label at a zero-based period, `None` when the slot is empty or out of range
    #[cfg(test)]
    pub fn get(&self, day: Day, period: usize) -> Option<&str> {
        self.slots[day.index()].get(period)?.as_deref()
    }

    /// All slots of one day
    pub fn day(&self, day: Day) -> &[Option<String>; PERIODS_PER_DAY] {
        &self.slots[day.index()]
    }

    /// Number of slots holding a label
    pub fn filled_slots(&self) -> usize {
        self.slots
            .iter()
            .flat_map(|day| day.iter())
            .filter(|slot| slot.is_some())
            .count()
    }

    /// Whether every slot is empty
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.filled_slots() == 0
    }

    /// Build the `timetable` row for a staff member: `staff_id` plus one
    /// seven-element array per day.
    pub fn to_record(&self, staff_id: &Value) -> Value {
        let mut record = serde_json::Map::new();
        record.insert("staff_id".to_string(), staff_id.clone());
        for day in Day::ALL {
            let slots = self
                .day(day)
                .iter()
                .map(|slot| match slot {
                    Some(label) => Value::String(label.clone()),
                    None => Value::Null,
                })
                .collect();
            record.insert(day.column_name().to_string(), Value::Array(slots));
        }
        Value::Object(record)
    }
}

impl Serialize for WeekGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Day::ALL.len()))?;
        for day in Day::ALL {
            map.serialize_entry(day.column_name(), self.day(day))?;
        }
        map.end()
    }
}
