//! Conversion of calamine cells to plain text

use calamine::Data;

/// Convert an Excel cell to the text stored in the backend.
///
/// Empty strings and error cells count as no value. Whole numbers lose their
/// fractional part so that a period typed as `3` is not imported as `3.0`.
pub fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                Some((*f as i64).to_string())
            } else {
                Some(f.to_string())
            }
        }
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(format!("{}", dt)),
        Data::DateTimeIso(s) => Some(s.clone()),
        Data::DurationIso(s) => Some(s.clone()),
        Data::Error(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    #[test]
    fn test_empty_cells_have_no_value() {
        assert_eq!(cell_to_string(&Data::Empty), None);
        assert_eq!(cell_to_string(&Data::String(String::new())), None);
        assert_eq!(cell_to_string(&Data::Error(CellErrorType::NA)), None);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(cell_to_string(&Data::Float(3.0)), Some("3".into()));
        assert_eq!(cell_to_string(&Data::Float(2.5)), Some("2.5".into()));
        assert_eq!(cell_to_string(&Data::Int(7)), Some("7".into()));
    }

    #[test]
    fn test_text_is_kept_verbatim() {
        assert_eq!(
            cell_to_string(&Data::String(" Lab ".into())),
            Some(" Lab ".into())
        );
        assert_eq!(cell_to_string(&Data::Bool(true)), Some("true".into()));
    }
}
