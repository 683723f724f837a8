//! Dry-run output: what would be imported, without touching the backend

use std::collections::HashMap;

use anyhow::Result;
use colored::*;
use serde_json::{Value, json};

use crate::sheet::EmbeddedImage;
use crate::timetable::{ImportRow, build_week};

/// Describe the import of one row as JSON
pub fn preview_row(row: &ImportRow, image: Option<&EmbeddedImage>) -> Value {
    let Some((email, full_name)) = row.identity() else {
        return json!({
            "row": row.row_number,
            "skip": format!("missing {}", row.missing_identity().join(" and ")),
        });
    };

    let photo = match (image, row.photo.as_deref()) {
        (Some(image), _) => Value::String(format!("embedded ({})", image.extension)),
        (None, Some(reference)) => Value::String(reference.to_string()),
        (None, None) => Value::Null,
    };

    match build_week(row) {
        Ok(week) => json!({
            "row": row.row_number,
            "email": email,
            "full_name": full_name,
            "photo": photo,
            "timetable": week,
        }),
        Err(err) => json!({
            "row": row.row_number,
            "email": email,
            "error": err.to_string(),
        }),
    }
}

/// Print the preview of every row
pub fn print_dry_run(rows: &[ImportRow], images: &HashMap<u32, EmbeddedImage>) -> Result<()> {
    println!("{}", "Dry run: no backend calls will be made".yellow().bold());
    for row in rows {
        let preview = preview_row(row, images.get(&row.row_number));
        println!("{}", serde_json::to_string_pretty(&preview)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_of_valid_row() {
        let row = ImportRow::from_cells(
            2,
            [
                ("Mail id", Some("a@x.com")),
                ("Staff Name", Some("A")),
                ("M1", Some("Math")),
            ],
        );

        let preview = preview_row(&row, None);
        assert_eq!(preview["email"], "a@x.com");
        assert_eq!(preview["photo"], Value::Null);
        assert_eq!(preview["timetable"]["monday"][0], "Math");
        assert_eq!(preview["timetable"]["saturday"].as_array().unwrap().len(), 7);
    }

    #[test]
    fn test_preview_of_skipped_and_invalid_rows() {
        let skipped = ImportRow::from_cells(3, [("Staff Name", Some("B"))]);
        assert_eq!(preview_row(&skipped, None)["skip"], "missing Mail id");

        let invalid = ImportRow::from_cells(
            4,
            [
                ("Mail id", Some("c@x.com")),
                ("Staff Name", Some("C")),
                ("F0", Some("Early")),
            ],
        );
        let preview = preview_row(&invalid, None);
        assert!(preview["error"].as_str().unwrap().contains("F0"));
    }
}
