//! Workbooks built on the fly for tests

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Image, Workbook};

/// 1x1 transparent PNG
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Write a small staff workbook into `dir`.
///
/// Layout (sheet "Staff", a second sheet "Notes"):
///
/// | row | Mail id | Staff Name | Department | M1   | Th3     | F8 |
/// |-----|---------|------------|------------|------|---------|----|
/// | 2   | a@x.com | A          | Science    | Math | Physics |    |
/// | 3   |         | B          |            | Art  |         |    |
/// | 4   | c@x.com | C          |            | 101  |         |    |
///
/// With `with_image`, a PNG is anchored at row 2 on "Staff" and another at
/// row 3 on "Notes".
pub fn staff_workbook(dir: &Path, with_image: bool) -> PathBuf {
    let path = dir.join("staff.xlsx");
    let mut workbook = Workbook::new();

    let staff = workbook.add_worksheet();
    staff.set_name("Staff").unwrap();
    for (col, header) in ["Mail id", "Staff Name", "Department", "M1", "Th3", "F8"]
        .iter()
        .enumerate()
    {
        staff.write_string(0, col as u16, *header).unwrap();
    }

    staff.write_string(1, 0, "a@x.com").unwrap();
    staff.write_string(1, 1, "A").unwrap();
    staff.write_string(1, 2, "Science").unwrap();
    staff.write_string(1, 3, "Math").unwrap();
    staff.write_string(1, 4, "Physics").unwrap();

    staff.write_string(2, 1, "B").unwrap();
    staff.write_string(2, 3, "Art").unwrap();

    staff.write_string(3, 0, "c@x.com").unwrap();
    staff.write_string(3, 1, "C").unwrap();
    staff.write_number(3, 3, 101.0).unwrap();

    if with_image {
        let image = Image::new_from_buffer(TINY_PNG).unwrap();
        staff.insert_image(1, 7, &image).unwrap();
    }

    let notes = workbook.add_worksheet();
    notes.set_name("Notes").unwrap();
    notes.write_string(0, 0, "Mail id").unwrap();
    if with_image {
        let image = Image::new_from_buffer(TINY_PNG).unwrap();
        notes.insert_image(2, 1, &image).unwrap();
    }

    workbook.save(&path).unwrap();
    path
}
