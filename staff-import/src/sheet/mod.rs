//! Spreadsheet input: worksheet cells and images embedded in the sheet
//!
//! Cells are read with calamine. Calamine does not expose where a picture is
//! anchored, so embedded images are read separately from the package's
//! DrawingML parts and keyed by the spreadsheet row they sit on.

mod images;
mod package;
mod reader;
mod values;

#[cfg(test)]
pub(crate) mod fixtures;

pub use images::{EmbeddedImage, read_embedded_images};
pub use reader::read_staff_sheet;
