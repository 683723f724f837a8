//! Import driver: provisions accounts, photos and timetables row by row

mod context;
mod driver;
mod linkage;
mod photo;
mod report;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{FailurePolicy, ImportContext};
pub use driver::Importer;
pub use linkage::LinkagePolicy;
