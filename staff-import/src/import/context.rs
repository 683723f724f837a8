//! Settings shared by every row of an import run

use std::path::PathBuf;

use super::LinkagePolicy;

/// Table holding one profile row per account (`profile_id` → auth user id)
pub const STAFF_TABLE: &str = "staff";
/// Table holding one week grid per staff row, unique on `staff_id`
pub const TIMETABLE_TABLE: &str = "timetable";

/// What to do when a backend call fails for a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the row as failed and move on to the next one
    #[default]
    Continue,
    /// Stop the run at the first backend failure
    FailFast,
}

/// Per-run settings handed to the [`Importer`](super::Importer)
#[derive(Debug, Clone)]
pub struct ImportContext {
    /// Storage bucket for profile photos
    pub avatar_bucket: String,
    /// Directory that `Photo` column file names are resolved against
    pub photo_dir: PathBuf,
    pub linkage: LinkagePolicy,
    pub failure_policy: FailurePolicy,
}

impl Default for ImportContext {
    fn default() -> Self {
        Self {
            avatar_bucket: "avatars".to_string(),
            photo_dir: PathBuf::from("photos"),
            linkage: LinkagePolicy::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}
