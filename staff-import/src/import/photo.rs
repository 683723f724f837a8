//! Profile photo sources and storage naming

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::debug;

use crate::sheet::EmbeddedImage;
use crate::timetable::ImportRow;

/// Extension assumed when a photo reference has none
const FALLBACK_EXTENSION: &str = "jpg";

/// Where a photo was taken from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoSource {
    /// Picture anchored on the row in the workbook
    Embedded { part_name: String },
    /// `Photo` column holding an http(s) URL
    Url(String),
    /// `Photo` column holding a file name under the photo directory
    File(PathBuf),
}

impl std::fmt::Display for PhotoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhotoSource::Embedded { part_name } => write!(f, "embedded {}", part_name),
            PhotoSource::Url(url) => write!(f, "{}", url),
            PhotoSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Photo bytes ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub bytes: Vec<u8>,
    /// Lowercase extension without the dot
    pub extension: String,
    pub source: PhotoSource,
}

/// Object path of an account's photo inside the avatar bucket
pub fn storage_path(account_id: &str, extension: &str) -> String {
    format!("{}/profile.{}", account_id, extension)
}

/// MIME type for an image extension
pub fn content_type(extension: &str) -> String {
    match extension {
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        "svg" => "image/svg+xml".to_string(),
        "tif" | "tiff" => "image/tiff".to_string(),
        other => format!("image/{}", other),
    }
}

/// Find the photo for a row.
///
/// A picture embedded on the row takes precedence over the `Photo` column.
/// Returns `Ok(None)` when the row has neither.
pub async fn load_photo(
    row: &ImportRow,
    embedded: Option<&EmbeddedImage>,
    photo_dir: &Path,
    http: &reqwest::Client,
) -> Result<Option<Photo>> {
    if let Some(image) = embedded {
        let extension = if image.extension.is_empty() {
            FALLBACK_EXTENSION.to_string()
        } else {
            image.extension.clone()
        };
        return Ok(Some(Photo {
            bytes: image.bytes.clone(),
            extension,
            source: PhotoSource::Embedded {
                part_name: image.part_name.clone(),
            },
        }));
    }

    let Some(reference) = row.photo.as_deref() else {
        return Ok(None);
    };

    if reference.starts_with("http://") || reference.starts_with("https://") {
        debug!("Row {}: downloading photo {}", row.row_number, reference);
        let response = http
            .get(reference)
            .send()
            .await
            .with_context(|| format!("Failed to fetch photo URL {}", reference))?;
        if !response.status().is_success() {
            bail!(
                "Failed to fetch photo URL {}: HTTP {}",
                reference,
                response.status().as_u16()
            );
        }
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read photo from {}", reference))?;
        return Ok(Some(Photo {
            bytes: bytes.to_vec(),
            extension: url_extension(reference),
            source: PhotoSource::Url(reference.to_string()),
        }));
    }

    let path = photo_dir.join(reference);
    if !path.exists() {
        bail!("Photo file not found: {}", path.display());
    }
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read photo file {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());

    Ok(Some(Photo {
        bytes,
        extension,
        source: PhotoSource::File(path),
    }))
}

/// Extension of the last path segment of a URL, ignoring query and fragment
fn url_extension(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let last_segment = without_query.rsplit('/').next().unwrap_or(without_query);
    last_segment
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}
