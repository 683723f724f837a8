//! Minimal OPC package access: part reading and relationship resolution

use std::io::{Read, Seek};

use anyhow::{Context, Result};
use zip::ZipArchive;
use zip::result::ZipError;

/// Namespace of `r:id` / `r:embed` attributes
pub const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// A `<Relationship>` entry of a `.rels` part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub type_uri: String,
    pub target: String,
    pub external: bool,
}

/// Read a part as bytes; `None` when the package does not contain it
pub fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<Vec<u8>>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(err) => return Err(err).with_context(|| format!("Failed to open part {}", name)),
    };

    let mut bytes = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut bytes)
        .with_context(|| format!("Failed to read part {}", name))?;
    Ok(Some(bytes))
}

/// Read a part as UTF-8 text
pub fn read_part_text<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>> {
    match read_part(archive, name)? {
        Some(bytes) => {
            let text = String::from_utf8(bytes)
                .with_context(|| format!("Part {} is not valid UTF-8", name))?;
            Ok(Some(text))
        }
        None => Ok(None),
    }
}

/// Relationships of a part; an absent `.rels` part means none
pub fn read_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    part: &str,
) -> Result<Vec<Relationship>> {
    let rels_name = rels_for_part(part);
    match read_part_text(archive, &rels_name)? {
        Some(xml) => parse_relationships(&xml)
            .with_context(|| format!("Failed to parse relationships {}", rels_name)),
        None => Ok(Vec::new()),
    }
}

pub fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let doc = roxmltree::Document::parse(xml)?;
    let rels = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "Relationship")
        .filter_map(|n| {
            Some(Relationship {
                id: n.attribute("Id")?.to_string(),
                type_uri: n.attribute("Type").unwrap_or_default().to_string(),
                target: n.attribute("Target")?.to_string(),
                external: n
                    .attribute("TargetMode")
                    .is_some_and(|mode| mode.trim().eq_ignore_ascii_case("External")),
            })
        })
        .collect();
    Ok(rels)
}

pub fn rels_for_part(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file_name)) => format!("{dir}/_rels/{file_name}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolve a relationship target against the part that owns the relationship
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let target = target.split('#').next().unwrap_or(target);
    if target.is_empty() {
        // fragment-only target points at the owning part
        return normalize(source_part);
    }
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize(absolute);
    }

    let base_dir = source_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    normalize(&format!("{base_dir}/{target}"))
}

fn normalize(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.join("/")
}
