//! Pictures embedded in a worksheet, keyed by the row they are anchored to

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, warn};
use roxmltree::Node;
use zip::ZipArchive;

use super::package::{
    RELATIONSHIPS_NS, read_part, read_part_text, read_relationships, resolve_target,
};

const DEFAULT_WORKBOOK_PART: &str = "xl/workbook.xml";

/// Raw image bytes pulled out of the package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    /// Lowercase file extension of the media part (e.g. "png")
    pub extension: String,
    pub bytes: Vec<u8>,
    /// Package part the bytes came from (e.g. "xl/media/image1.png")
    pub part_name: String,
}

/// Read the images anchored on `sheet_name`.
///
/// The map is keyed by one-based spreadsheet row, taken from the top-left
/// anchor cell of each picture. If several pictures start on the same row the
/// last one in the drawing wins.
pub fn read_embedded_images<P: AsRef<Path>>(
    path: P,
    sheet_name: &str,
) -> Result<HashMap<u32, EmbeddedImage>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("Not an xlsx package: {}", path.display()))?;

    let Some(sheet_part) = find_sheet_part(&mut archive, sheet_name)? else {
        warn!("Sheet '{}' not found in workbook package, no images read", sheet_name);
        return Ok(HashMap::new());
    };

    let mut images = HashMap::new();
    let drawings: Vec<String> = read_relationships(&mut archive, &sheet_part)?
        .into_iter()
        .filter(|rel| !rel.external && rel.type_uri.ends_with("/drawing"))
        .map(|rel| resolve_target(&sheet_part, &rel.target))
        .collect();

    for drawing in drawings {
        read_drawing_images(&mut archive, &drawing, &mut images)?;
    }

    debug!(
        "Found {} anchored image(s) on sheet '{}'",
        images.len(),
        sheet_name
    );
    Ok(images)
}

/// Locate the worksheet part for a sheet name through the workbook relationships
fn find_sheet_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    sheet_name: &str,
) -> Result<Option<String>> {
    let workbook_part = read_relationships(archive, "")?
        .into_iter()
        .find(|rel| rel.type_uri.ends_with("/officeDocument"))
        .map(|rel| resolve_target("", &rel.target))
        .unwrap_or_else(|| DEFAULT_WORKBOOK_PART.to_string());

    let Some(xml) = read_part_text(archive, &workbook_part)? else {
        return Ok(None);
    };
    let doc = roxmltree::Document::parse(&xml)
        .with_context(|| format!("Failed to parse {}", workbook_part))?;

    let rel_id = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "sheet")
        .find(|n| n.attribute("name") == Some(sheet_name))
        .and_then(|n| n.attribute((RELATIONSHIPS_NS, "id")));

    let Some(rel_id) = rel_id else {
        return Ok(None);
    };

    let target = read_relationships(archive, &workbook_part)?
        .into_iter()
        .find(|rel| rel.id == rel_id)
        .map(|rel| resolve_target(&workbook_part, &rel.target));
    Ok(target)
}

fn read_drawing_images<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    drawing_part: &str,
    images: &mut HashMap<u32, EmbeddedImage>,
) -> Result<()> {
    let Some(xml) = read_part_text(archive, drawing_part)? else {
        warn!("Drawing part {} is missing", drawing_part);
        return Ok(());
    };
    let doc = roxmltree::Document::parse(&xml)
        .with_context(|| format!("Failed to parse drawing {}", drawing_part))?;
    let rels = read_relationships(archive, drawing_part)?;

    for anchor in anchor_nodes(doc.root_element()) {
        let Some(row) = anchor_row(anchor) else {
            continue;
        };
        let Some(embed) = anchor
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == "blip")
            .and_then(|n| n.attribute((RELATIONSHIPS_NS, "embed")))
        else {
            continue;
        };
        let Some(rel) = rels.iter().find(|rel| rel.id == embed && !rel.external) else {
            warn!("{}: image relationship {} not found", drawing_part, embed);
            continue;
        };

        let media_part = resolve_target(drawing_part, &rel.target);
        let Some(bytes) = read_part(archive, &media_part)? else {
            warn!("{}: media part {} is missing", drawing_part, media_part);
            continue;
        };
        let extension = media_part
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        // one-based spreadsheet row
        let row_number = row + 1;
        if images.contains_key(&row_number) {
            debug!("Row {} has several images, keeping {}", row_number, media_part);
        }
        images.insert(
            row_number,
            EmbeddedImage {
                extension,
                bytes,
                part_name: media_part,
            },
        );
    }

    Ok(())
}

fn is_anchor(node: Node<'_, '_>) -> bool {
    node.is_element() && matches!(node.tag_name().name(), "oneCellAnchor" | "twoCellAnchor")
}

/// Anchors that are direct children of `<xdr:wsDr>`. `mc:AlternateContent`
/// is looked through, taking the first branch that holds anchors so a picture
/// is not counted twice.
fn anchor_nodes<'a, 'input>(wsdr: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
    let mut out = Vec::new();
    for child in wsdr.children().filter(|n| n.is_element()) {
        if is_anchor(child) {
            out.push(child);
            continue;
        }
        if child.tag_name().name() != "AlternateContent" {
            continue;
        }

        let branch = child
            .children()
            .filter(|n| n.is_element())
            .map(|branch| branch.descendants().filter(|n| is_anchor(*n)).collect::<Vec<_>>())
            .find(|anchors| !anchors.is_empty());
        if let Some(anchors) = branch {
            out.extend(anchors);
        }
    }
    out
}

/// Zero-based row of the anchor's `<xdr:from>` cell
fn anchor_row(anchor: Node<'_, '_>) -> Option<u32> {
    let from = anchor
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "from")?;
    let row = from
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "row")?;
    row.text()?.trim().parse().ok()
}
