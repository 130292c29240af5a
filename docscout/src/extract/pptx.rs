use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use tracing::debug;
use xml::reader::{EventReader, XmlEvent};
use zip::ZipArchive;

use super::{ExtractResult, Slide};
use crate::errors::ExtractionError;
use crate::upload::UploadedFile;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";
const SLIDE_PREFIX: &str = "ppt/slides/slide";
const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Extracts the text of every top-level shape on every slide.
///
/// Slides follow the presentation's slide list (`p:sldIdLst`), which is the
/// order they are shown in, and are numbered from 1. A package without
/// presentation relationships falls back to the number in each slide's part
/// name. A shape contributes one entry when it has a text body, its paragraphs
/// joined with `\n`; shapes nested in groups are not visited.
pub fn extract(file: &UploadedFile) -> ExtractResult<Vec<Slide>> {
    let mut archive = ZipArchive::new(Cursor::new(file.bytes()))?;
    if archive.index_for_name(PRESENTATION_PART).is_none() {
        return Err(ExtractionError::missing_part(PRESENTATION_PART));
    }

    let parts = slide_parts(&mut archive)?;
    debug!("{}: {} slides", file.name(), parts.len());

    let mut slides = Vec::with_capacity(parts.len());
    for (index, part) in parts.iter().enumerate() {
        let entry = archive.by_name(part)?;
        slides.push(Slide {
            number: index + 1,
            shapes: shape_texts(part, entry)?,
        });
    }

    Ok(slides)
}

/// Slide part names in display order
fn slide_parts<R: Read + Seek>(archive: &mut ZipArchive<R>) -> ExtractResult<Vec<String>> {
    if archive.index_for_name(PRESENTATION_RELS_PART).is_none() {
        let mut numbered: Vec<(usize, String)> = archive
            .file_names()
            .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
            .collect();
        numbered.sort();
        return Ok(numbered.into_iter().map(|(_, part)| part).collect());
    }

    let ids = slide_ids(archive.by_name(PRESENTATION_PART)?)?;
    let targets = slide_targets(archive.by_name(PRESENTATION_RELS_PART)?)?;

    ids.iter()
        .map(|id| {
            let part = targets
                .get(id)
                .ok_or_else(|| ExtractionError::missing_part(format!("slide relationship {}", id)))?;
            if archive.index_for_name(part).is_none() {
                return Err(ExtractionError::missing_part(part.as_str()));
            }
            Ok(part.clone())
        })
        .collect()
}

/// Relationship ids of `p:sldId` entries, in list order
fn slide_ids<R: Read>(source: R) -> ExtractResult<Vec<String>> {
    let mut ids = Vec::new();
    for event in EventReader::new(source) {
        if let XmlEvent::StartElement {
            name, attributes, ..
        } = event.map_err(|e| ExtractionError::xml(PRESENTATION_PART, e))?
        {
            if name.local_name != "sldId" {
                continue;
            }
            let rel_id = attributes.into_iter().find(|attr| {
                attr.name.local_name == "id"
                    && (attr.name.namespace.as_deref() == Some(RELATIONSHIPS_NS)
                        || attr.name.prefix.as_deref() == Some("r"))
            });
            if let Some(attr) = rel_id {
                ids.push(attr.value);
            }
        }
    }
    Ok(ids)
}

/// Slide relationship id to part name
fn slide_targets<R: Read>(source: R) -> ExtractResult<HashMap<String, String>> {
    let mut targets = HashMap::new();
    for event in EventReader::new(source) {
        if let XmlEvent::StartElement {
            name, attributes, ..
        } = event.map_err(|e| ExtractionError::xml(PRESENTATION_RELS_PART, e))?
        {
            if name.local_name != "Relationship" {
                continue;
            }
            let attr = |key: &str| {
                attributes
                    .iter()
                    .find(|a| a.name.local_name == key)
                    .map(|a| a.value.as_str())
            };
            if let (Some(id), Some(target), Some(kind)) = (attr("Id"), attr("Target"), attr("Type")) {
                if kind.ends_with("/slide") {
                    targets.insert(id.to_string(), resolve_target(target));
                }
            }
        }
    }
    Ok(targets)
}

/// Relationship targets are relative to `ppt/` unless they start at the package root
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target),
    }
}

/// Number in a `ppt/slides/slideN.xml` part name
fn slide_number(name: &str) -> Option<usize> {
    name.strip_prefix(SLIDE_PREFIX)?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

#[derive(Default)]
struct ShapeState {
    paragraphs: Vec<String>,
    has_body: bool,
    in_text: bool,
}

impl ShapeState {
    fn push_text(&mut self, text: &str) {
        if let Some(last) = self.paragraphs.last_mut() {
            last.push_str(text);
        }
    }
}

fn shape_texts<R: Read>(part: &str, source: R) -> ExtractResult<Vec<String>> {
    let mut shapes = Vec::new();
    let mut group_depth = 0usize;
    let mut shape: Option<ShapeState> = None;

    for event in EventReader::new(source) {
        match event.map_err(|e| ExtractionError::xml(part, e))? {
            XmlEvent::StartElement { name, .. } => match name.local_name.as_str() {
                "grpSp" => group_depth += 1,
                "sp" if group_depth == 0 && shape.is_none() => shape = Some(ShapeState::default()),
                "txBody" => {
                    if let Some(s) = shape.as_mut() {
                        s.has_body = true;
                    }
                }
                "p" => {
                    if let Some(s) = shape.as_mut().filter(|s| s.has_body) {
                        s.paragraphs.push(String::new());
                    }
                }
                "t" => {
                    if let Some(s) = shape.as_mut() {
                        s.in_text = true;
                    }
                }
                "br" => {
                    if let Some(s) = shape.as_mut() {
                        s.push_text("\n");
                    }
                }
                _ => {}
            },
            XmlEvent::EndElement { name } => match name.local_name.as_str() {
                "grpSp" => group_depth = group_depth.saturating_sub(1),
                "sp" if group_depth == 0 => {
                    if let Some(done) = shape.take().filter(|s| s.has_body) {
                        shapes.push(done.paragraphs.join("\n"));
                    }
                }
                "t" => {
                    if let Some(s) = shape.as_mut() {
                        s.in_text = false;
                    }
                }
                _ => {}
            },
            XmlEvent::Characters(text) | XmlEvent::Whitespace(text) | XmlEvent::CData(text) => {
                if let Some(s) = shape.as_mut().filter(|s| s.in_text) {
                    s.push_text(&text);
                }
            }
            _ => {}
        }
    }

    Ok(shapes)
}
