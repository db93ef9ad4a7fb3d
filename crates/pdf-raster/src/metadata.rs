use crate::constants::{DEFAULT_PAGE_DIMENSIONS, MAX_PAGE_TREE_DEPTH};
use crate::types::*;
use lopdf::{Dictionary, Document, Object};
use std::path::Path;

/// Reads the page count and page size of a document
pub trait MetadataProbe {
    fn probe(&self, path: &Path) -> Result<DocumentMetadata>;
}

/// Metadata probe backed by lopdf; does not need a rendering engine
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfProbe;

impl MetadataProbe for LopdfProbe {
    fn probe(&self, path: &Path) -> Result<DocumentMetadata> {
        let doc = Document::load(path)?;
        let pages = doc.get_pages();
        let Some(&first_page) = pages.values().next() else {
            return Err(RasterError::NoPages);
        };

        let page_dict = doc.get_dictionary(first_page)?;
        let (width, height) = inherited(&doc, page_dict, b"MediaBox")
            .and_then(|obj| media_box_size(&doc, obj))
            .unwrap_or(DEFAULT_PAGE_DIMENSIONS);

        let rotation = inherited(&doc, page_dict, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .unwrap_or(0);
        let (width, height) = if rotation.rem_euclid(180) == 90 {
            (height, width)
        } else {
            (width, height)
        };

        Ok(DocumentMetadata {
            page_count: pages.len(),
            page_width_pt: width,
            page_height_pt: height,
        })
    }
}

/// Look up a page attribute, following Parent links for inheritable keys
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut node = page;
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        if let Ok(obj) = node.get(key) {
            return Some(resolve(doc, obj));
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

fn media_box_size(doc: &Document, obj: &Object) -> Option<(f32, f32)> {
    let rect = obj.as_array().ok()?;
    if rect.len() < 4 {
        return None;
    }
    let coords: Vec<f32> = rect
        .iter()
        .map(|obj| extract_number(resolve(doc, obj)))
        .collect::<Option<_>>()?;
    let width = (coords[2] - coords[0]).abs();
    let height = (coords[3] - coords[1]).abs();
    if width > 0.0 && height > 0.0 {
        Some((width, height))
    } else {
        None
    }
}

fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
