use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::outline::{Destination, OutlineNode, Target};

// Name trees nest a handful of levels in practice
const MAX_NAME_TREE_DEPTH: usize = 32;

/// Read the bookmark tree of a document.
///
/// Every outline item becomes a `Destination`; an item with children is
/// followed by a `Group` holding them. Returns `None` when the document has no
/// outline or the outline is empty.
pub fn read_outline(doc: &Document) -> Option<Vec<OutlineNode>> {
    let catalog = doc.catalog().ok()?;
    let outlines = match catalog.get(b"Outlines").map(|o| deref(doc, o)) {
        Ok(Object::Dictionary(d)) => d,
        _ => return None,
    };

    let first_ref = match outlines.get(b"First") {
        Ok(Object::Reference(r)) => *r,
        _ => return None,
    };

    let mut seen = HashSet::new();
    let items = parse_outline_items(doc, first_ref, &mut seen);
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn parse_outline_items(
    doc: &Document,
    first_id: ObjectId,
    seen: &mut HashSet<ObjectId>,
) -> Vec<OutlineNode> {
    let mut items = Vec::new();
    let mut current_id = Some(first_id);

    while let Some(id) = current_id {
        if !seen.insert(id) {
            warn!("Outline item {} {} R is linked twice, ignoring the repeat", id.0, id.1);
            break;
        }

        let dict = match doc.get_dictionary(id) {
            Ok(d) => d,
            Err(e) => {
                warn!("Unreadable outline item {} {} R: {}", id.0, id.1, e);
                break;
            }
        };

        let title = match dict.get(b"Title").map(|o| deref(doc, o)) {
            Ok(Object::String(bytes, _)) => decode_pdf_string(bytes),
            _ => String::new(),
        };
        let target = item_target(doc, dict);
        debug!(%title, ?target, "outline item");
        items.push(OutlineNode::Destination(Destination { title, target }));

        if let Ok(Object::Reference(child_ref)) = dict.get(b"First") {
            let children = parse_outline_items(doc, *child_ref, seen);
            if !children.is_empty() {
                items.push(OutlineNode::Group(children));
            }
        }

        current_id = match dict.get(b"Next") {
            Ok(Object::Reference(r)) => Some(*r),
            _ => None,
        };
    }

    items
}

/// Target of an outline item, from `/Dest` or a `/A` action.
fn item_target(doc: &Document, dict: &Dictionary) -> Target {
    if let Ok(dest) = dict.get(b"Dest") {
        return destination_target(doc, dest);
    }

    let action = match dict.get(b"A").map(|o| deref(doc, o)) {
        Ok(Object::Dictionary(a)) => a,
        _ => return Target::Missing,
    };

    match action.get(b"S") {
        Ok(Object::Name(kind)) if kind == b"GoTo" => match action.get(b"D") {
            Ok(dest) => destination_target(doc, dest),
            Err(_) => Target::Missing,
        },
        Ok(Object::Name(kind)) if kind == b"URI" => match action.get(b"URI").map(|o| deref(doc, o)) {
            Ok(Object::String(uri, _)) => Target::External(decode_pdf_string(uri)),
            _ => Target::External("URI".to_string()),
        },
        Ok(Object::Name(kind)) => Target::External(String::from_utf8_lossy(kind).into_owned()),
        _ => Target::Missing,
    }
}

/// Classify a destination object without resolving named destinations.
pub fn destination_target(doc: &Document, dest: &Object) -> Target {
    match deref(doc, dest) {
        Object::Array(arr) => match arr.first() {
            Some(Object::Reference(page_ref)) => Target::Page(*page_ref),
            Some(Object::Integer(n)) if *n >= 0 => Target::PageNumber(*n as u32),
            _ => Target::Missing,
        },
        Object::String(name, _) | Object::Name(name) => Target::Named(name.clone()),
        // Named destination values may be wrapped as << /D [...] >>
        Object::Dictionary(d) => match d.get(b"D") {
            Ok(inner) => match deref(doc, inner) {
                Object::Array(_) => destination_target(doc, inner),
                _ => Target::Missing,
            },
            Err(_) => Target::Missing,
        },
        _ => Target::Missing,
    }
}

/// Find a named destination in the catalog's `/Names /Dests` name tree or the
/// older `/Dests` dictionary.
pub fn lookup_named_destination<'a>(doc: &'a Document, name: &[u8]) -> Option<&'a Object> {
    let catalog = doc.catalog().ok()?;

    if let Ok(Object::Dictionary(names)) = catalog.get(b"Names").map(|o| deref(doc, o)) {
        if let Ok(Object::Dictionary(tree)) = names.get(b"Dests").map(|o| deref(doc, o)) {
            if let Some(dest) = search_name_tree(doc, tree, name, 0) {
                return Some(dest);
            }
        }
    }

    if let Ok(Object::Dictionary(dests)) = catalog.get(b"Dests").map(|o| deref(doc, o)) {
        if let Ok(dest) = dests.get(name) {
            return Some(dest);
        }
    }

    None
}

fn search_name_tree<'a>(
    doc: &'a Document,
    node: &'a Dictionary,
    name: &[u8],
    depth: usize,
) -> Option<&'a Object> {
    if depth > MAX_NAME_TREE_DEPTH {
        return None;
    }

    if let Ok(Object::Array(names)) = node.get(b"Names").map(|o| deref(doc, o)) {
        for pair in names.chunks(2) {
            if let [Object::String(key, _), value] = pair {
                if key == name {
                    return Some(value);
                }
            }
        }
    }

    if let Ok(Object::Array(kids)) = node.get(b"Kids").map(|o| deref(doc, o)) {
        for kid in kids {
            if let Object::Dictionary(kid) = deref(doc, kid) {
                if let Some(dest) = search_name_tree(doc, kid, name, depth + 1) {
                    return Some(dest);
                }
            }
        }
    }

    None
}

/// Follow an indirect reference; dangling references come back unchanged.
fn deref<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(r) => doc.get_object(*r).unwrap_or(obj),
        _ => obj,
    }
}

/// Decode a PDF text string (UTF-16BE or UTF-8 with BOM, else PDFDocEncoding).
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else if let Some(utf8) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        String::from_utf8_lossy(utf8).into_owned()
    } else {
        // Latin-1 approximation of PDFDocEncoding
        bytes.iter().map(|&b| b as char).collect()
    }
}
