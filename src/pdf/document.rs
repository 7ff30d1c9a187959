use anyhow::{Context, Result};
use lopdf::{Document, Object, ObjectId};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

use super::outline::{destination_target, lookup_named_destination, read_outline};
use crate::outline::{OutlineNode, PageResolver, ResolveError, Target};

/// Why a single page could not be carried into a chapter. Pages are 1-based.
#[derive(Debug, Error)]
pub enum PageCopyError {
    #[error("page {0} does not exist")]
    NotInDocument(u32),
    #[error("page {page} is unreadable: {source}")]
    Unreadable {
        page: u32,
        #[source]
        source: lopdf::Error,
    },
    #[error("page {page} refers to missing content object {} {} R", .id.0, .id.1)]
    MissingContents { page: u32, id: ObjectId },
}

pub struct PdfDocument {
    pub doc: Document,
    /// Page object ids, indexed by 0-based page number
    page_ids: Vec<ObjectId>,
    page_numbers: HashMap<ObjectId, u32>,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let doc =
            Document::load(&path).with_context(|| format!("Failed to open PDF: {}", path_str))?;
        Ok(Self::from_document(doc))
    }

    pub fn from_document(doc: Document) -> Self {
        // get_pages is keyed by 1-based page number, in page order
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let page_numbers = page_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i as u32))
            .collect();
        PdfDocument {
            doc,
            page_ids,
            page_numbers,
        }
    }

    pub fn page_count(&self) -> u32 {
        self.page_ids.len() as u32
    }

    /// The bookmark tree, or `None` if the document has none.
    pub fn outline(&self) -> Option<Vec<OutlineNode>> {
        read_outline(&self.doc)
    }

    /// Check that a 0-based page can be carried into a new document.
    pub fn copy_page(&self, page: u32) -> Result<ObjectId, PageCopyError> {
        let id = *self
            .page_ids
            .get(page as usize)
            .ok_or(PageCopyError::NotInDocument(page + 1))?;
        let dict = self
            .doc
            .get_dictionary(id)
            .map_err(|source| PageCopyError::Unreadable {
                page: page + 1,
                source,
            })?;

        let contents: Vec<ObjectId> = match dict.get(b"Contents") {
            Ok(Object::Reference(r)) => vec![*r],
            Ok(Object::Array(parts)) => parts
                .iter()
                .filter_map(|p| p.as_reference().ok())
                .collect(),
            _ => Vec::new(),
        };
        for content_id in contents {
            if self.doc.get_object(content_id).is_err() {
                return Err(PageCopyError::MissingContents {
                    page: page + 1,
                    id: content_id,
                });
            }
        }

        Ok(id)
    }

    /// Build a new document holding only the given 0-based pages, in order.
    ///
    /// The source outline is not carried over; its entries would point at
    /// pages that no longer exist.
    pub fn build_document(&self, pages: &[u32]) -> Document {
        let mut new_doc = self.doc.clone();
        let keep: HashSet<u32> = pages.iter().map(|p| p + 1).collect();

        let pages_to_delete: Vec<u32> = (1..=self.page_count())
            .filter(|num| !keep.contains(num))
            .collect();
        if !pages_to_delete.is_empty() {
            new_doc.delete_pages(&pages_to_delete);
        }

        let root = new_doc
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .ok();
        if let Some(root) = root {
            if let Ok(catalog) = new_doc.get_dictionary_mut(root) {
                catalog.remove(b"Outlines");
            }
        }

        new_doc.prune_objects();
        new_doc
    }

    /// Save to a file
    pub fn save<P: AsRef<Path>>(doc: &mut Document, path: P) -> Result<()> {
        doc.save(&path)
            .with_context(|| format!("Failed to save PDF: {}", path.as_ref().display()))?;
        Ok(())
    }
}

impl PageResolver for PdfDocument {
    fn resolve_page(&self, target: &Target) -> Result<u32, ResolveError> {
        match target {
            Target::Page(id) => self
                .page_numbers
                .get(id)
                .copied()
                .ok_or(ResolveError::UnknownPage(id.0, id.1)),
            Target::PageNumber(n) if *n < self.page_count() => Ok(*n),
            Target::PageNumber(n) => Err(ResolveError::PageOutOfRange(*n)),
            Target::Named(name) => {
                let unknown = || ResolveError::UnknownName(String::from_utf8_lossy(name).into_owned());
                let dest = lookup_named_destination(&self.doc, name).ok_or_else(unknown)?;
                match destination_target(&self.doc, dest) {
                    // A name must lead to an explicit destination
                    Target::Named(_) | Target::Missing => Err(unknown()),
                    explicit => self.resolve_page(&explicit),
                }
            }
            Target::External(link) => Err(ResolveError::External(link.clone())),
            Target::Missing => Err(ResolveError::Missing),
        }
    }
}
