use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};

use crate::chapters::ChapterStart;

/// Object id of an indirect PDF object (same shape as `lopdf::ObjectId`).
pub type ObjectId = (u32, u16);

/// One entry of a document outline.
///
/// A `Group` holds the children of the `Destination` that precedes it, so it
/// sits one nesting level deeper than its siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineNode {
    Destination(Destination),
    Group(Vec<OutlineNode>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub title: String,
    pub target: Target,
}

/// Where a bookmark points, before it is resolved against the page tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Explicit destination whose first element is a page reference
    Page(ObjectId),
    /// Explicit destination using a zero-based page number
    PageNumber(u32),
    /// Named destination, looked up in the document's name tables
    Named(Vec<u8>),
    /// Link that leaves the document (URI, GoToR, Launch, ...)
    External(String),
    /// No destination or action at all
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("object {0} {1} R is not a page of this document")]
    UnknownPage(u32, u16),
    #[error("page number {0} is out of range")]
    PageOutOfRange(u32),
    #[error("named destination '{0}' not found")]
    UnknownName(String),
    #[error("points outside the document ({0})")]
    External(String),
    #[error("has no destination")]
    Missing,
}

/// Maps bookmark targets to zero-based page numbers.
pub trait PageResolver {
    fn resolve_page(&self, target: &Target) -> Result<u32, ResolveError>;
}

/// Collect the bookmarks sitting exactly at `target_level`, resolved to pages.
///
/// Groups above the target level are descended into; anything deeper is never
/// visited. Bookmarks that fail to resolve are logged and dropped.
pub fn find_chapter_bookmarks<R: PageResolver>(
    root: &[OutlineNode],
    resolver: &R,
    target_level: u32,
) -> Vec<ChapterStart> {
    let mut chapters = Vec::new();
    collect_at_level(root, resolver, target_level, 0, &mut chapters);
    chapters
}

fn collect_at_level<R: PageResolver>(
    items: &[OutlineNode],
    resolver: &R,
    target_level: u32,
    level: u32,
    chapters: &mut Vec<ChapterStart>,
) {
    for item in items {
        match item {
            OutlineNode::Group(children) => {
                if level < target_level {
                    collect_at_level(children, resolver, target_level, level + 1, chapters);
                }
            }
            OutlineNode::Destination(dest) if level == target_level => {
                match resolver.resolve_page(&dest.target) {
                    Ok(page) => {
                        debug!(title = %dest.title, page, level, "chapter bookmark");
                        chapters.push(ChapterStart {
                            title: dest.title.clone(),
                            start_page: page,
                            level,
                        });
                    }
                    Err(e) => {
                        warn!("Could not get page for bookmark '{}': {}", dest.title, e);
                    }
                }
            }
            OutlineNode::Destination(_) => {}
        }
    }
}

/// Nesting levels that contain at least one bookmark.
pub fn available_levels(root: &[OutlineNode]) -> BTreeSet<u32> {
    let mut levels = BTreeSet::new();
    collect_levels(root, 0, &mut levels);
    levels
}

fn collect_levels(items: &[OutlineNode], level: u32, levels: &mut BTreeSet<u32>) {
    for item in items {
        match item {
            OutlineNode::Group(children) => collect_levels(children, level + 1, levels),
            OutlineNode::Destination(_) => {
                levels.insert(level);
            }
        }
    }
}
