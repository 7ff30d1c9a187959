use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// A bookmark chosen as the first page of a chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterStart {
    pub title: String,
    /// 0-indexed
    pub start_page: u32,
    pub level: u32,
}

/// Inclusive, 0-indexed page span of one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterRange {
    pub title: String,
    pub start_page: u32,
    pub end_page: u32,
}

impl ChapterRange {
    pub fn page_count(&self) -> u32 {
        self.end_page - self.start_page + 1
    }
}

/// Why a computed span cannot become a chapter. Page numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error(
        "skipping chapter '{title}' (intended pages {start}-{end}): calculated end page is \
         before start page, consecutive bookmarks at this level probably point to the same page"
    )]
    Empty { title: String, start: i64, end: i64 },
    #[error(
        "skipping chapter '{title}': invalid page range ({start}-{end}) for a PDF with {total} pages"
    )]
    OutOfBounds {
        title: String,
        start: i64,
        end: i64,
        total: u32,
    },
}

impl RangeError {
    pub fn title(&self) -> &str {
        match self {
            RangeError::Empty { title, .. } | RangeError::OutOfBounds { title, .. } => title,
        }
    }
}

/// Sort chapter starts by page and keep the first bookmark seen for each page.
///
/// The sort is stable, so among bookmarks sharing a page the one that came
/// first in outline order survives.
pub fn dedup_starts(mut starts: Vec<ChapterStart>) -> Vec<ChapterStart> {
    starts.sort_by_key(|c| c.start_page);
    starts.dedup_by(|later, kept| {
        let same_page = later.start_page == kept.start_page;
        if same_page {
            debug!(
                page = later.start_page,
                level = later.level,
                "dropping '{}', '{}' starts on the same page",
                later.title,
                kept.title
            );
        }
        same_page
    });
    starts
}

/// Turn deduplicated chapter starts into page ranges.
///
/// Each chapter ends on the page before the next one starts; the last runs to
/// the end of the document. Every span is validated on its own, so one bad
/// entry does not affect its neighbours.
pub fn chapter_ranges(
    starts: &[ChapterStart],
    total_pages: u32,
) -> Vec<Result<ChapterRange, RangeError>> {
    starts
        .iter()
        .enumerate()
        .map(|(i, start)| {
            let end = match starts.get(i + 1) {
                Some(next) => i64::from(next.start_page) - 1,
                None => i64::from(total_pages) - 1,
            };
            validate(&start.title, i64::from(start.start_page), end, total_pages)
        })
        .collect()
}

fn validate(
    title: &str,
    start: i64,
    end: i64,
    total_pages: u32,
) -> Result<ChapterRange, RangeError> {
    if start > end {
        return Err(RangeError::Empty {
            title: title.to_string(),
            start: start + 1,
            end: end + 1,
        });
    }

    let in_bounds = |p: i64| p >= 0 && p < i64::from(total_pages);
    if !in_bounds(start) || !in_bounds(end) {
        return Err(RangeError::OutOfBounds {
            title: title.to_string(),
            start: start + 1,
            end: end + 1,
            total: total_pages,
        });
    }

    Ok(ChapterRange {
        title: title.to_string(),
        start_page: start as u32,
        end_page: end as u32,
    })
}
