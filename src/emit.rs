use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::chapters::{ChapterRange, RangeError};
use crate::pdf::PdfDocument;
use crate::sanitize::chapter_filename;

/// What happened to one chapter. Page numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChapterOutcome {
    Written {
        index: usize,
        title: String,
        first_page: u32,
        last_page: u32,
        pages: usize,
        path: PathBuf,
    },
    /// Dry run: everything but the write
    Planned {
        index: usize,
        title: String,
        first_page: u32,
        last_page: u32,
        pages: usize,
        path: PathBuf,
    },
    Skipped {
        title: String,
        reason: String,
    },
    SaveFailed {
        index: usize,
        title: String,
        path: PathBuf,
        reason: String,
    },
}

/// Write one PDF per valid chapter range into `output_dir`.
///
/// Ranges that failed validation, pages that cannot be copied and chapters
/// that fail to save are logged and skipped. Only chapters that get a file
/// name consume an index, so numbering has no gaps from skipped ranges.
pub fn emit_chapters(
    source: &PdfDocument,
    ranges: Vec<Result<ChapterRange, RangeError>>,
    output_dir: &Path,
    dry_run: bool,
) -> Result<Vec<ChapterOutcome>> {
    if !dry_run {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;
    }

    let mut outcomes = Vec::with_capacity(ranges.len());
    let mut index = 0;

    for range in ranges {
        let range = match range {
            Ok(range) => range,
            Err(e) => {
                warn!("{}", e);
                outcomes.push(ChapterOutcome::Skipped {
                    title: e.title().to_string(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let title = &range.title;
        info!(
            "Extracting: '{}' (Pages {} to {})",
            title,
            range.start_page + 1,
            range.end_page + 1
        );

        let mut pages = Vec::with_capacity(range.page_count() as usize);
        for page in range.start_page..=range.end_page {
            match source.copy_page(page) {
                Ok(_) => pages.push(page),
                Err(e) => warn!(
                    "Error adding page {} for chapter '{}': {}. Skipping page.",
                    page + 1,
                    title,
                    e
                ),
            }
        }

        if pages.is_empty() {
            warn!(
                "Skipping chapter '{}' as no pages could be added (possibly due to errors or empty range).",
                title
            );
            outcomes.push(ChapterOutcome::Skipped {
                title: title.clone(),
                reason: "no pages could be copied".to_string(),
            });
            continue;
        }

        index += 1;
        let path = output_dir.join(chapter_filename(index, title));

        if dry_run {
            info!("Would save: {}", path.display());
            outcomes.push(ChapterOutcome::Planned {
                index,
                title: title.clone(),
                first_page: range.start_page + 1,
                last_page: range.end_page + 1,
                pages: pages.len(),
                path,
            });
            continue;
        }

        let mut chapter = source.build_document(&pages);
        match PdfDocument::save(&mut chapter, &path) {
            Ok(()) => {
                info!("Successfully saved: {}", path.display());
                outcomes.push(ChapterOutcome::Written {
                    index,
                    title: title.clone(),
                    first_page: range.start_page + 1,
                    last_page: range.end_page + 1,
                    pages: pages.len(),
                    path,
                });
            }
            Err(e) => {
                error!("Error saving {}: {:#}", path.display(), e);
                outcomes.push(ChapterOutcome::SaveFailed {
                    index,
                    title: title.clone(),
                    path,
                    reason: format!("{:#}", e),
                });
            }
        }
    }

    Ok(outcomes)
}
