use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::chapters::{chapter_ranges, dedup_starts};
use crate::emit::{emit_chapters, ChapterOutcome};
use crate::outline::{available_levels, find_chapter_bookmarks};
use crate::pdf::PdfDocument;

pub struct ExtractOptions {
    pub pdf_path: PathBuf,
    pub output_dir: PathBuf,
    /// Bookmark nesting level treated as chapters, 0 = top level
    pub chapter_level: u32,
    pub dry_run: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            pdf_path: PathBuf::new(),
            output_dir: PathBuf::from("chapters_output"),
            chapter_level: 0,
            dry_run: false,
        }
    }
}

/// Conditions that stop a run before any chapter is attempted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("PDF file not found at '{}'", .0.display())]
    NotFound(PathBuf),
    #[error("No bookmarks (outline) found in this PDF. Cannot extract chapters automatically.")]
    NoOutline,
    #[error("{}", no_bookmarks_message(.level, .available))]
    NoBookmarksAtLevel { level: u32, available: Vec<u32> },
    #[error("No valid chapter starting points found after filtering.")]
    NoChapterStarts,
}

fn no_bookmarks_message(level: &u32, available: &[u32]) -> String {
    if available.is_empty() {
        format!(
            "No bookmarks found at level {}. No page-linking bookmarks found in the PDF at all.",
            level
        )
    } else {
        format!(
            "No bookmarks found at level {}. Bookmarks found at levels: {:?}. \
             Please try one of these for --chapter-level.",
            level, available
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ExtractReport {
    pub source: PathBuf,
    pub chapter_level: u32,
    pub total_pages: u32,
    pub dry_run: bool,
    pub chapters: Vec<ChapterOutcome>,
}

impl ExtractReport {
    pub fn written(&self) -> usize {
        self.chapters
            .iter()
            .filter(|c| matches!(c, ChapterOutcome::Written { .. }))
            .count()
    }
}

pub fn run(options: &ExtractOptions) -> Result<ExtractReport> {
    let path = options.pdf_path.as_path();
    if !path.exists() {
        return Err(ExtractError::NotFound(path.to_path_buf()).into());
    }

    info!("Processing '{}'...", path.display());
    let doc = PdfDocument::open(path)?;
    let outline = doc.outline().ok_or(ExtractError::NoOutline)?;

    let level = options.chapter_level;
    let starts = find_chapter_bookmarks(&outline, &doc, level);
    if starts.is_empty() {
        let available = available_levels(&outline).into_iter().collect();
        return Err(ExtractError::NoBookmarksAtLevel { level, available }.into());
    }

    let starts = dedup_starts(starts);
    if starts.is_empty() {
        return Err(ExtractError::NoChapterStarts.into());
    }

    let total_pages = doc.page_count();
    info!(
        "Found {} potential chapters at level {}.",
        starts.len(),
        level
    );

    let ranges = chapter_ranges(&starts, total_pages);
    let chapters = emit_chapters(&doc, ranges, &options.output_dir, options.dry_run)?;

    info!("Extraction complete.");
    Ok(ExtractReport {
        source: path.to_path_buf(),
        chapter_level: level,
        total_pages,
        dry_run: options.dry_run,
        chapters,
    })
}

/// Human-readable result lines for stdout.
pub fn print_summary(report: &ExtractReport, output_dir: &Path) {
    for chapter in &report.chapters {
        match chapter {
            ChapterOutcome::Written {
                path,
                first_page,
                last_page,
                ..
            } => println!("{} (pages {}-{})", path.display(), first_page, last_page),
            ChapterOutcome::Planned {
                path,
                first_page,
                last_page,
                ..
            } => println!(
                "{} (pages {}-{}, not written)",
                path.display(),
                first_page,
                last_page
            ),
            ChapterOutcome::Skipped { title, reason } => {
                println!("skipped '{}': {}", title, reason)
            }
            ChapterOutcome::SaveFailed { path, reason, .. } => {
                println!("failed {}: {}", path.display(), reason)
            }
        }
    }

    if report.dry_run {
        println!("\nDry run: nothing written to {}", output_dir.display());
    } else {
        println!(
            "\nExtracted {} chapter(s) into {}",
            report.written(),
            output_dir.display()
        );
    }
    println!("Extraction complete.");
}
