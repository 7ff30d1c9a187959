use clap::Parser;
use std::path::PathBuf;

use crate::commands::extract::ExtractOptions;

#[derive(Parser)]
#[command(name = "pdfchapters")]
#[command(about = "Split a PDF into one file per chapter using its bookmarks")]
#[command(version)]
pub struct Cli {
    /// PDF file to split
    pub pdf_path: PathBuf,

    /// Directory to save the extracted chapter PDFs
    #[arg(short, long, alias = "output_dir", default_value = "chapters_output")]
    pub output_dir: PathBuf,

    /// Nesting level of bookmarks to treat as chapters (0 for top-level, 1 for next, etc.)
    #[arg(short = 'l', long, alias = "chapter_level", default_value_t = 0)]
    pub chapter_level: u32,

    /// Resolve chapters and report file names without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print a JSON report of every chapter instead of the summary
    #[arg(long)]
    pub json: bool,

    /// Log traversal details
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Default log filter, used when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "pdfchapters=debug"
        } else if self.quiet {
            "pdfchapters=warn"
        } else {
            "pdfchapters=info"
        }
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            pdf_path: self.pdf_path.clone(),
            output_dir: self.output_dir.clone(),
            chapter_level: self.chapter_level,
            dry_run: self.dry_run,
        }
    }
}
