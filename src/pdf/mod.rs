pub mod document;
#[cfg(test)]
pub mod fixtures;
pub mod outline;

pub use document::PdfDocument;
