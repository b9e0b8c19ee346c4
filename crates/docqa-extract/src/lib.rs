//! Text extraction for docqa.

pub mod pdf;
pub mod registry;
pub mod text;

pub use pdf::PdfExtractor;
pub use registry::ExtractorRegistry;
pub use text::TextExtractor;
