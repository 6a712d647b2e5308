pub mod extractor;

pub use extractor::ContentExtractor;

/// Column width used when rendering HTML summaries as plain text.
pub const DEFAULT_TEXT_WIDTH: usize = 80;
